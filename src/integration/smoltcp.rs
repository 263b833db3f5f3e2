//! smoltcp Network Stack Integration
#![cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
//!
//! Implements `smoltcp::phy::Device` for [`Mac`], so any chip behind
//! [`MacChip`] plugs into smoltcp's TCP/IP stack.
//!
//! # Safety Notes
//!
//! The smoltcp `Device` trait requires `receive()` to return both an
//! `RxToken` and `TxToken` simultaneously. This implementation uses raw
//! pointers internally to satisfy that API requirement. This is safe
//! because:
//!
//! 1. **Temporal safety**: Tokens are consumed immediately in the same
//!    call stack before any other access to the `Mac` occurs.
//! 2. **Spatial safety**: RX and TX operations use completely separate
//!    descriptor rings and buffer pools.
//! 3. **No aliasing during access**: Only one token is consumed at a
//!    time, and `consume()` takes `self` by value.

use crate::chip::MacChip;
use crate::constants::{MAX_FRAME_SIZE, MTU};
use crate::driver::config::State;
use crate::driver::mac::Mac;

use smoltcp::phy::{Checksum, ChecksumCapabilities, Device, DeviceCapabilities, Medium};
use smoltcp::time::Instant;

// =============================================================================
// RX Token
// =============================================================================

/// Receive token for smoltcp.
///
/// Holds a raw pointer so `receive()` can hand out the RX and TX tokens
/// together; consumed immediately by value.
pub struct MacRxToken<'a, C: MacChip, const RX: usize, const TX: usize, const BUF: usize> {
    mac: *mut Mac<C, RX, TX, BUF>,
    _marker: core::marker::PhantomData<&'a mut Mac<C, RX, TX, BUF>>,
}

impl<C: MacChip, const RX: usize, const TX: usize, const BUF: usize> smoltcp::phy::RxToken
    for MacRxToken<'_, C, RX, TX, BUF>
{
    fn consume<R, F>(self, f: F) -> R
    where
        F: FnOnce(&[u8]) -> R,
    {
        // Stack-allocated bounce buffer keeps the token free of
        // descriptor lifetimes.
        let mut buffer = [0u8; MAX_FRAME_SIZE];

        // SAFETY: The pointer is valid for 'a; the token is consumed by
        // value, so no aliasing, and RX/TX rings are separate.
        let mac = unsafe { &mut *self.mac };

        let len = match mac.poll_receive(&mut buffer) {
            Ok(Some(len)) => len,
            // Error frames were recycled by the driver; hand smoltcp an
            // empty slice, it discards runts.
            _ => 0,
        };

        f(&buffer[..len])
    }
}

// =============================================================================
// TX Token
// =============================================================================

/// Transmit token for smoltcp.
pub struct MacTxToken<'a, C: MacChip, const RX: usize, const TX: usize, const BUF: usize> {
    mac: *mut Mac<C, RX, TX, BUF>,
    _marker: core::marker::PhantomData<&'a mut Mac<C, RX, TX, BUF>>,
}

impl<C: MacChip, const RX: usize, const TX: usize, const BUF: usize> smoltcp::phy::TxToken
    for MacTxToken<'_, C, RX, TX, BUF>
{
    fn consume<R, F>(self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let len = len.min(MAX_FRAME_SIZE);
        let mut buffer = [0u8; MAX_FRAME_SIZE];

        // Let smoltcp fill in the frame data.
        let result = f(&mut buffer[..len]);

        // SAFETY: The pointer is valid for 'a; the token is consumed by
        // value, so no aliasing, and TX/RX rings are separate.
        let mac = unsafe { &mut *self.mac };

        // Ignore errors; smoltcp retries on its own schedule.
        let _ = mac.send(&buffer[..len]);

        result
    }
}

// =============================================================================
// Device Implementation
// =============================================================================

impl<C: MacChip, const RX: usize, const TX: usize, const BUF: usize> Device for Mac<C, RX, TX, BUF> {
    type RxToken<'a>
        = MacRxToken<'a, C, RX, TX, BUF>
    where
        Self: 'a;
    type TxToken<'a>
        = MacTxToken<'a, C, RX, TX, BUF>
    where
        Self: 'a;

    fn receive(&mut self, _timestamp: Instant) -> Option<(Self::RxToken<'_>, Self::TxToken<'_>)> {
        if self.state() != State::Running {
            return None;
        }

        if !self.rx_available() {
            return None;
        }

        // SAFETY: Both tokens come from the same Mac, consumed
        // immediately in the same call stack; RX and TX use separate
        // descriptor rings; PhantomData ties them to 'a.
        let self_ptr = self as *mut Self;
        Some((
            MacRxToken {
                mac: self_ptr,
                _marker: core::marker::PhantomData,
            },
            MacTxToken {
                mac: self_ptr,
                _marker: core::marker::PhantomData,
            },
        ))
    }

    fn transmit(&mut self, _timestamp: Instant) -> Option<Self::TxToken<'_>> {
        if self.state() != State::Running {
            return None;
        }

        if !self.tx_space_available() {
            return None;
        }

        // SAFETY: Single token, no aliasing; the raw pointer is
        // immediately converted back to a reference in consume().
        Some(MacTxToken {
            mac: self as *mut Self,
            _marker: core::marker::PhantomData,
        })
    }

    fn capabilities(&self) -> DeviceCapabilities {
        let mut caps = DeviceCapabilities::default();

        caps.medium = Medium::Ethernet;
        caps.max_transmission_unit = MTU;

        // Single frame at a time (no scatter-gather)
        caps.max_burst_size = Some(1);

        // The framework does not model checksum offload; smoltcp
        // computes checksums in software.
        caps.checksum = ChecksumCapabilities::default();
        caps.checksum.ipv4 = Checksum::Both;
        caps.checksum.udp = Checksum::Both;
        caps.checksum.tcp = Checksum::Both;
        caps.checksum.icmpv4 = Checksum::Both;

        caps
    }
}

/// Get the MAC address as a smoltcp `EthernetAddress`.
pub fn ethernet_address<C: MacChip, const RX: usize, const TX: usize, const BUF: usize>(
    mac: &Mac<C, RX, TX, BUF>,
) -> smoltcp::wire::EthernetAddress {
    smoltcp::wire::EthernetAddress(*mac.mac_address().as_bytes())
}

// =============================================================================
// Tests
// =============================================================================
