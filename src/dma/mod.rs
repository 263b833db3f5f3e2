//! Descriptor ring engine: buffer pools plus TX/RX rings.
//!
//! [`DmaChannel`] hands fixed-size buffers back and forth between software
//! and the DMA engine without locks. The ownership bit in each descriptor
//! is the only arbiter: software touches a buffer only after observing
//! software ownership at the ring cursor, and returns it to hardware in
//! the same call that advances the cursor.

pub mod descriptor;
pub mod ring;

pub use descriptor::{Ownership, RxDescriptor, TxDescriptor};
pub use ring::DescriptorRing;

use crate::chip::MacChip;
use crate::error::{DmaError, IoError, Result};

#[cfg(feature = "log")]
use log::warn;

#[cfg(feature = "log")]
fn log_rx_error(desc: &RxDescriptor) {
    warn!(
        "RX frame dropped: status=0x{:08x} first={} last={}",
        desc.raw_status(),
        desc.is_first(),
        desc.is_last()
    );
}

/// Outcome of a successful transmit submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxSubmit {
    /// The newly reached cursor descriptor is software-owned, so the
    /// transmitter can accept another frame. This is the sole
    /// backpressure-release signal: after a `Busy` rejection, callers must
    /// wait for it before submitting again.
    pub space_available: bool,
}

/// Fixed-size frame buffer aligned for DMA access.
#[repr(C, align(4))]
pub(crate) struct FrameBuffer<const N: usize>(pub(crate) [u8; N]);

impl<const N: usize> FrameBuffer<N> {
    const fn new() -> Self {
        Self([0u8; N])
    }
}

/// Descriptor ring engine with statically allocated buffers.
///
/// # Type Parameters
/// * `RX_BUFS` - Number of receive buffers/descriptors
/// * `TX_BUFS` - Number of transmit buffers/descriptors
/// * `BUF_SIZE` - Size of each buffer in bytes (>= 1536 for standard frames)
pub struct DmaChannel<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> {
    /// RX descriptor ring
    rx_ring: DescriptorRing<RxDescriptor, RX_BUFS>,
    /// TX descriptor ring
    tx_ring: DescriptorRing<TxDescriptor, TX_BUFS>,
    /// RX data buffers
    rx_buffers: [FrameBuffer<BUF_SIZE>; RX_BUFS],
    /// TX data buffers
    tx_buffers: [FrameBuffer<BUF_SIZE>; TX_BUFS],
    /// Whether the rings have been initialized
    initialized: bool,
}

impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    DmaChannel<RX_BUFS, TX_BUFS, BUF_SIZE>
{
    /// Create a new channel with zeroed buffers. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rx_ring: DescriptorRing::from_array([const { RxDescriptor::new() }; RX_BUFS]),
            tx_ring: DescriptorRing::from_array([const { TxDescriptor::new() }; TX_BUFS]),
            rx_buffers: [const { FrameBuffer::new() }; RX_BUFS],
            tx_buffers: [const { FrameBuffer::new() }; TX_BUFS],
            initialized: false,
        }
    }

    /// Total memory usage in bytes.
    #[must_use]
    pub const fn memory_usage() -> usize {
        RX_BUFS * RxDescriptor::SIZE
            + TX_BUFS * TxDescriptor::SIZE
            + (RX_BUFS + TX_BUFS) * BUF_SIZE
    }

    /// Initialize descriptor chains and program the chip's ring bases.
    ///
    /// Chains every descriptor to its successor, marks the last descriptor
    /// of each ring with the wrap flag, hands all RX descriptors to
    /// hardware, and writes the ring base addresses. Must run before
    /// interrupts are unmasked.
    pub fn init_rings<C: MacChip>(&mut self, chip: &mut C) {
        for i in 0..TX_BUFS {
            let next = (i + 1) % TX_BUFS;
            let buffer = self.tx_buffers[i].0.as_ptr();
            let next_desc: *const TxDescriptor = &self.tx_ring.descriptors[next];
            self.tx_ring.descriptors[i].setup_chained(buffer, next_desc);
        }
        self.tx_ring.descriptors[TX_BUFS - 1].mark_end_of_ring();

        for i in 0..RX_BUFS {
            let next = (i + 1) % RX_BUFS;
            let buffer = self.rx_buffers[i].0.as_mut_ptr();
            let next_desc: *const RxDescriptor = &self.rx_ring.descriptors[next];
            self.rx_ring.descriptors[i].setup_chained(buffer, BUF_SIZE, next_desc);
        }
        self.rx_ring.descriptors[RX_BUFS - 1].mark_end_of_ring();

        self.rx_ring.reset();
        self.tx_ring.reset();
        chip.set_rx_ring_base(self.rx_ring.base_addr_u32());
        chip.set_tx_ring_base(self.tx_ring.base_addr_u32());
        self.initialized = true;
    }

    /// Check if the rings have been initialized
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // =========================================================================
    // Transmit path
    // =========================================================================

    /// Submit one frame for transmission.
    ///
    /// Fails `Busy` if the cursor descriptor is still hardware-owned (the
    /// previous frame has not been sent) and `InvalidLength` for empty
    /// frames or frames larger than one buffer; callers must pre-segment,
    /// fragmentation is not supported.
    ///
    /// On success the frame is copied into the cursor buffer, the
    /// descriptor is handed to hardware, the TX doorbell is rung and the
    /// cursor advances. [`TxSubmit::space_available`] reports whether the
    /// ring can accept another frame immediately.
    pub fn tx_submit<C: MacChip>(&mut self, chip: &mut C, frame: &[u8]) -> Result<TxSubmit> {
        if frame.is_empty() || frame.len() > BUF_SIZE {
            return Err(DmaError::InvalidLength.into());
        }

        let idx = self.tx_ring.cursor_index();
        if self.tx_ring.cursor_desc().ownership() == Ownership::Hardware {
            return Err(DmaError::Busy.into());
        }

        self.tx_buffers[idx].0[..frame.len()].copy_from_slice(frame);

        let desc = self.tx_ring.cursor_desc();
        desc.prepare(frame.len());
        desc.give_to_hardware();

        chip.tx_poll_demand();
        self.tx_ring.advance();

        let space_available = self.tx_ring.cursor_desc().ownership() == Ownership::Software;
        Ok(TxSubmit { space_available })
    }

    /// Whether the cursor descriptor can accept a new frame.
    #[inline(always)]
    pub fn tx_space_available(&self) -> bool {
        self.tx_ring.cursor_desc().ownership() == Ownership::Software
    }

    /// Count of descriptors immediately available for transmission.
    pub fn tx_free_count(&self) -> usize {
        let mut count = 0;
        for i in 0..TX_BUFS {
            let idx = (self.tx_ring.cursor_index() + i) % TX_BUFS;
            if self.tx_ring.get(idx).ownership() == Ownership::Software {
                count += 1;
            } else {
                break;
            }
        }
        count
    }

    // =========================================================================
    // Receive path
    // =========================================================================

    /// Whether a descriptor is waiting at the cursor.
    #[inline(always)]
    pub fn rx_available(&self) -> bool {
        self.rx_ring.cursor_desc().ownership() == Ownership::Software
    }

    /// Inspect the cursor descriptor and drain it.
    ///
    /// - `Ok(None)`: the cursor descriptor is hardware-owned; nothing to
    ///   do, the cursor does not move.
    /// - `Ok(Some(r))`: a complete, error-free frame was delivered to
    ///   `deliver` (length clamped to the buffer capacity).
    /// - `Err(InvalidPacket)`: the frame carried an error flag or was not
    ///   a complete single-descriptor frame.
    ///
    /// In every non-empty case ownership returns to hardware, the cursor
    /// advances and the RX doorbell is rung, so the DMA engine keeps
    /// draining even through error frames.
    pub fn rx_drain<C: MacChip, R>(
        &mut self,
        chip: &mut C,
        deliver: impl FnOnce(&[u8]) -> R,
    ) -> Result<Option<R>> {
        let idx = self.rx_ring.cursor_index();
        let desc = self.rx_ring.cursor_desc();

        if desc.ownership() == Ownership::Hardware {
            return Ok(None);
        }

        // Fragmented receives are not reassembled; a frame is only
        // delivered when it both starts and ends here.
        let delivered = if desc.is_first() && desc.is_last() && !desc.has_error() {
            let len = desc.payload_length().min(BUF_SIZE);
            Some(deliver(&self.rx_buffers[idx].0[..len]))
        } else {
            #[cfg(feature = "log")]
            log_rx_error(desc);
            None
        };

        desc.recycle();
        self.rx_ring.advance();
        chip.rx_poll_demand();

        match delivered {
            Some(r) => Ok(Some(r)),
            None => Err(IoError::InvalidPacket.into()),
        }
    }

    // =========================================================================
    // Test support (hardware-simulation side)
    // =========================================================================

    #[cfg(test)]
    pub(crate) fn rx_desc(&self, index: usize) -> &RxDescriptor {
        self.rx_ring.get(index)
    }

    #[cfg(test)]
    pub(crate) fn tx_desc(&self, index: usize) -> &TxDescriptor {
        self.tx_ring.get(index)
    }

    #[cfg(test)]
    pub(crate) fn rx_buffer_mut(&mut self, index: usize) -> &mut [u8] {
        &mut self.rx_buffers[index % RX_BUFS].0
    }

    #[cfg(test)]
    pub(crate) fn tx_buffer(&self, index: usize) -> &[u8] {
        &self.tx_buffers[index % TX_BUFS].0
    }

    #[cfg(test)]
    pub(crate) fn tx_cursor_index(&self) -> usize {
        self.tx_ring.cursor_index()
    }

    #[cfg(test)]
    pub(crate) fn rx_cursor_index(&self) -> usize {
        self.rx_ring.cursor_index()
    }
}

impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> Default
    for DmaChannel<RX_BUFS, TX_BUFS, BUF_SIZE>
{
    fn default() -> Self {
        Self::new()
    }
}

// Safety: the channel is shared between task and interrupt context only
// through the ownership-bit protocol plus the caller's irq discipline.
unsafe impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> Sync
    for DmaChannel<RX_BUFS, TX_BUFS, BUF_SIZE>
{
}

unsafe impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> Send
    for DmaChannel<RX_BUFS, TX_BUFS, BUF_SIZE>
{
}

// =============================================================================
// Tests
// =============================================================================
