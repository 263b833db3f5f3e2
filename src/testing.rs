//! Test utilities: a recording mock chip, a simulated DMA engine that
//! plays the hardware side of the ownership protocol, and a table-backed
//! MDIO bus.

#![allow(missing_docs)]

use crate::chip::{MacChip, MulticastPolicy};
use crate::constants::CRC_SIZE;
use crate::dma::descriptor::bits::{rdes0, tdes0};
use crate::dma::{DmaChannel, Ownership};
use crate::driver::config::{Capabilities, Duplex, MacAddr, Speed};
use crate::driver::interrupt::IrqEvents;
use crate::driver::mac::Mac;
use crate::error::Result;
use crate::mdio::MdioBus;
use crate::phy::registers::{bmcr, phy_reg};

// =============================================================================
// Mock Chip
// =============================================================================

/// Recording [`MacChip`] with the conventions of the most common
/// controller family: three unicast slots, complemented hash, overflow
/// promoted to the hash path.
pub struct MockChip {
    /// Programmed RX ring base address
    pub rx_ring_base: u32,
    /// Programmed TX ring base address
    pub tx_ring_base: u32,
    /// TX doorbell count
    pub tx_polls: u32,
    /// RX doorbell count
    pub rx_polls: u32,
    /// Controller-level interrupt mask state
    pub irq_enabled: bool,
    /// Receive-interrupt mask state
    pub rx_irq_enabled: bool,
    /// Transmitter/receiver enabled
    pub transceiver_running: bool,
    /// Number of stop sequences observed
    pub transceiver_stops: u32,
    /// Last link parameters written
    pub link: Option<(Speed, Duplex)>,
    /// Programmed station address
    pub station: MacAddr,
    /// Perfect-match unicast slots
    pub unicast_slots: [Option<MacAddr>; 3],
    /// Programmed hash table
    pub hash_table: u64,
    /// Accept-all-multicast state
    pub accept_all_multicast: bool,
    /// Interrupt conditions currently asserted
    pub pending_irq: IrqEvents,
    /// Last acknowledge write
    pub last_ack: IrqEvents,
}

impl MockChip {
    pub const fn new() -> Self {
        Self {
            rx_ring_base: 0,
            tx_ring_base: 0,
            tx_polls: 0,
            rx_polls: 0,
            irq_enabled: false,
            rx_irq_enabled: false,
            transceiver_running: false,
            transceiver_stops: 0,
            link: None,
            station: MacAddr::UNSPECIFIED,
            unicast_slots: [None; 3],
            hash_table: 0,
            accept_all_multicast: false,
            pending_irq: IrqEvents::NONE,
            last_ack: IrqEvents::NONE,
        }
    }

    /// Assert interrupt conditions, as hardware would.
    pub fn raise_irq(&mut self, events: IrqEvents) {
        self.pending_irq.tx_done |= events.tx_done;
        self.pending_irq.rx_done |= events.rx_done;
    }
}

impl MacChip for MockChip {
    const UNICAST_SLOTS: usize = 3;

    fn set_tx_ring_base(&mut self, addr: u32) {
        self.tx_ring_base = addr;
    }

    fn set_rx_ring_base(&mut self, addr: u32) {
        self.rx_ring_base = addr;
    }

    fn tx_poll_demand(&mut self) {
        self.tx_polls += 1;
    }

    fn rx_poll_demand(&mut self) {
        self.rx_polls += 1;
    }

    fn start_transceiver(&mut self) {
        self.transceiver_running = true;
    }

    fn stop_transceiver(&mut self) {
        self.transceiver_running = false;
        self.transceiver_stops += 1;
    }

    fn apply_link(&mut self, speed: Speed, duplex: Duplex) {
        self.link = Some((speed, duplex));
    }

    fn irq_events(&mut self) -> IrqEvents {
        self.pending_irq
    }

    fn ack_irq_events(&mut self, events: IrqEvents) {
        self.last_ack = events;
        if events.tx_done {
            self.pending_irq.tx_done = false;
        }
        if events.rx_done {
            self.pending_irq.rx_done = false;
        }
    }

    fn set_irq_enabled(&mut self, enabled: bool) {
        self.irq_enabled = enabled;
    }

    fn set_rx_irq_enabled(&mut self, enabled: bool) {
        self.rx_irq_enabled = enabled;
    }

    fn set_station_address(&mut self, addr: &MacAddr) {
        self.station = *addr;
    }

    fn set_unicast_slot(&mut self, slot: usize, addr: Option<&MacAddr>) {
        self.unicast_slots[slot] = addr.copied();
    }

    fn write_hash_table(&mut self, hash: u64) {
        self.hash_table = hash;
    }

    fn set_accept_all_multicast(&mut self, accept: bool) {
        self.accept_all_multicast = accept;
    }
}

// =============================================================================
// Loose-filter Chip
// =============================================================================

/// Chip with the other observed conventions: a single unicast slot with
/// overflow rejected, uncomplemented hash, and accept-all-multicast
/// whenever the filter table is non-empty.
pub struct LooseFilterChip {
    pub station: MacAddr,
    pub unicast_slot: Option<MacAddr>,
    pub hash_table: u64,
    pub accept_all_multicast: bool,
}

impl LooseFilterChip {
    pub fn new() -> Self {
        Self {
            station: MacAddr::UNSPECIFIED,
            unicast_slot: None,
            hash_table: 0,
            accept_all_multicast: false,
        }
    }
}

impl MacChip for LooseFilterChip {
    const UNICAST_SLOTS: usize = 1;
    const UNICAST_OVERFLOW_TO_HASH: bool = false;
    const HASH_COMPLEMENT: bool = false;
    const MULTICAST_POLICY: MulticastPolicy = MulticastPolicy::AcceptAllWhenFilterNonEmpty;
    const CAPABILITIES: Capabilities = Capabilities::full_duplex_only();

    fn set_tx_ring_base(&mut self, _addr: u32) {}
    fn set_rx_ring_base(&mut self, _addr: u32) {}
    fn tx_poll_demand(&mut self) {}
    fn rx_poll_demand(&mut self) {}
    fn start_transceiver(&mut self) {}
    fn stop_transceiver(&mut self) {}
    fn apply_link(&mut self, _speed: Speed, _duplex: Duplex) {}

    fn irq_events(&mut self) -> IrqEvents {
        IrqEvents::NONE
    }

    fn ack_irq_events(&mut self, _events: IrqEvents) {}
    fn set_irq_enabled(&mut self, _enabled: bool) {}
    fn set_rx_irq_enabled(&mut self, _enabled: bool) {}

    fn set_station_address(&mut self, addr: &MacAddr) {
        self.station = *addr;
    }

    fn set_unicast_slot(&mut self, _slot: usize, addr: Option<&MacAddr>) {
        self.unicast_slot = addr.copied();
    }

    fn write_hash_table(&mut self, hash: u64) {
        self.hash_table = hash;
    }

    fn set_accept_all_multicast(&mut self, accept: bool) {
        self.accept_all_multicast = accept;
    }
}

// =============================================================================
// Simulated DMA Engine
// =============================================================================

/// Plays the hardware side of the descriptor protocol: completes
/// transmits and fills receive descriptors, honoring the ownership bit
/// exactly as a DMA engine would.
pub struct SimDma {
    tx_index: usize,
    rx_index: usize,
}

impl SimDma {
    pub fn new() -> Self {
        Self {
            tx_index: 0,
            rx_index: 0,
        }
    }

    /// Complete the oldest in-flight transmit, if any.
    pub fn complete_tx<const RX: usize, const TX: usize, const BUF: usize>(
        &mut self,
        ch: &mut DmaChannel<RX, TX, BUF>,
    ) -> bool {
        let desc = ch.tx_desc(self.tx_index);
        if desc.ownership() != Ownership::Hardware {
            return false;
        }

        desc.write_raw_status(desc.raw_status() & !tdes0::OWN);
        self.tx_index = (self.tx_index + 1) % TX;
        true
    }

    /// Deliver a complete, error-free frame into the next descriptor.
    ///
    /// Returns `false` when no descriptor is hardware-owned (receive
    /// backpressure).
    pub fn receive_frame<const RX: usize, const TX: usize, const BUF: usize>(
        &mut self,
        ch: &mut DmaChannel<RX, TX, BUF>,
        payload: &[u8],
    ) -> bool {
        let idx = self.rx_index;
        if ch.rx_desc(idx).ownership() != Ownership::Hardware {
            return false;
        }

        let len = payload.len().min(BUF);
        ch.rx_buffer_mut(idx)[..len].copy_from_slice(&payload[..len]);

        let status = (((len + CRC_SIZE) as u32) << rdes0::FRAME_LEN_SHIFT)
            | rdes0::FIRST_DESC
            | rdes0::LAST_DESC;
        ch.rx_desc(idx).write_raw_status(status);

        self.rx_index = (idx + 1) % RX;
        true
    }

    /// Deliver a frame with hardware error flags set.
    pub fn receive_error_frame<const RX: usize, const TX: usize, const BUF: usize>(
        &mut self,
        ch: &mut DmaChannel<RX, TX, BUF>,
    ) -> bool {
        let idx = self.rx_index;
        if ch.rx_desc(idx).ownership() != Ownership::Hardware {
            return false;
        }

        let status = ((64 + CRC_SIZE as u32) << rdes0::FRAME_LEN_SHIFT)
            | rdes0::FIRST_DESC
            | rdes0::LAST_DESC
            | rdes0::ERR_SUMMARY
            | rdes0::CRC_ERR;
        ch.rx_desc(idx).write_raw_status(status);

        self.rx_index = (idx + 1) % RX;
        true
    }

    /// Deliver an incomplete frame fragment.
    pub fn receive_fragment<const RX: usize, const TX: usize, const BUF: usize>(
        &mut self,
        ch: &mut DmaChannel<RX, TX, BUF>,
        first: bool,
        last: bool,
    ) -> bool {
        let idx = self.rx_index;
        if ch.rx_desc(idx).ownership() != Ownership::Hardware {
            return false;
        }

        let mut status = (128u32 + CRC_SIZE as u32) << rdes0::FRAME_LEN_SHIFT;
        if first {
            status |= rdes0::FIRST_DESC;
        }
        if last {
            status |= rdes0::LAST_DESC;
        }
        ch.rx_desc(idx).write_raw_status(status);

        self.rx_index = (idx + 1) % RX;
        true
    }

    /// Deliver a frame whose hardware-reported length may exceed the
    /// buffer capacity.
    pub fn receive_with_reported_length<const RX: usize, const TX: usize, const BUF: usize>(
        &mut self,
        ch: &mut DmaChannel<RX, TX, BUF>,
        fill: u8,
        reported_len: usize,
    ) -> bool {
        let idx = self.rx_index;
        if ch.rx_desc(idx).ownership() != Ownership::Hardware {
            return false;
        }

        ch.rx_buffer_mut(idx).fill(fill);
        let status = ((reported_len as u32) << rdes0::FRAME_LEN_SHIFT)
            | rdes0::FIRST_DESC
            | rdes0::LAST_DESC;
        ch.rx_desc(idx).write_raw_status(status);

        self.rx_index = (idx + 1) % RX;
        true
    }

    // --- Driver-level wrappers ------------------------------------------

    pub fn complete_tx_mac<C: MacChip, const RX: usize, const TX: usize, const BUF: usize>(
        &mut self,
        mac: &mut Mac<C, RX, TX, BUF>,
    ) -> bool {
        self.complete_tx(mac.dma_mut())
    }

    pub fn receive_frame_mac<C: MacChip, const RX: usize, const TX: usize, const BUF: usize>(
        &mut self,
        mac: &mut Mac<C, RX, TX, BUF>,
        payload: &[u8],
    ) -> bool {
        self.receive_frame(mac.dma_mut(), payload)
    }

    pub fn receive_error_frame_mac<C: MacChip, const RX: usize, const TX: usize, const BUF: usize>(
        &mut self,
        mac: &mut Mac<C, RX, TX, BUF>,
    ) -> bool {
        self.receive_error_frame(mac.dma_mut())
    }
}

// =============================================================================
// Table-backed MDIO
// =============================================================================

/// MDIO bus backed by a 32x32 register file, for PHY driver tests.
pub struct TableMdio {
    /// Register file, indexed `[phy][reg]`
    pub registers: [[u16; 32]; 32],
    /// Model BMCR.RESET self-clearing on write
    pub self_clear_reset: bool,
}

impl TableMdio {
    pub fn new() -> Self {
        Self {
            registers: [[0; 32]; 32],
            self_clear_reset: false,
        }
    }
}

impl MdioBus for TableMdio {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        Ok(self.registers[phy_addr as usize][reg_addr as usize])
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        let mut value = value;
        if self.self_clear_reset && reg_addr == phy_reg::BMCR {
            value &= !bmcr::RESET;
        }
        self.registers[phy_addr as usize][reg_addr as usize] = value;
        Ok(())
    }

    fn is_busy(&self) -> bool {
        false
    }
}

// =============================================================================
// Deterministic PRNG
// =============================================================================

/// Xorshift32 for reproducible interleaving fuzz.
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    pub fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}
