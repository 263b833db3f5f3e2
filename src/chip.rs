//! Chip register-access abstraction.
//!
//! Every supported MAC controller implements [`MacChip`]; the descriptor
//! ring engine, interrupt hand-off, address filter and link
//! reconfiguration are written once against this trait instead of being
//! duplicated per chip.
//!
//! The associated constants capture real divergence between controllers
//! (hash complement convention, unicast slot counts, multicast accept
//! policy) so that each chip states its convention explicitly rather than
//! the framework silently normalizing them.

use crate::driver::config::{Capabilities, Duplex, MacAddr, Speed};
use crate::driver::interrupt::IrqEvents;

// =============================================================================
// Per-chip policy
// =============================================================================

/// How the receiver decides to accept multicast frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MulticastPolicy {
    /// Multicast acceptance is governed purely by the 64-bit hash table
    HashTable,
    /// The receiver accepts all multicast traffic whenever any filter
    /// entry is active; the hash table is still programmed but the chip
    /// does not narrow acceptance with it
    AcceptAllWhenFilterNonEmpty,
}

// =============================================================================
// MacChip trait
// =============================================================================

/// Register access for one Ethernet MAC controller.
///
/// Implementations are thin: each method is one or two register writes
/// (or a bounded poll where the hardware requires confirmation). All
/// sequencing and protocol logic lives in the generic engines.
pub trait MacChip {
    /// Number of perfect-match unicast address registers beyond the
    /// station address
    const UNICAST_SLOTS: usize;

    /// Promote unicast addresses that overflow the perfect-match slots
    /// into the hash table; when `false`, overflow is rejected
    const UNICAST_OVERFLOW_TO_HASH: bool = true;

    /// Complement the CRC-32 before taking the hash index; both
    /// conventions exist in shipping silicon
    const HASH_COMPLEMENT: bool = true;

    /// Number of most-significant CRC bits used as the hash index
    const HASH_INDEX_BITS: u32 = 6;

    /// Multicast acceptance policy for this controller
    const MULTICAST_POLICY: MulticastPolicy = MulticastPolicy::HashTable;

    /// Capability flags reported to the upper layer once at init
    const CAPABILITIES: Capabilities = Capabilities::full();

    // --- Descriptor rings -----------------------------------------------

    /// Program the physical base address of the TX descriptor ring
    fn set_tx_ring_base(&mut self, addr: u32);

    /// Program the physical base address of the RX descriptor ring
    fn set_rx_ring_base(&mut self, addr: u32);

    /// Doorbell: tell the DMA engine to re-poll the TX descriptor ring
    fn tx_poll_demand(&mut self);

    /// Doorbell: tell the DMA engine to re-poll the RX descriptor ring
    fn rx_poll_demand(&mut self);

    // --- Transceiver control --------------------------------------------

    /// Enable the transmitter and receiver
    fn start_transceiver(&mut self);

    /// Disable the transmitter and receiver.
    ///
    /// Where the hardware requires it, this polls until the controller
    /// reports stopped; on chips without a stopped indication it simply
    /// clears the enable bits.
    fn stop_transceiver(&mut self);

    /// Rewrite the duplex/speed-dependent configuration bits.
    ///
    /// Only called with the transceiver stopped.
    fn apply_link(&mut self, speed: Speed, duplex: Duplex);

    // --- Interrupts ------------------------------------------------------

    /// Read the interrupt status register once and decode it
    fn irq_events(&mut self) -> IrqEvents;

    /// Acknowledge exactly the observed conditions.
    ///
    /// Never blind-clears the whole status register: bits set after the
    /// read must survive for the next interrupt.
    fn ack_irq_events(&mut self, events: IrqEvents);

    /// Mask or unmask the MAC interrupt at the controller level
    fn set_irq_enabled(&mut self, enabled: bool);

    /// Mask or unmask the frame-received interrupt alone
    fn set_rx_irq_enabled(&mut self, enabled: bool);

    // --- Address filtering ----------------------------------------------

    /// Program the station (primary unicast) address
    fn set_station_address(&mut self, addr: &MacAddr);

    /// Program or clear one perfect-match unicast slot
    ///
    /// `slot` is in `0..UNICAST_SLOTS`; `None` disables the slot.
    fn set_unicast_slot(&mut self, slot: usize, addr: Option<&MacAddr>);

    /// Write the assembled 64-bit multicast hash table
    fn write_hash_table(&mut self, hash: u64);

    /// Enable or disable unconditional multicast acceptance
    fn set_accept_all_multicast(&mut self, accept: bool);
}
