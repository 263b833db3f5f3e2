//! TX DMA descriptor for frame transmission.

use super::bits::{tdes0, tdes1};
use super::{Ownership, VolatileCell};

/// TX DMA descriptor (16 bytes).
///
/// Word layout: status/control, buffer size, buffer address, next
/// descriptor address (chained mode).
#[repr(C, align(4))]
pub struct TxDescriptor {
    /// TDES0: Status and control bits
    tdes0: VolatileCell<u32>,
    /// TDES1: Buffer size
    tdes1: VolatileCell<u32>,
    /// TDES2: Buffer address
    buffer_addr: VolatileCell<u32>,
    /// TDES3: Next descriptor address
    next_desc: VolatileCell<u32>,
}

impl TxDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 16;

    /// Create a new zeroed TX descriptor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tdes0: VolatileCell::new(0),
            tdes1: VolatileCell::new(0),
            buffer_addr: VolatileCell::new(0),
            next_desc: VolatileCell::new(0),
        }
    }

    /// Initialize descriptor for chained mode, software-owned.
    pub fn setup_chained(&self, buffer: *const u8, next_desc: *const TxDescriptor) {
        self.buffer_addr.set(buffer as u32);
        self.next_desc.set(next_desc as u32);
        self.tdes0.set(tdes0::CHAINED);
        self.tdes1.set(0);
    }

    /// Mark this descriptor as the last in the ring (wrap marker).
    pub fn mark_end_of_ring(&self) {
        self.tdes0.update(|v| v | tdes0::END_OF_RING);
    }

    /// Which side currently owns this descriptor.
    #[inline(always)]
    #[must_use]
    pub fn ownership(&self) -> Ownership {
        if (self.tdes0.get() & tdes0::OWN) != 0 {
            Ownership::Hardware
        } else {
            Ownership::Software
        }
    }

    /// Load frame length and single-descriptor framing flags.
    ///
    /// Sets first+last segment markers (the framework never fragments a
    /// transmit frame across descriptors) and requests a TX-done interrupt.
    /// The ownership bit is not touched here.
    pub fn prepare(&self, len: usize) {
        let keep = self.tdes0.get() & (tdes0::CHAINED | tdes0::END_OF_RING);
        self.tdes0.set(
            keep | tdes0::FIRST_SEGMENT | tdes0::LAST_SEGMENT | tdes0::INTERRUPT_ON_COMPLETE,
        );
        self.tdes1.set((len as u32) & tdes1::SIZE_MASK);
    }

    /// Hand the descriptor to the DMA engine.
    #[inline(always)]
    pub fn give_to_hardware(&self) {
        self.tdes0.update(|v| v | tdes0::OWN);
    }

    /// Check if the transmission reported an error.
    #[inline(always)]
    #[must_use]
    pub fn has_error(&self) -> bool {
        (self.tdes0.get() & tdes0::ERR_SUMMARY) != 0
    }

    /// Frame length currently loaded in the descriptor.
    #[inline(always)]
    #[must_use]
    pub fn frame_length(&self) -> usize {
        (self.tdes1.get() & tdes1::SIZE_MASK) as usize
    }

    /// Raw status word (hardware-simulation and diagnostics).
    #[inline(always)]
    pub(crate) fn raw_status(&self) -> u32 {
        self.tdes0.get()
    }

    /// Overwrite the raw status word (hardware-simulation side).
    #[inline(always)]
    pub(crate) fn write_raw_status(&self, value: u32) {
        self.tdes0.set(value);
    }
}

impl Default for TxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
