//! RX DMA descriptor for frame reception.

use super::bits::{rdes0, rdes1};
use super::{Ownership, VolatileCell};
use crate::constants::CRC_SIZE;

/// RX DMA descriptor (16 bytes).
///
/// Word layout: status, control/buffer size, buffer address, next
/// descriptor address (chained mode).
#[repr(C, align(4))]
pub struct RxDescriptor {
    /// RDES0: Status bits, written by hardware on completion
    rdes0: VolatileCell<u32>,
    /// RDES1: Control and buffer size
    rdes1: VolatileCell<u32>,
    /// RDES2: Buffer address
    buffer_addr: VolatileCell<u32>,
    /// RDES3: Next descriptor address
    next_desc: VolatileCell<u32>,
}

impl RxDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 16;

    /// Create a new zeroed RX descriptor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rdes0: VolatileCell::new(0),
            rdes1: VolatileCell::new(0),
            buffer_addr: VolatileCell::new(0),
            next_desc: VolatileCell::new(0),
        }
    }

    /// Initialize descriptor for chained mode and hand it to hardware.
    pub fn setup_chained(&self, buffer: *mut u8, buffer_len: usize, next_desc: *const RxDescriptor) {
        self.buffer_addr.set(buffer as u32);
        self.next_desc.set(next_desc as u32);
        self.rdes1
            .set(rdes1::CHAINED | ((buffer_len as u32) & rdes1::SIZE_MASK));
        self.rdes0.set(rdes0::OWN);
    }

    /// Mark this descriptor as the last in the ring (wrap marker).
    pub fn mark_end_of_ring(&self) {
        self.rdes1.update(|v| v | rdes1::END_OF_RING);
    }

    /// Which side currently owns this descriptor.
    #[inline(always)]
    #[must_use]
    pub fn ownership(&self) -> Ownership {
        if (self.rdes0.get() & rdes0::OWN) != 0 {
            Ownership::Hardware
        } else {
            Ownership::Software
        }
    }

    /// Frame starts in this descriptor.
    #[inline(always)]
    #[must_use]
    pub fn is_first(&self) -> bool {
        (self.rdes0.get() & rdes0::FIRST_DESC) != 0
    }

    /// Frame ends in this descriptor.
    #[inline(always)]
    #[must_use]
    pub fn is_last(&self) -> bool {
        (self.rdes0.get() & rdes0::LAST_DESC) != 0
    }

    /// Hardware reported an error for this frame.
    #[inline(always)]
    #[must_use]
    pub fn has_error(&self) -> bool {
        (self.rdes0.get() & rdes0::ALL_ERRORS) != 0
    }

    /// Frame length as written by hardware, including the FCS.
    #[inline(always)]
    #[must_use]
    pub fn frame_length(&self) -> usize {
        ((self.rdes0.get() & rdes0::FRAME_LEN_MASK) >> rdes0::FRAME_LEN_SHIFT) as usize
    }

    /// Frame payload length with the FCS stripped.
    #[inline(always)]
    #[must_use]
    pub fn payload_length(&self) -> usize {
        self.frame_length().saturating_sub(CRC_SIZE)
    }

    /// Return the descriptor to hardware, clearing the completion status.
    ///
    /// The chained/end-of-ring control word and buffer link are preserved.
    #[inline(always)]
    pub fn recycle(&self) {
        self.rdes0.set(rdes0::OWN);
    }

    /// Raw status word (hardware-simulation and diagnostics).
    #[inline(always)]
    pub(crate) fn raw_status(&self) -> u32 {
        self.rdes0.get()
    }

    /// Overwrite the raw status word (hardware-simulation side).
    #[inline(always)]
    pub(crate) fn write_raw_status(&self, value: u32) {
        self.rdes0.set(value);
    }
}

impl Default for RxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
