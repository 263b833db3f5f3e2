//! Descriptor bit field constants.
//!
//! The framework uses one portable four-word descriptor layout for every
//! chip: word 0 carries status and the ownership bit, word 1 the buffer
//! size, word 2 the buffer address and word 3 the next-descriptor link.

#![allow(dead_code)]

// =============================================================================
// TDES0 (TX Descriptor Word 0) - Status / Control
// =============================================================================

/// TX Descriptor Word 0 bit field constants
pub mod tdes0 {
    /// OWN - when set, descriptor owned by DMA; when clear, owned by software
    pub const OWN: u32 = 1 << 31;
    /// Interrupt on Completion - raise TX-done after this frame
    pub const INTERRUPT_ON_COMPLETE: u32 = 1 << 30;
    /// Last Segment - buffer contains the end of the frame
    pub const LAST_SEGMENT: u32 = 1 << 29;
    /// First Segment - buffer contains the start of the frame
    pub const FIRST_SEGMENT: u32 = 1 << 28;
    /// Transmit End of Ring - wrap marker on the last descriptor
    pub const END_OF_RING: u32 = 1 << 21;
    /// Second Address Chained - word 3 holds the next descriptor address
    pub const CHAINED: u32 = 1 << 20;
    /// Error Summary - logical OR of transmit error bits
    pub const ERR_SUMMARY: u32 = 1 << 15;
}

// =============================================================================
// TDES1 (TX Descriptor Word 1) - Buffer size
// =============================================================================

/// TX Descriptor Word 1 bit field constants
pub mod tdes1 {
    /// Buffer size mask (13 bits)
    pub const SIZE_MASK: u32 = 0x1FFF;
}

// =============================================================================
// RDES0 (RX Descriptor Word 0) - Status
// =============================================================================

/// RX Descriptor Word 0 bit field constants
pub mod rdes0 {
    /// OWN - when set, descriptor owned by DMA; when clear, owned by software
    pub const OWN: u32 = 1 << 31;
    /// Frame Length shift (14 bits, includes the FCS)
    pub const FRAME_LEN_SHIFT: u32 = 16;
    /// Frame Length mask
    pub const FRAME_LEN_MASK: u32 = 0x3FFF << 16;
    /// Error Summary - logical OR of error bits
    pub const ERR_SUMMARY: u32 = 1 << 15;
    /// Length Error - actual length doesn't match length/type field
    pub const LENGTH_ERR: u32 = 1 << 12;
    /// Overrun Error - FIFO overflow while receiving
    pub const OVERRUN_ERR: u32 = 1 << 11;
    /// First Descriptor - this descriptor holds the start of the frame
    pub const FIRST_DESC: u32 = 1 << 9;
    /// Last Descriptor - this descriptor holds the end of the frame
    pub const LAST_DESC: u32 = 1 << 8;
    /// CRC Error - frame failed the FCS check
    pub const CRC_ERR: u32 = 1 << 1;

    /// All receive error bits
    pub const ALL_ERRORS: u32 = ERR_SUMMARY | LENGTH_ERR | OVERRUN_ERR | CRC_ERR;
}

// =============================================================================
// RDES1 (RX Descriptor Word 1) - Control
// =============================================================================

/// RX Descriptor Word 1 bit field constants
pub mod rdes1 {
    /// Buffer size mask (13 bits)
    pub const SIZE_MASK: u32 = 0x1FFF;
    /// Second Address Chained - word 3 holds the next descriptor address
    pub const CHAINED: u32 = 1 << 14;
    /// Receive End of Ring - wrap marker on the last descriptor
    pub const END_OF_RING: u32 = 1 << 15;
}

// =============================================================================
// Unit Tests
// =============================================================================
