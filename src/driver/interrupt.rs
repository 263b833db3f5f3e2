//! Interrupt status and ISR-to-task hand-off types.
//!
//! The interrupt handler reads the chip's status register exactly once,
//! tests the transmit-complete and frame-received conditions
//! independently, and acknowledges only the bits it observed set; bits
//! raised after the read survive for the next interrupt.

// =============================================================================
// Interrupt Events
// =============================================================================

/// Interrupt conditions decoded from one status-register read.
///
/// The chip implementation maps its raw status bits onto these two
/// conditions; acknowledging an `IrqEvents` value must clear exactly the
/// observed bits and nothing else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqEvents {
    /// A frame finished transmitting
    pub tx_done: bool,
    /// A frame arrived in the receive ring
    pub rx_done: bool,
}

impl IrqEvents {
    /// No conditions observed
    pub const NONE: Self = Self {
        tx_done: false,
        rx_done: false,
    };

    /// Check if any condition was observed
    #[inline]
    pub const fn any(&self) -> bool {
        self.tx_done || self.rx_done
    }
}

// =============================================================================
// ISR Outcome
// =============================================================================

/// What the top half latched; tells ISR shims which tasks to wake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IsrOutcome {
    /// The task-level event handler must run (receive interrupts are now
    /// masked until it drains the ring)
    pub rx_event: bool,
    /// Transmit backpressure released; a sender blocked on `Busy` may
    /// submit again
    pub tx_space: bool,
}

impl IsrOutcome {
    /// Check if anything was latched
    #[inline]
    pub const fn any(&self) -> bool {
        self.rx_event || self.tx_space
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
