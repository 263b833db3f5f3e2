//! ISR-safe driver wrapper using critical sections.
//!
//! Embedded targets need exactly one statically reachable driver
//! instance for the interrupt handler; [`SharedMac`] is that one slot.
//! All access goes through `critical_section::with()`, so the ISR and
//! the task context never observe the driver mid-operation.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::chip::MacChip;
use crate::driver::mac::Mac;

/// ISR-safe MAC driver wrapper.
///
/// # Example
///
/// ```ignore
/// static MAC: SharedMac<MyChip, 6, 3, 1536> = SharedMac::new(MyChip::new());
///
/// // In the ISR:
/// MAC.with(|mac| mac.on_interrupt());
///
/// // In the task:
/// MAC.with(|mac| mac.service(&mut |frame| stack.input(frame)));
/// ```
pub struct SharedMac<C: MacChip, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
{
    inner: Mutex<RefCell<Mac<C, RX_BUFS, TX_BUFS, BUF_SIZE>>>,
}

impl<C: MacChip, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    SharedMac<C, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    /// Create a new shared driver (const, suitable for static
    /// initialization).
    pub const fn new(chip: C) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Mac::new(chip))),
        }
    }

    /// Execute a closure with exclusive access to the driver.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Mac<C, RX_BUFS, TX_BUFS, BUF_SIZE>) -> R,
    {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Mac<C, RX_BUFS, TX_BUFS, BUF_SIZE>) -> R,
    {
        critical_section::with(|cs| {
            let mut guard = self.inner.borrow(cs).try_borrow_mut().ok()?;
            Some(f(&mut guard))
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::config::{MacConfig, State};
    use crate::testing::MockChip;

    static SHARED: SharedMac<MockChip, 4, 4, 256> = SharedMac::new(MockChip::new());

    #[test]
    fn static_shared_instance_is_usable() {
        SHARED.with(|mac| {
            // State depends on test ordering against other accesses of
            // the static; only exercise the accessors.
            let _ = mac.state();
            let _ = mac.capabilities();
        });
    }

    #[test]
    fn with_provides_exclusive_access() {
        let shared: SharedMac<MockChip, 4, 4, 256> = SharedMac::new(MockChip::new());

        shared.with(|mac| {
            mac.init(MacConfig::new()).unwrap();
        });

        assert_eq!(shared.with(|mac| mac.state()), State::Running);
    }

    #[test]
    fn try_with_succeeds_when_free() {
        let shared: SharedMac<MockChip, 4, 4, 256> = SharedMac::new(MockChip::new());

        let state = shared.try_with(|mac| mac.state());
        assert_eq!(state, Some(State::Uninitialized));
    }
}
