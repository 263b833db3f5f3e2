//! Chip-generic MAC driver instance.
//!
//! [`Mac`] owns the chip register access, the descriptor rings and all
//! driver state; it is created once at boot and lives for the process
//! lifetime. There is no teardown path.
//!
//! Interrupt discipline: the top half ([`Mac::on_interrupt`]) reads the
//! status register once, acknowledges only the observed bits, latches
//! events and masks further receive interrupts. The task-level event
//! handler ([`Mac::service`]) drains the receive ring to empty and only
//! then unmasks receive interrupts, which prevents interrupt storms while
//! a drain is already in progress.

use crate::chip::MacChip;
use crate::dma::{DmaChannel, TxSubmit};
use crate::error::{ConfigError, DmaError, Error, IoError, Result};
use crate::filter::{FilterTable, sync_filter};

use super::config::{Capabilities, Duplex, MacAddr, MacConfig, Speed, State};
use super::interrupt::IsrOutcome;

// =============================================================================
// Counters
// =============================================================================

/// Per-instance traffic counters.
///
/// Per-packet errors are invisible to users of the stack; these counters
/// are the only way they surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacCounters {
    /// Frames handed to the DMA engine
    pub tx_frames: u32,
    /// Frames delivered upstream
    pub rx_frames: u32,
    /// Receive frames dropped for errors or incomplete framing
    pub rx_errors: u32,
}

// =============================================================================
// MAC Driver
// =============================================================================

/// Chip-generic Ethernet MAC driver.
///
/// # Type Parameters
/// * `C` - Chip register access
/// * `RX_BUFS` - Number of receive buffers
/// * `TX_BUFS` - Number of transmit buffers
/// * `BUF_SIZE` - Size of each buffer in bytes
///
/// # Example
/// ```ignore
/// static MAC: SharedMac<MyChip, 6, 3, 1536> = SharedMac::new(MyChip::new());
///
/// MAC.with(|mac| {
///     mac.init(MacConfig::new().with_mac_address(addr)).unwrap();
///     mac.enable_irq();
/// });
/// ```
pub struct Mac<C: MacChip, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> {
    /// Chip register access
    chip: C,
    /// Descriptor rings and buffer pools
    dma: DmaChannel<RX_BUFS, TX_BUFS, BUF_SIZE>,
    /// Current configuration
    config: MacConfig,
    /// Lifecycle state
    state: State,
    /// Current link speed
    speed: Speed,
    /// Current duplex mode
    duplex: Duplex,
    /// Interrupt-enabled substate
    irq_enabled: bool,
    /// Receive-interrupt substate (masked while draining)
    rx_irq_enabled: bool,
    /// Latched by the ISR: the event handler must run
    rx_pending: bool,
    /// Latched transmit-space signal for the upper layer
    tx_space: bool,
    /// Traffic counters
    counters: MacCounters,
}

impl<C: MacChip, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    Mac<C, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    /// Create a new driver instance in the `Uninitialized` state.
    ///
    /// Const-compatible for static allocation.
    pub const fn new(chip: C) -> Self {
        Self {
            chip,
            dma: DmaChannel::new(),
            config: MacConfig::new(),
            state: State::Uninitialized,
            speed: Speed::Mbps100,
            duplex: Duplex::Full,
            irq_enabled: false,
            rx_irq_enabled: false,
            rx_pending: false,
            tx_space: false,
            counters: MacCounters {
                tx_frames: 0,
                rx_frames: 0,
                rx_errors: 0,
            },
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current lifecycle state
    #[inline(always)]
    pub fn state(&self) -> State {
        self.state
    }

    /// Station MAC address
    #[inline(always)]
    pub fn mac_address(&self) -> &MacAddr {
        &self.config.mac_address
    }

    /// Current link speed
    #[inline(always)]
    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Current duplex mode
    #[inline(always)]
    pub fn duplex(&self) -> Duplex {
        self.duplex
    }

    /// Capability flags for this chip, reported once at init
    #[inline(always)]
    pub fn capabilities(&self) -> Capabilities {
        C::CAPABILITIES
    }

    /// Traffic counters
    #[inline(always)]
    pub fn counters(&self) -> MacCounters {
        self.counters
    }

    /// Whether the interrupt is unmasked at the controller level
    #[inline(always)]
    pub fn irq_enabled(&self) -> bool {
        self.irq_enabled
    }

    /// Whether the event handler has been signalled and not yet run
    #[inline(always)]
    pub fn rx_pending(&self) -> bool {
        self.rx_pending
    }

    /// Whether the transmit ring can accept a frame right now
    #[inline(always)]
    pub fn tx_space_available(&self) -> bool {
        self.dma.tx_space_available()
    }

    /// Whether a received frame is waiting in the ring
    #[inline(always)]
    pub fn rx_available(&self) -> bool {
        self.dma.rx_available()
    }

    /// Chip register access (for MDIO controllers layered on the same
    /// peripheral)
    #[inline(always)]
    pub fn chip_mut(&mut self) -> &mut C {
        &mut self.chip
    }

    /// Consume the latched transmit-space signal.
    ///
    /// Guaranteed to fire at least once after every `Busy` rejection;
    /// multiple completions may coalesce into one signal.
    pub fn take_tx_space_event(&mut self) -> bool {
        core::mem::take(&mut self.tx_space)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize the driver.
    ///
    /// Programs the station address, chains the descriptor rings, writes
    /// the ring base registers and enables the transceiver. Interrupts
    /// stay masked until [`Mac::enable_irq`]; the rings are always ready
    /// before unmasking.
    ///
    /// # Errors
    /// - `AlreadyInitialized` - the driver has no teardown path; a second
    ///   init is refused
    pub fn init(&mut self, config: MacConfig) -> Result<()> {
        if self.state != State::Uninitialized {
            return Err(ConfigError::AlreadyInitialized.into());
        }
        self.state = State::Initializing;

        self.config = config;
        self.speed = config.speed;
        self.duplex = config.duplex;

        self.chip.set_station_address(&config.mac_address);
        self.dma.init_rings(&mut self.chip);
        self.chip.apply_link(self.speed, self.duplex);
        self.chip.start_transceiver();

        self.state = State::Running;

        #[cfg(feature = "log")]
        log::info!("MAC up, station {}", self.config.mac_address);

        Ok(())
    }

    // =========================================================================
    // Interrupt control
    // =========================================================================

    /// Unmask the MAC interrupt.
    pub fn enable_irq(&mut self) {
        self.chip.set_rx_irq_enabled(true);
        self.chip.set_irq_enabled(true);
        self.irq_enabled = true;
        self.rx_irq_enabled = true;
    }

    /// Mask the MAC interrupt.
    pub fn disable_irq(&mut self) {
        self.chip.set_irq_enabled(false);
        self.irq_enabled = false;
    }

    /// Interrupt top half; non-blocking, call from the ISR.
    ///
    /// Reads the status register once, tests the transmit-complete and
    /// frame-received conditions independently and acknowledges only the
    /// bits observed set. On frame reception, further receive interrupts
    /// are masked until [`Mac::service`] has drained the ring.
    pub fn on_interrupt(&mut self) -> IsrOutcome {
        let events = self.chip.irq_events();
        self.chip.ack_irq_events(events);

        let mut outcome = IsrOutcome::default();

        if events.tx_done && self.dma.tx_space_available() {
            self.tx_space = true;
            outcome.tx_space = true;
        }

        if events.rx_done {
            self.chip.set_rx_irq_enabled(false);
            self.rx_irq_enabled = false;
            self.rx_pending = true;
            outcome.rx_event = true;
        }

        outcome
    }

    // =========================================================================
    // Transmit
    // =========================================================================

    /// Submit one frame for transmission; synchronous and non-blocking.
    ///
    /// Fails fast with `Busy` when the ring is full; the caller must then
    /// wait for the transmit-space signal instead of spinning. Oversized
    /// frames are rejected with `InvalidLength` (and the space signal is
    /// still raised so a waiting sender is never stranded).
    pub fn send(&mut self, frame: &[u8]) -> Result<()> {
        if self.state != State::Running {
            return Err(IoError::InvalidState.into());
        }

        match self.dma.tx_submit(&mut self.chip, frame) {
            Ok(TxSubmit { space_available }) => {
                self.counters.tx_frames = self.counters.tx_frames.wrapping_add(1);
                if space_available {
                    self.tx_space = true;
                }
                Ok(())
            }
            Err(e @ Error::Dma(DmaError::InvalidLength)) => {
                self.tx_space = true;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Receive
    // =========================================================================

    /// Task-level event handler.
    ///
    /// Drains the receive ring until empty, delivering each complete
    /// frame upstream exactly once and absorbing error frames (counted,
    /// recycled, never fatal), then re-enables receive interrupts.
    pub fn service(&mut self, deliver: &mut dyn FnMut(&[u8])) {
        loop {
            match self.dma.rx_drain(&mut self.chip, |frame| deliver(frame)) {
                Ok(Some(())) => {
                    self.counters.rx_frames = self.counters.rx_frames.wrapping_add(1);
                }
                Err(_) => {
                    self.counters.rx_errors = self.counters.rx_errors.wrapping_add(1);
                }
                Ok(None) => break,
            }
        }

        self.rx_pending = false;

        // Re-enable only after the ring is empty, and only when the
        // controller-level mask is open.
        if self.irq_enabled {
            self.chip.set_rx_irq_enabled(true);
            self.rx_irq_enabled = true;
        }
    }

    /// Poll for one received frame, copying it into `buf`.
    ///
    /// Returns `Ok(None)` when the ring is empty. Error frames surface as
    /// `InvalidPacket` after being recycled. Intended for polling-mode
    /// integrations; interrupt-driven users should use [`Mac::service`].
    pub fn poll_receive(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        if self.state != State::Running {
            return Err(IoError::InvalidState.into());
        }

        let polled = self.dma.rx_drain(&mut self.chip, |frame| {
            let len = frame.len().min(buf.len());
            buf[..len].copy_from_slice(&frame[..len]);
            len
        });

        match polled {
            Ok(Some(len)) => {
                self.counters.rx_frames = self.counters.rx_frames.wrapping_add(1);
                Ok(Some(len))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                self.counters.rx_errors = self.counters.rx_errors.wrapping_add(1);
                Err(e)
            }
        }
    }

    // =========================================================================
    // Reconfiguration
    // =========================================================================

    /// Adjust the MAC to a PHY-reported link change.
    ///
    /// Stops the transceiver, rewrites the duplex/speed-dependent bits
    /// and re-enables. Invoked from the PHY driver's link-change
    /// notification, never by the upper layer directly.
    pub fn update_mac_config(&mut self, speed: Speed, duplex: Duplex) {
        self.chip.stop_transceiver();
        self.chip.apply_link(speed, duplex);
        if self.state == State::Running {
            self.chip.start_transceiver();
        }

        self.speed = speed;
        self.duplex = duplex;

        #[cfg(feature = "log")]
        log::info!("link reconfigured: {:?} {:?}", speed, duplex);
    }

    /// Rewrite the chip's address filter from the upper layer's table.
    pub fn update_addr_filter<const N: usize>(&mut self, table: &FilterTable<N>) -> Result<()> {
        sync_filter(&mut self.chip, &self.config.mac_address, table)
    }

    // =========================================================================
    // Test support
    // =========================================================================

    #[cfg(test)]
    pub(crate) fn dma_mut(&mut self) -> &mut DmaChannel<RX_BUFS, TX_BUFS, BUF_SIZE> {
        &mut self.dma
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;
    use crate::driver::interrupt::IrqEvents;
    use crate::testing::{MockChip, SimDma};

    type TestMac = Mac<MockChip, 4, 4, 256>;

    fn running_mac() -> TestMac {
        let mut mac = Mac::new(MockChip::new());
        mac.init(MacConfig::new().with_mac_address(MacAddr::new([2, 0, 0, 0, 0, 1])))
            .unwrap();
        mac
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    #[test]
    fn init_transitions_to_running() {
        let mut mac = Mac::<MockChip, 4, 4, 256>::new(MockChip::new());
        assert_eq!(mac.state(), State::Uninitialized);

        mac.init(MacConfig::new()).unwrap();

        assert_eq!(mac.state(), State::Running);
        assert!(mac.chip_mut().transceiver_running);
        assert_ne!(mac.chip_mut().rx_ring_base, 0);
    }

    #[test]
    fn double_init_is_refused() {
        let mut mac = running_mac();
        assert_eq!(
            mac.init(MacConfig::new()),
            Err(Error::Config(ConfigError::AlreadyInitialized))
        );
        assert_eq!(mac.state(), State::Running);
    }

    #[test]
    fn init_programs_station_address_before_rings() {
        let addr = MacAddr::new([2, 0, 0, 0, 0, 0x42]);
        let mut mac = Mac::<MockChip, 4, 4, 256>::new(MockChip::new());
        mac.init(MacConfig::new().with_mac_address(addr)).unwrap();

        assert_eq!(mac.chip_mut().station, addr);
        assert_eq!(*mac.mac_address(), addr);
    }

    #[test]
    fn init_leaves_interrupts_masked() {
        let mac = running_mac();
        assert!(!mac.irq_enabled());
    }

    #[test]
    fn send_before_init_is_invalid_state() {
        let mut mac = Mac::<MockChip, 4, 4, 256>::new(MockChip::new());
        assert_eq!(
            mac.send(&[0u8; 60]),
            Err(Error::Io(IoError::InvalidState))
        );
    }

    // =========================================================================
    // Interrupt discipline
    // =========================================================================

    #[test]
    fn enable_irq_unmasks_both_levels() {
        let mut mac = running_mac();
        mac.enable_irq();

        assert!(mac.irq_enabled());
        assert!(mac.chip_mut().irq_enabled);
        assert!(mac.chip_mut().rx_irq_enabled);
    }

    #[test]
    fn rx_interrupt_masks_rx_and_latches_event() {
        let mut mac = running_mac();
        mac.enable_irq();

        mac.chip_mut().raise_irq(IrqEvents {
            tx_done: false,
            rx_done: true,
        });
        let outcome = mac.on_interrupt();

        assert!(outcome.rx_event);
        assert!(!outcome.tx_space);
        assert!(mac.rx_pending());
        // Receive interrupts stay masked until the drain completes.
        assert!(!mac.chip_mut().rx_irq_enabled);
    }

    #[test]
    fn isr_acknowledges_only_observed_bits() {
        let mut mac = running_mac();
        mac.enable_irq();

        mac.chip_mut().raise_irq(IrqEvents {
            tx_done: false,
            rx_done: true,
        });
        mac.on_interrupt();

        // Only the observed rx_done bit was acknowledged.
        let acked = mac.chip_mut().last_ack;
        assert!(acked.rx_done);
        assert!(!acked.tx_done);
        assert!(!mac.chip_mut().pending_irq.rx_done);
    }

    #[test]
    fn service_drains_to_empty_then_reenables_rx_irq() {
        let mut mac = running_mac();
        mac.enable_irq();
        let mut sim = SimDma::new();

        sim.receive_frame_mac(&mut mac, &[0x10u8; 60]);
        sim.receive_frame_mac(&mut mac, &[0x20u8; 80]);

        mac.chip_mut().raise_irq(IrqEvents {
            tx_done: false,
            rx_done: true,
        });
        mac.on_interrupt();
        assert!(!mac.chip_mut().rx_irq_enabled);

        let mut lens = Vec::new();
        mac.service(&mut |frame| lens.push(frame.len()));

        assert_eq!(lens, [60, 80]);
        assert!(!mac.rx_pending());
        assert!(mac.chip_mut().rx_irq_enabled);
        assert_eq!(mac.counters().rx_frames, 2);
    }

    #[test]
    fn service_absorbs_error_frames_and_keeps_draining() {
        let mut mac = running_mac();
        mac.enable_irq();
        let mut sim = SimDma::new();

        sim.receive_frame_mac(&mut mac, &[0xAAu8; 60]);
        sim.receive_error_frame_mac(&mut mac);
        sim.receive_frame_mac(&mut mac, &[0xBBu8; 60]);

        let mut seen = Vec::new();
        mac.service(&mut |frame| seen.push(frame[0]));

        // The error frame is counted, never delivered, and never stops
        // the drain.
        assert_eq!(seen, [0xAA, 0xBB]);
        assert_eq!(mac.counters().rx_errors, 1);
        assert_eq!(mac.counters().rx_frames, 2);
    }

    #[test]
    fn service_without_irq_enabled_leaves_rx_masked() {
        let mut mac = running_mac();
        let mut sim = SimDma::new();
        sim.receive_frame_mac(&mut mac, &[0u8; 60]);

        mac.service(&mut |_| {});

        assert!(!mac.chip_mut().rx_irq_enabled);
    }

    // =========================================================================
    // Transmit backpressure
    // =========================================================================

    #[test]
    fn busy_then_completion_signals_space_exactly_once() {
        let mut mac = running_mac();
        mac.enable_irq();
        let mut sim = SimDma::new();

        // Drain the latched signal from successful sends first.
        for _ in 0..4 {
            mac.send(&[0u8; 60]).unwrap();
        }
        mac.take_tx_space_event();

        assert_eq!(mac.send(&[0u8; 60]), Err(Error::Dma(DmaError::Busy)));
        assert!(!mac.take_tx_space_event());

        // One hardware completion, one TX interrupt.
        assert!(sim.complete_tx_mac(&mut mac));
        mac.chip_mut().raise_irq(IrqEvents {
            tx_done: true,
            rx_done: false,
        });
        let outcome = mac.on_interrupt();

        assert!(outcome.tx_space);
        assert!(mac.take_tx_space_event());
        assert!(!mac.take_tx_space_event(), "signal must not repeat");

        // Exactly one more frame fits.
        mac.send(&[0u8; 60]).unwrap();
        assert_eq!(mac.send(&[0u8; 60]), Err(Error::Dma(DmaError::Busy)));
    }

    #[test]
    fn tx_interrupt_without_free_descriptor_stays_silent() {
        let mut mac = running_mac();
        mac.enable_irq();

        for _ in 0..4 {
            mac.send(&[0u8; 60]).unwrap();
        }
        mac.take_tx_space_event();

        // Spurious TX-done with the ring still full: no signal.
        mac.chip_mut().raise_irq(IrqEvents {
            tx_done: true,
            rx_done: false,
        });
        let outcome = mac.on_interrupt();

        assert!(!outcome.tx_space);
        assert!(!mac.take_tx_space_event());
    }

    #[test]
    fn oversized_send_raises_space_signal() {
        let mut mac = running_mac();
        mac.take_tx_space_event();

        let too_big = [0u8; 300];
        assert_eq!(
            mac.send(&too_big),
            Err(Error::Dma(DmaError::InvalidLength))
        );
        // A caller blocked on the signal is never stranded by a length
        // rejection.
        assert!(mac.take_tx_space_event());
    }

    // =========================================================================
    // Polling receive
    // =========================================================================

    #[test]
    fn poll_receive_copies_one_frame() {
        let mut mac = running_mac();
        let mut sim = SimDma::new();
        sim.receive_frame_mac(&mut mac, &[0x5Au8; 100]);

        let mut buf = [0u8; 256];
        let len = mac.poll_receive(&mut buf).unwrap();

        assert_eq!(len, Some(100));
        assert_eq!(&buf[..100], &[0x5A; 100]);
        assert_eq!(mac.poll_receive(&mut buf).unwrap(), None);
    }

    #[test]
    fn poll_receive_clamps_to_caller_buffer() {
        let mut mac = running_mac();
        let mut sim = SimDma::new();
        sim.receive_frame_mac(&mut mac, &[0x77u8; 200]);

        let mut buf = [0u8; 64];
        let len = mac.poll_receive(&mut buf).unwrap();

        assert_eq!(len, Some(64));
    }

    // =========================================================================
    // Link reconfiguration
    // =========================================================================

    #[test]
    fn update_mac_config_stops_reconfigures_restarts() {
        let mut mac = running_mac();
        let stops_before = mac.chip_mut().transceiver_stops;

        mac.update_mac_config(Speed::Mbps10, Duplex::Half);

        assert_eq!(mac.speed(), Speed::Mbps10);
        assert_eq!(mac.duplex(), Duplex::Half);
        assert_eq!(mac.chip_mut().transceiver_stops, stops_before + 1);
        assert!(mac.chip_mut().transceiver_running);
        assert_eq!(mac.chip_mut().link, Some((Speed::Mbps10, Duplex::Half)));
    }

    // =========================================================================
    // Filter plumbing
    // =========================================================================

    #[test]
    fn update_addr_filter_reaches_chip() {
        let mut mac = running_mac();
        let mut table: FilterTable<8> = FilterTable::new();
        table
            .add(MacAddr::new([0x01, 0x00, 0x5E, 0, 0, 1]))
            .unwrap();

        mac.update_addr_filter(&table).unwrap();

        assert_ne!(mac.chip_mut().hash_table, 0);
    }

    #[test]
    fn capabilities_come_from_chip() {
        let mac = running_mac();
        assert_eq!(mac.capabilities(), MockChip::CAPABILITIES);
    }
}
