//! Ethernet MAC Driver Framework
//!
//! A `no_std`, no-alloc framework for Ethernet MAC drivers built around
//! a descriptor-ring protocol shared between software and a DMA engine.
//! The design every supported controller instantiates:
//!
//! 1. **Descriptor rings** ([`dma`]): fixed buffer pools and circular
//!    TX/RX rings arbitrated by a per-descriptor ownership bit
//! 2. **Driver core** ([`driver`]): the uniform operation set (init,
//!    tick, send, event handler, filter and link updates) plus the
//!    interrupt-to-task hand-off discipline
//! 3. **MDIO engine** ([`mdio`]): clause-22 PHY register access, either
//!    hardware-assisted or bit-banged over two pins
//! 4. **Address filter** ([`filter`]): perfect-match unicast slots plus
//!    a CRC-32 indexed 64-bit multicast hash table
//! 5. **PHY boundary** ([`phy`]): link polling and negotiation via a
//!    generic clause-22 driver
//!
//! Chip-specific code is confined to one [`chip::MacChip`]
//! implementation per controller: register addresses, doorbells and
//! policy constants. All protocol logic is written once here.
//!
//! # Concurrency model
//!
//! One hardware interrupt context plus one cooperating task context.
//! Descriptor memory is never locked; the ownership bit decides who may
//! touch a buffer, and the `disable → drain-to-empty → re-enable`
//! discipline in the event handler prevents interrupt storms and lost
//! wakeups.
//!
//! # Example
//!
//! ```ignore
//! use ethmac_core::{GenericPhy, Interface, MacAddr, MacConfig, NetDriver};
//!
//! let config = MacConfig::new()
//!     .with_mac_address(MacAddr::new([0x02, 0x00, 0x00, 0x12, 0x34, 0x56]));
//!
//! // MyChip implements MacChip; MyMdio implements MdioBus.
//! let mut iface = Interface::<_, _, _, 6, 3, 1536>::new(
//!     MyChip::new(),
//!     Some(GenericPhy::new(0)),
//!     MyMdio::new(),
//!     config,
//! );
//!
//! iface.init().unwrap();
//! iface.enable_irq();
//!
//! // Periodically:
//! iface.tick();
//!
//! // From the event task:
//! iface.event_handler(&mut |frame| stack.input(frame));
//! ```
//!
//! # Features
//!
//! - `defmt`: defmt formatting for public types
//! - `log`: host-side diagnostics for dropped frames and lifecycle
//! - `smoltcp`: smoltcp network stack integration
//! - `critical-section`: ISR-safe `SharedMac` wrapper

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod chip;
pub mod constants;
pub mod dma;
pub mod driver;
pub mod error;
pub mod filter;
pub mod mdio;
pub mod phy;

#[cfg(feature = "smoltcp")]
#[cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
pub mod integration;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use chip::{MacChip, MulticastPolicy};
pub use dma::{DmaChannel, Ownership, TxSubmit};
pub use driver::config::{Capabilities, Duplex, MacAddr, MacConfig, Speed, State};
pub use driver::interrupt::{IrqEvents, IsrOutcome};
pub use driver::mac::{Mac, MacCounters};
pub use driver::nic::{Interface, NetDriver};
pub use error::{ConfigError, DmaError, Error, IoError, Result};
pub use filter::{FilterEntry, FilterTable, MAC_FILTER_MAX};
pub use mdio::{BitBangMdio, MdioBus, MdioPins, SmiController, SmiRegisters};
pub use phy::{GenericPhy, LinkStatus, PhyDriver};

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::SharedMac;

// Re-export smoltcp glue when enabled
#[cfg(feature = "smoltcp")]
pub use integration::smoltcp::{MacRxToken, MacTxToken, ethernet_address};
