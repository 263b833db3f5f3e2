//! Uniform driver interface and the MAC+PHY+MDIO bundle.
//!
//! [`NetDriver`] is the operation set the upper layer calls
//! polymorphically, regardless of chip: one trait object per interface
//! replaces the per-chip function tables the operation set descends
//! from. [`Interface`] wires a [`Mac`] to a PHY driver and an MDIO bus
//! and implements the trait.

use crate::chip::MacChip;
use crate::driver::config::{Capabilities, MacConfig};
use crate::driver::interrupt::IsrOutcome;
use crate::driver::mac::Mac;
use crate::error::{ConfigError, Result};
use crate::filter::FilterTable;
use crate::mdio::MdioBus;
use crate::phy::{LinkStatus, PhyDriver};

// =============================================================================
// NetDriver Trait
// =============================================================================

/// The uniform operation set every driver instantiation presents to the
/// upper layer.
pub trait NetDriver {
    /// One-time initialization; failure is terminal, the interface never
    /// comes up
    fn init(&mut self) -> Result<()>;

    /// Periodic housekeeping: PHY link polling and link-change hand-off
    fn tick(&mut self);

    /// Unmask the MAC interrupt
    fn enable_irq(&mut self);

    /// Mask the MAC interrupt
    fn disable_irq(&mut self);

    /// Task-level event handler: drain received frames upstream
    fn event_handler(&mut self, deliver: &mut dyn FnMut(&[u8]));

    /// Submit one frame; synchronous and non-blocking
    fn send(&mut self, frame: &[u8]) -> Result<()>;

    /// Rewrite the address filter from the upper layer's table
    fn update_addr_filter(&mut self, table: &FilterTable) -> Result<()>;

    /// Adjust the MAC to a PHY-reported link change
    fn update_mac_config(&mut self, link: LinkStatus);

    /// Read a PHY register over the bound MDIO bus
    fn read_phy_reg(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16>;

    /// Write a PHY register over the bound MDIO bus
    fn write_phy_reg(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()>;

    /// Capability flags reported once at init
    fn capabilities(&self) -> Capabilities;
}

// =============================================================================
// Interface
// =============================================================================

/// A network interface: MAC driver + PHY driver + MDIO bus.
///
/// The PHY slot may be empty while assembling; [`NetDriver::init`] fails
/// with `LinkNotConfigured` until a PHY is bound, because without one the
/// MAC would never learn its link parameters.
pub struct Interface<
    C: MacChip,
    P: PhyDriver,
    M: MdioBus,
    const RX_BUFS: usize,
    const TX_BUFS: usize,
    const BUF_SIZE: usize,
> {
    mac: Mac<C, RX_BUFS, TX_BUFS, BUF_SIZE>,
    phy: Option<P>,
    mdio: M,
    config: MacConfig,
    link: Option<LinkStatus>,
}

impl<
    C: MacChip,
    P: PhyDriver,
    M: MdioBus,
    const RX_BUFS: usize,
    const TX_BUFS: usize,
    const BUF_SIZE: usize,
> Interface<C, P, M, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    /// Assemble an interface. Const-compatible for static allocation.
    pub const fn new(chip: C, phy: Option<P>, mdio: M, config: MacConfig) -> Self {
        Self {
            mac: Mac::new(chip),
            phy,
            mdio,
            config,
            link: None,
        }
    }

    /// Bind a PHY driver after assembly
    pub fn bind_phy(&mut self, phy: P) {
        self.phy = Some(phy);
    }

    /// Access the MAC driver
    pub fn mac(&self) -> &Mac<C, RX_BUFS, TX_BUFS, BUF_SIZE> {
        &self.mac
    }

    /// Mutable access to the MAC driver
    pub fn mac_mut(&mut self) -> &mut Mac<C, RX_BUFS, TX_BUFS, BUF_SIZE> {
        &mut self.mac
    }

    /// Last link state reported by the PHY
    pub fn link(&self) -> Option<LinkStatus> {
        self.link
    }

    /// Interrupt top half; forwards to [`Mac::on_interrupt`]
    pub fn on_interrupt(&mut self) -> IsrOutcome {
        self.mac.on_interrupt()
    }
}

impl<
    C: MacChip,
    P: PhyDriver,
    M: MdioBus,
    const RX_BUFS: usize,
    const TX_BUFS: usize,
    const BUF_SIZE: usize,
> NetDriver for Interface<C, P, M, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    fn init(&mut self) -> Result<()> {
        let Some(phy) = self.phy.as_mut() else {
            return Err(ConfigError::LinkNotConfigured.into());
        };

        self.mac.init(self.config)?;
        phy.init(&mut self.mdio)
    }

    fn tick(&mut self) {
        let Some(phy) = self.phy.as_mut() else {
            return;
        };

        // Level-triggered on PHY-reported state: the PHY driver decides
        // when the link changed, the MAC just follows.
        match phy.poll_link(&mut self.mdio) {
            Ok(Some(link)) => {
                self.link = Some(link);
                self.mac.update_mac_config(link.speed, link.duplex);
            }
            Ok(None) => {}
            Err(_e) => {
                #[cfg(feature = "log")]
                log::warn!("PHY poll failed: {}", _e);
            }
        }
    }

    fn enable_irq(&mut self) {
        self.mac.enable_irq();
    }

    fn disable_irq(&mut self) {
        self.mac.disable_irq();
    }

    fn event_handler(&mut self, deliver: &mut dyn FnMut(&[u8])) {
        self.mac.service(deliver);
    }

    fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.mac.send(frame)
    }

    fn update_addr_filter(&mut self, table: &FilterTable) -> Result<()> {
        self.mac.update_addr_filter(table)
    }

    fn update_mac_config(&mut self, link: LinkStatus) {
        self.link = Some(link);
        self.mac.update_mac_config(link.speed, link.duplex);
    }

    fn read_phy_reg(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        self.mdio.read(phy_addr, reg_addr)
    }

    fn write_phy_reg(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        self.mdio.write(phy_addr, reg_addr, value)
    }

    fn capabilities(&self) -> Capabilities {
        C::CAPABILITIES
    }
}

// =============================================================================
// Tests
// =============================================================================
