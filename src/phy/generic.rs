//! Generic Clause 22 PHY driver.
//!
//! Works with any transceiver that implements the standard register set;
//! speed and duplex are resolved from the advertised/partner ability
//! intersection after auto-negotiation, falling back to the BMCR forced
//! configuration when auto-negotiation is off.

use super::registers::{anar, bmcr, bmsr, phy_reg};
use super::{LinkStatus, PhyDriver};
use crate::driver::config::{Duplex, Speed};
use crate::error::Result;
use crate::mdio::MdioBus;

/// BMCR.RESET self-clear poll attempts
const RESET_ATTEMPTS: u32 = 100;

/// Generic IEEE 802.3 Clause 22 PHY.
pub struct GenericPhy {
    addr: u8,
    last_link: Option<LinkStatus>,
}

impl GenericPhy {
    /// Create a driver for the PHY at `addr`
    #[must_use]
    pub const fn new(addr: u8) -> Self {
        Self {
            addr,
            last_link: None,
        }
    }

    /// Resolve the negotiated link from the local/partner ability
    /// intersection, best mode first.
    fn resolve_negotiated<M: MdioBus>(&self, mdio: &mut M) -> Result<LinkStatus> {
        let advertised = mdio.read(self.addr, phy_reg::ANAR)?;
        let partner = mdio.read(self.addr, phy_reg::ANLPAR)?;
        let common = advertised & partner;

        let status = if common & anar::TX_FD != 0 {
            LinkStatus::fast_full()
        } else if common & anar::TX_HD != 0 {
            LinkStatus::fast_half()
        } else if common & anar::T10_FD != 0 {
            LinkStatus::slow_full()
        } else {
            LinkStatus::slow_half()
        };
        Ok(status)
    }

    /// Current link parameters from BMCR (forced configuration).
    fn resolve_forced<M: MdioBus>(&self, mdio: &mut M) -> Result<LinkStatus> {
        let control = mdio.read(self.addr, phy_reg::BMCR)?;

        let speed = if control & bmcr::SPEED_100 != 0 {
            Speed::Mbps100
        } else {
            Speed::Mbps10
        };
        let duplex = if control & bmcr::DUPLEX_FULL != 0 {
            Duplex::Full
        } else {
            Duplex::Half
        };
        Ok(LinkStatus::new(speed, duplex))
    }
}

impl PhyDriver for GenericPhy {
    fn address(&self) -> u8 {
        self.addr
    }

    fn init<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        self.soft_reset(mdio)?;
        self.enable_auto_negotiation(mdio)
    }

    fn soft_reset<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        mdio.write(self.addr, phy_reg::BMCR, bmcr::RESET)?;

        // The bit self-clears; some PHYs are slow, so an expired loop is
        // not an error.
        for _ in 0..RESET_ATTEMPTS {
            if mdio.read(self.addr, phy_reg::BMCR)? & bmcr::RESET == 0 {
                break;
            }
        }
        Ok(())
    }

    fn is_link_up<M: MdioBus>(&self, mdio: &mut M) -> Result<bool> {
        let status = mdio.read(self.addr, phy_reg::BMSR)?;
        Ok(status & bmsr::LINK_STATUS != 0)
    }

    fn link_status<M: MdioBus>(&self, mdio: &mut M) -> Result<Option<LinkStatus>> {
        let status = mdio.read(self.addr, phy_reg::BMSR)?;

        if status & bmsr::LINK_STATUS == 0 {
            return Ok(None);
        }

        let link = if status & bmsr::AN_COMPLETE != 0 {
            self.resolve_negotiated(mdio)?
        } else {
            self.resolve_forced(mdio)?
        };
        Ok(Some(link))
    }

    fn poll_link<M: MdioBus>(&mut self, mdio: &mut M) -> Result<Option<LinkStatus>> {
        let current = self.link_status(mdio)?;

        if current == self.last_link {
            return Ok(None);
        }
        self.last_link = current;

        // Only link-up transitions are reported; the MAC keeps its last
        // configuration across a link drop.
        Ok(current)
    }

    fn enable_auto_negotiation<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        let control = mdio.read(self.addr, phy_reg::BMCR)?;
        mdio.write(
            self.addr,
            phy_reg::BMCR,
            (control | bmcr::AN_ENABLE | bmcr::AN_RESTART) & !bmcr::ISOLATE,
        )
    }

    fn force_link<M: MdioBus>(&mut self, mdio: &mut M, status: LinkStatus) -> Result<()> {
        let mut control = mdio.read(self.addr, phy_reg::BMCR)?;

        control &= !(bmcr::AN_ENABLE | bmcr::ISOLATE);

        if matches!(status.speed, Speed::Mbps100) {
            control |= bmcr::SPEED_100;
        } else {
            control &= !bmcr::SPEED_100;
        }

        if matches!(status.duplex, Duplex::Full) {
            control |= bmcr::DUPLEX_FULL;
        } else {
            control &= !bmcr::DUPLEX_FULL;
        }

        mdio.write(self.addr, phy_reg::BMCR, control)
    }

    fn phy_id<M: MdioBus>(&self, mdio: &mut M) -> Result<u32> {
        let id1 = u32::from(mdio.read(self.addr, phy_reg::PHYIDR1)?);
        let id2 = u32::from(mdio.read(self.addr, phy_reg::PHYIDR2)?);
        Ok((id1 << 16) | id2)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
