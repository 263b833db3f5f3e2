//! Driver configuration types: link parameters, MAC addresses,
//! capability flags and the driver state machine.

use crate::constants::MAC_ADDR_LEN;

// =============================================================================
// Link Parameters
// =============================================================================

/// Ethernet link speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    /// 10 Mbps (10BASE-T)
    Mbps10,
    /// 100 Mbps (100BASE-TX)
    #[default]
    Mbps100,
}

/// Ethernet duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    /// Half duplex (CSMA/CD)
    Half,
    /// Full duplex
    #[default]
    Full,
}

// =============================================================================
// MAC Address
// =============================================================================

/// A 48-bit IEEE 802 MAC address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacAddr(pub [u8; MAC_ADDR_LEN]);

impl MacAddr {
    /// The all-zero (unspecified) address
    pub const UNSPECIFIED: Self = Self([0; MAC_ADDR_LEN]);

    /// The broadcast address
    pub const BROADCAST: Self = Self([0xFF; MAC_ADDR_LEN]);

    /// Create an address from raw octets
    #[must_use]
    pub const fn new(octets: [u8; MAC_ADDR_LEN]) -> Self {
        Self(octets)
    }

    /// Raw octets, transmission order
    #[inline(always)]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; MAC_ADDR_LEN] {
        &self.0
    }

    /// Group-address bit: LSB of the first octet
    #[inline(always)]
    #[must_use]
    pub const fn is_multicast(&self) -> bool {
        (self.0[0] & 0x01) != 0
    }

    /// All-ones broadcast address
    #[inline(always)]
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// All-zero unspecified address
    #[inline(always)]
    #[must_use]
    pub fn is_unspecified(&self) -> bool {
        *self == Self::UNSPECIFIED
    }
}

impl core::fmt::Display for MacAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl From<[u8; MAC_ADDR_LEN]> for MacAddr {
    fn from(octets: [u8; MAC_ADDR_LEN]) -> Self {
        Self(octets)
    }
}

// =============================================================================
// Capabilities
// =============================================================================

/// What a driver instantiation supports, reported once at init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    /// Driver is interrupt-driven (as opposed to pure polling)
    pub interrupts: bool,
    /// The address filter can be reprogrammed at runtime
    pub multicast_filtering: bool,
    /// Speed can be reconfigured after init
    pub speed_selection: bool,
    /// Half-duplex operation is supported
    pub half_duplex: bool,
}

impl Capabilities {
    /// Everything supported
    #[must_use]
    pub const fn full() -> Self {
        Self {
            interrupts: true,
            multicast_filtering: true,
            speed_selection: true,
            half_duplex: true,
        }
    }

    /// Full-duplex-only controller
    #[must_use]
    pub const fn full_duplex_only() -> Self {
        Self {
            interrupts: true,
            multicast_filtering: true,
            speed_selection: true,
            half_duplex: false,
        }
    }
}

// =============================================================================
// Driver Configuration
// =============================================================================

/// MAC driver configuration.
///
/// Built with the `with_*` methods:
///
/// ```ignore
/// let config = MacConfig::new()
///     .with_mac_address(MacAddr::new([0x02, 0x00, 0x00, 0x12, 0x34, 0x56]));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacConfig {
    /// Station MAC address
    pub mac_address: MacAddr,
    /// Initial link speed, overwritten on the first PHY report
    pub speed: Speed,
    /// Initial duplex mode, overwritten on the first PHY report
    pub duplex: Duplex,
}

impl MacConfig {
    /// Create a configuration with defaults (100 Mbps full duplex,
    /// unspecified address)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mac_address: MacAddr::UNSPECIFIED,
            speed: Speed::Mbps100,
            duplex: Duplex::Full,
        }
    }

    /// Set the station MAC address
    #[must_use]
    pub const fn with_mac_address(mut self, addr: MacAddr) -> Self {
        self.mac_address = addr;
        self
    }

    /// Set the initial link speed
    #[must_use]
    pub const fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    /// Set the initial duplex mode
    #[must_use]
    pub const fn with_duplex(mut self, duplex: Duplex) -> Self {
        self.duplex = duplex;
        self
    }
}

impl Default for MacConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Driver State
// =============================================================================

/// Driver lifecycle state.
///
/// `Uninitialized → Initializing → Running`; there is no teardown
/// transition, the driver lives until reset. `Running` carries orthogonal
/// interrupt-enabled substates tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Not initialized
    #[default]
    Uninitialized,
    /// Initialization sequence in progress
    Initializing,
    /// Rings programmed, transceiver enabled
    Running,
}

// =============================================================================
// Unit Tests
// =============================================================================
