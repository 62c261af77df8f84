// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt::{self, Display, Formatter};

/// SCSI path to a block device, as reported by the firmware/bus layer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ScsiAddress {
    /// Host bus adapter port number.
    pub port: u8,
    /// SCSI bus number on that port.
    pub bus: u8,
    /// Target (device) ID on that bus.
    pub target: u8,
}

impl ScsiAddress {
    /// Construct a SCSI address from its three components.
    #[must_use]
    pub fn new(port: u8, bus: u8, target: u8) -> Self {
        Self { port, bus, target }
    }
}

impl Display for ScsiAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "port{}/bus{}/target{}", self.port, self.bus, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scsi_address_display() {
        let addr = ScsiAddress::new(0, 1, 2);
        assert_eq!(addr.to_string(), "port0/bus1/target2");
    }
}
