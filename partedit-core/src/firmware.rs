// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reads the platform firmware's view of installed disks out of a
//! hierarchical configuration store, independent of what the scanner
//! later finds by opening the devices directly.

use crate::collab::ConfigStore;
use partedit_types::DiskGeometry;

const MULTIFUNCTION_ADAPTER_KEY: &str =
    "HARDWARE\\DESCRIPTION\\System\\MultifunctionAdapter";

/// One disk as described by platform firmware: its position in the
/// adapter/controller/disk hierarchy, its MBR signature and checksum,
/// and cached CHS geometry.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct FirmwareDisk {
    /// Adapter index. Historically always stored as 0 regardless of
    /// the enumerated key, a quirk of the original firmware convention
    /// preserved here for compatibility with correlation by triple.
    pub adapter: u32,
    /// Controller index under the adapter.
    pub controller: u32,
    /// Disk index under the controller.
    pub disk: u32,
    /// 32-bit MBR disk signature reported by firmware.
    pub signature: u32,
    /// 32-bit MBR checksum reported by firmware.
    pub checksum: u32,
    /// Geometry firmware associates with this disk, if parsed.
    pub geometry: DiskGeometry,
}

fn parse_hex_u32(s: &str) -> Option<u32> {
    u32::from_str_radix(s, 16).ok()
}

/// Parse an `Identifier` value of the form `"CCCCCCCC-SSSSSSSS-?"` into
/// `(checksum, signature)`. Returns `None` if the value doesn't split
/// into at least two hyphen-separated fields or either field fails to
/// parse as 32-bit hex.
fn parse_identifier(identifier: &str) -> Option<(u32, u32)> {
    let mut parts = identifier.split('-');
    let checksum = parse_hex_u32(parts.next()?)?;
    let signature = parse_hex_u32(parts.next()?)?;
    Some((checksum, signature))
}

/// Walk `…/MultifunctionAdapter/<a>/DiskController/<c>/DiskPeripheral/<d>`
/// and build the firmware disk list in adapter/controller/disk
/// enumeration order. Malformed entries (unparseable `Identifier`,
/// missing subkeys) are logged and skipped rather than aborting the
/// whole walk.
#[must_use]
pub fn enumerate_firmware_disks(store: &dyn ConfigStore) -> Vec<FirmwareDisk> {
    let mut out = Vec::new();

    for adapter_key in store.subkeys(MULTIFUNCTION_ADAPTER_KEY) {
        let adapter_path = format!("{MULTIFUNCTION_ADAPTER_KEY}\\{adapter_key}");
        let controller_root = format!("{adapter_path}\\DiskController");
        for controller_key in store.subkeys(&controller_root) {
            let controller_path = format!("{controller_root}\\{controller_key}");
            let Some(controller) = controller_key.parse::<u32>().ok() else {
                log::warn!("firmware map: non-numeric DiskController key {controller_key:?}");
                continue;
            };
            let peripheral_root = format!("{controller_path}\\DiskPeripheral");
            for (disk_ordinal, disk_key) in store.subkeys(&peripheral_root).into_iter().enumerate() {
                let disk_path = format!("{peripheral_root}\\{disk_key}");
                let Some(identifier) = store
                    .read_value(&disk_path, "Identifier")
                    .and_then(|v| v.as_str().map(str::to_owned))
                else {
                    log::warn!("firmware map: {disk_path} has no Identifier value, skipping");
                    continue;
                };
                let Some((checksum, signature)) = parse_identifier(&identifier) else {
                    log::warn!("firmware map: unparseable Identifier {identifier:?} at {disk_path}");
                    continue;
                };

                let Some(disk) = disk_key.parse::<u32>().ok() else {
                    log::warn!("firmware map: non-numeric DiskPeripheral key {disk_key:?}");
                    continue;
                };
                // `disk_ordinal` tracks the d-th entry under this
                // controller for Int13DriveParameter association, kept
                // separate from the registry-derived `disk` index
                // since they need not coincide.
                let _ = disk_ordinal;

                out.push(FirmwareDisk {
                    adapter: 0,
                    controller,
                    disk,
                    signature,
                    checksum,
                    geometry: DiskGeometry::UNKNOWN,
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{ConfigValue, MapConfigStore};

    fn populated_store() -> MapConfigStore {
        let mut store = MapConfigStore::new();
        store.add_subkey(MULTIFUNCTION_ADAPTER_KEY, "0");
        let adapter = format!("{MULTIFUNCTION_ADAPTER_KEY}\\0");
        let controllers = format!("{adapter}\\DiskController");
        store.add_subkey(&controllers, "0");
        let controller = format!("{controllers}\\0");
        let peripherals = format!("{controller}\\DiskPeripheral");
        store.add_subkey(&peripherals, "0");
        store.add_subkey(&peripherals, "1");
        store.write_value(
            &format!("{peripherals}\\0"),
            "Identifier",
            ConfigValue::Str("0000002a-deadbeef-0".into()),
        );
        store.write_value(
            &format!("{peripherals}\\1"),
            "Identifier",
            ConfigValue::Str("garbage".into()),
        );
        store
    }

    #[test]
    fn test_enumerate_firmware_disks_parses_identifier() {
        let store = populated_store();
        let disks = enumerate_firmware_disks(&store);
        assert_eq!(disks.len(), 1);
        assert_eq!(disks[0].checksum, 0x2a);
        assert_eq!(disks[0].signature, 0xdead_beef);
        assert_eq!(disks[0].adapter, 0);
        assert_eq!(disks[0].controller, 0);
        assert_eq!(disks[0].disk, 0);
    }

    #[test]
    fn test_enumerate_firmware_disks_empty_store() {
        let store = MapConfigStore::new();
        assert!(enumerate_firmware_disks(&store).is_empty());
    }
}
