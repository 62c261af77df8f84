// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::firmware::FirmwareDisk;
use crate::model::disk::Disk;

/// Reference to a region: an index into a disk's primary or logical
/// list, paired with the owning disk's index.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RegionRef {
    /// Index of the disk within the list.
    pub disk_index: usize,
    /// True if `region_index` refers to the logical list.
    pub is_logical: bool,
    /// Index within the selected list.
    pub region_index: usize,
}

/// Top-level aggregate: every scanned disk, every firmware-visible
/// disk, and the current system-partition selection.
#[derive(Clone, Debug, Default)]
pub struct PartitionList {
    /// Every disk the scanner found, in enumeration order.
    pub disks: Vec<Disk>,
    /// Firmware boot-order view, independent of `disks`.
    pub firmware_disks: Vec<FirmwareDisk>,
    /// Region currently selected as the bootable system partition.
    pub system_partition: Option<RegionRef>,
}

impl PartitionList {
    /// An empty list with no disks scanned yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a region by reference, immutably.
    #[must_use]
    pub fn region(&self, r: RegionRef) -> Option<&crate::model::region::Region> {
        let disk = self.disks.get(r.disk_index)?;
        if r.is_logical {
            disk.logical.get(r.region_index)
        } else {
            disk.primary.get(r.region_index)
        }
    }

    /// Look up a region by reference, mutably.
    pub fn region_mut(&mut self, r: RegionRef) -> Option<&mut crate::model::region::Region> {
        let disk = self.disks.get_mut(r.disk_index)?;
        if r.is_logical {
            disk.logical.get_mut(r.region_index)
        } else {
            disk.primary.get_mut(r.region_index)
        }
    }

    /// Find a disk by its system-assigned number.
    #[must_use]
    pub fn get_disk_by_number(&self, number: u32) -> Option<&Disk> {
        self.disks.iter().find(|d| d.number == number)
    }

    /// Find a disk by its (adapter, controller, disk) firmware BIOS
    /// triple.
    #[must_use]
    pub fn get_disk_by_bios_number(&self, adapter: u32, controller: u32, disk: u32) -> Option<&Disk> {
        self.disks.iter().find(|d| {
            d.firmware.found
                && d.firmware.adapter == adapter
                && d.firmware.controller == controller
                && d.firmware.disk == disk
        })
    }

    /// Find a disk by its SCSI address.
    #[must_use]
    pub fn get_disk_by_scsi(&self, scsi: crate::model::scsi::ScsiAddress) -> Option<&Disk> {
        self.disks.iter().find(|d| d.scsi_address == scsi)
    }

    /// Find a disk by its 32-bit MBR signature.
    #[must_use]
    pub fn get_disk_by_signature(&self, signature: u32) -> Option<&Disk> {
        self.disks.iter().find(|d| d.signature == signature)
    }

    /// Find the partitioned region with on-disk partition number
    /// `partition_number` on the disk numbered `disk_number`.
    #[must_use]
    pub fn get_partition(&self, disk_number: u32, partition_number: u32) -> Option<RegionRef> {
        let disk_index = self.disks.iter().position(|d| d.number == disk_number)?;
        let disk = &self.disks[disk_index];
        for (region_index, region) in disk.primary.iter().enumerate() {
            if region.on_disk_partition_number == Some(partition_number) {
                return Some(RegionRef {
                    disk_index,
                    is_logical: false,
                    region_index,
                });
            }
        }
        for (region_index, region) in disk.logical.iter().enumerate() {
            if region.on_disk_partition_number == Some(partition_number) {
                return Some(RegionRef {
                    disk_index,
                    is_logical: true,
                    region_index,
                });
            }
        }
        None
    }

    /// Resolve a disk number, and optionally a partition number on it,
    /// to a `(disk index, region ref)` pair.
    #[must_use]
    pub fn get_disk_or_partition(
        &self,
        disk_number: u32,
        partition_number: Option<u32>,
    ) -> Option<(usize, Option<RegionRef>)> {
        let disk_index = self.disks.iter().position(|d| d.number == disk_number)?;
        let region = match partition_number {
            Some(n) => Some(self.get_partition(disk_number, n)?),
            None => None,
        };
        Some((disk_index, region))
    }

    /// Select the region at `(disk_number, partition_number)` as the
    /// current system partition.
    #[must_use]
    pub fn select_partition(&mut self, disk_number: u32, partition_number: u32) -> bool {
        match self.get_partition(disk_number, partition_number) {
            Some(r) => {
                self.system_partition = Some(r);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::disk::{DiskStyle, FirmwareAnnotation, MediaType};
    use crate::model::region::Region;
    use partedit_types::DiskGeometry;

    fn sample_disk(number: u32) -> Disk {
        let mut disk = Disk {
            number,
            geometry: DiskGeometry::UNKNOWN,
            bytes_per_sector: 512,
            total_sectors: 1_000_000,
            sector_alignment: 63,
            cylinder_alignment: 63 * 255,
            scsi_address: crate::model::scsi::ScsiAddress::default(),
            media_type: MediaType::Fixed,
            firmware: FirmwareAnnotation::default(),
            style: DiskStyle::Mbr,
            signature: 0xdead_beef,
            driver_name: "Disk".into(),
            layout: Vec::new(),
            dirty: false,
            new_disk: false,
            is_super_floppy: false,
            primary: Vec::new(),
            logical: Vec::new(),
            extended_container: None,
        };
        let mut region = Region::free(0, 2048, 1000, false);
        region.is_partitioned = true;
        region.on_disk_partition_number = Some(1);
        disk.primary.push(region);
        disk
    }

    #[test]
    fn test_get_disk_by_number_and_signature() {
        let mut list = PartitionList::new();
        list.disks.push(sample_disk(0));
        assert!(list.get_disk_by_number(0).is_some());
        assert!(list.get_disk_by_number(1).is_none());
        assert!(list.get_disk_by_signature(0xdead_beef).is_some());
    }

    #[test]
    fn test_get_partition_and_select() {
        let mut list = PartitionList::new();
        list.disks.push(sample_disk(0));
        let r = list.get_partition(0, 1).unwrap();
        assert_eq!(r.disk_index, 0);
        assert!(list.select_partition(0, 1));
        assert_eq!(list.system_partition, Some(r));
        assert!(!list.select_partition(0, 99));
    }
}
