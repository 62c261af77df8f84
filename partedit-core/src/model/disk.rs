// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::error::PartitionError;
use crate::model::region::Region;
use crate::model::scsi::ScsiAddress;
use partedit_types::DiskGeometry;

/// Classification of a disk's partitioning scheme, determined once by
/// the scanner from the boot sector.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum DiskStyle {
    /// No valid MBR signature found.
    Raw,
    /// A valid MBR partition table.
    Mbr,
    /// A protective MBR covering a GUID Partition Table; mutation
    /// always fails with [`PartitionError::WarnPartition`].
    Gpt,
    /// Never scanned, or explicitly reset; the zero value.
    #[default]
    Uninitialized,
}

/// Whether a disk is removable media or a fixed drive.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum MediaType {
    /// Hard disk, SSD, or similar.
    #[default]
    Fixed,
    /// Floppy, USB flash drive, or similar.
    Removable,
}

/// The firmware's view of where this disk sits in the boot order, if
/// any `FirmwareDisk` entry was correlated to it by (signature,
/// checksum).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct FirmwareAnnotation {
    /// Adapter index as reported by the firmware map. Always 0 — see
    /// `firmware::enumerate_firmware_disks`.
    pub adapter: u32,
    /// Controller index under the adapter.
    pub controller: u32,
    /// Disk index under the controller.
    pub disk: u32,
    /// Index among fixed disks only, after removable media is
    /// compressed out of the enumeration.
    pub fixed_disk_index: u32,
    /// Whether a firmware entry was actually found for this disk.
    pub found: bool,
}

/// One block device and everything the engine has recorded about it.
#[derive(Clone, Debug)]
pub struct Disk {
    /// System-assigned disk number, e.g. the `<n>` in
    /// `\Device\Harddisk<n>\Partition0`.
    pub number: u32,

    /// Physical geometry used for CHS stamping.
    pub geometry: DiskGeometry,

    /// Bytes per sector.
    pub bytes_per_sector: u32,

    /// Total sector count of the device.
    pub total_sectors: u64,

    /// Boundary, in sectors, that every region start/end is rounded to.
    pub sector_alignment: u64,

    /// Boundary, in sectors, of one cylinder (`heads_per_cylinder *
    /// sectors_per_track`). Used only for CHS stamping, not for region
    /// placement.
    pub cylinder_alignment: u64,

    /// SCSI path to the device.
    pub scsi_address: ScsiAddress,

    /// Fixed or removable.
    pub media_type: MediaType,

    /// Firmware boot-order correlation, if any.
    pub firmware: FirmwareAnnotation,

    /// `Raw`, `Mbr`, `Gpt`, or not yet scanned.
    pub style: DiskStyle,

    /// 32-bit disk signature at MBR offset 0x1B8. Zero means "not yet
    /// assigned" and triggers `writer::set_disk_signature`.
    pub signature: u32,

    /// Driver-reported device name, e.g. `"Disk"`.
    pub driver_name: String,

    /// Kernel-facing layout buffer mirrored from (and, on writeback,
    /// pushed to) the on-disk partition table. One [`LayoutEntry`] per
    /// slot, primaries in the first four, logicals afterward in
    /// strides of four.
    pub layout: Vec<LayoutEntry>,

    /// True if the region model has changed since the layout buffer
    /// was last rebuilt and written.
    pub dirty: bool,

    /// True if the scanner could not correlate any prior state for
    /// this disk — used by `find_supported_system_partition`'s
    /// fallback path.
    pub new_disk: bool,

    /// True if the boot sector had exactly one entry starting at
    /// offset 0 with zero hidden sectors — a super-floppy layout may
    /// only ever hold its one partition.
    pub is_super_floppy: bool,

    /// Primary region list: partitions plus free gaps, sorted by
    /// `start_sector`, covering the whole usable disk span.
    pub primary: Vec<Region>,

    /// Logical region list: partitions plus free gaps inside the
    /// extended container, sorted by `start_sector`.
    pub logical: Vec<Region>,

    /// Index into `primary` of the extended container region, if one
    /// exists.
    pub extended_container: Option<usize>,
}

/// One slot of a disk's kernel-facing layout buffer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LayoutEntry {
    /// Byte offset of the partition from the start of the disk.
    pub start_offset: u64,
    /// Length of the partition in bytes.
    pub length: u64,
    /// Hidden sector count (CHS-era field retained for compatibility).
    pub hidden_sectors: u32,
    /// MBR partition type byte.
    pub partition_type: u8,
    /// Whether the boot (active) indicator is set.
    pub boot_indicator: bool,
    /// Whether the partition type is one this engine recognizes.
    pub recognized: bool,
    /// Whether this slot needs to be rewritten to disk on the next
    /// `write_partitions` call.
    pub rewrite: bool,
}

impl Disk {
    /// First sector available for primary allocation: `max(2048,
    /// sector_alignment)`.
    #[must_use]
    pub fn leading_primary_gap_start(&self) -> u64 {
        core::cmp::max(2048, self.sector_alignment)
    }

    /// Insert `region` into the primary or logical list (per
    /// `region.is_logical`) at its sorted position, rejecting any
    /// overlap with an existing region.
    ///
    /// # Errors
    ///
    /// Returns [`PartitionError::TransientIo`] is never produced here;
    /// an invariant violation (overlap) is reported as
    /// [`PartitionError::NewPartition`] since it can only arise from
    /// inserting into space the caller believed was free.
    pub fn insert_region(&mut self, region: Region) -> Result<usize, PartitionError> {
        let list = if region.is_logical {
            &mut self.logical
        } else {
            &mut self.primary
        };
        if list.iter().any(|existing| existing.overlaps(&region)) {
            return Err(PartitionError::NewPartition);
        }
        let pos = list
            .iter()
            .position(|existing| existing.start_sector > region.start_sector)
            .unwrap_or(list.len());
        list.insert(pos, region);
        Ok(pos)
    }

    /// Number of partitioned (non-free) entries in the primary list.
    #[must_use]
    pub fn primary_partitioned_count(&self) -> usize {
        self.primary.iter().filter(|r| r.is_partitioned).count()
    }

    /// Number of regions in the logical list, used to size the layout
    /// buffer.
    #[must_use]
    pub fn logical_count(&self) -> usize {
        self.logical.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_disk() -> Disk {
        Disk {
            number: 0,
            geometry: DiskGeometry::UNKNOWN,
            bytes_per_sector: 512,
            total_sectors: 20_000_000,
            sector_alignment: 63,
            cylinder_alignment: 63 * 255,
            scsi_address: ScsiAddress::default(),
            media_type: MediaType::Fixed,
            firmware: FirmwareAnnotation::default(),
            style: DiskStyle::Mbr,
            signature: 0,
            driver_name: "Disk".into(),
            layout: Vec::new(),
            dirty: false,
            new_disk: true,
            is_super_floppy: false,
            primary: Vec::new(),
            logical: Vec::new(),
            extended_container: None,
        }
    }

    #[test]
    fn test_insert_non_overlapping_regions_sorts() {
        let mut disk = blank_disk();
        disk.insert_region(Region::free(0, 1000, 500, false)).unwrap();
        disk.insert_region(Region::free(0, 0, 500, false)).unwrap();
        assert_eq!(disk.primary[0].start_sector, 0);
        assert_eq!(disk.primary[1].start_sector, 1000);
    }

    #[test]
    fn test_insert_overlapping_region_rejected() {
        let mut disk = blank_disk();
        disk.insert_region(Region::free(0, 0, 500, false)).unwrap();
        let err = disk.insert_region(Region::free(0, 499, 10, false)).unwrap_err();
        assert!(matches!(err, PartitionError::NewPartition));
    }

    #[test]
    fn test_leading_primary_gap_start_respects_alignment() {
        let mut disk = blank_disk();
        disk.sector_alignment = 4096;
        assert_eq!(disk.leading_primary_gap_start(), 4096);
        disk.sector_alignment = 63;
        assert_eq!(disk.leading_primary_gap_start(), 2048);
    }
}
