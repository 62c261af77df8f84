// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reads a device's MBR, classifies its partitioning style, and builds
//! the initial region model: partitioned regions taken straight from
//! the table, plus synthesized free regions filling every gap.

use crate::collab::FilesystemInference;
use crate::model::disk::{Disk, DiskStyle, FirmwareAnnotation, MediaType};
use crate::model::region::Region;
use crate::model::scsi::ScsiAddress;
use crate::mounter::mount_volume;
use crate::FirmwareDisk;
use partedit_io::DeviceIo;
use partedit_types::{DiskGeometry, MbrSector, PartitionType};

/// Everything the scanner needs to know about a device up front that
/// isn't itself read from the MBR sector: geometry, SCSI address, and
/// alignment. A real caller gets these from `IOCTL_DISK_GET_DRIVE_GEOMETRY`
/// and `IOCTL_SCSI_GET_ADDRESS` equivalents; tests supply them directly.
#[derive(Clone, Copy, Debug)]
pub struct DiskQuery {
    /// System-assigned disk number.
    pub number: u32,
    /// Physical geometry.
    pub geometry: DiskGeometry,
    /// Fixed or removable.
    pub media_type: MediaType,
    /// SCSI path.
    pub scsi_address: ScsiAddress,
    /// Alignment every region boundary rounds to; typically
    /// `sectors_per_track`.
    pub sector_alignment: u64,
}

fn classify_style(mbr: &MbrSector) -> DiskStyle {
    if !mbr.has_valid_signature() {
        return DiskStyle::Raw;
    }
    let entries = &mbr.partitions;
    if entries[0].partition_type == PartitionType::GPT_PROTECTIVE.0
        && entries[1..].iter().all(|e| e.partition_type == 0)
    {
        return DiskStyle::Gpt;
    }
    DiskStyle::Mbr
}

fn detect_super_floppy(mbr: &MbrSector) -> bool {
    let used: Vec<_> = mbr.partitions.iter().filter(|e| e.is_used()).collect();
    if used.len() != 1 {
        return false;
    }
    let entry = used[0];
    if entry.starting_lba.to_u32() != 0 {
        return false;
    }
    // The source expects hidden sectors (here: the starting CHS sector
    // field) to also read zero; mismatches are a soft warning, not a
    // classification failure.
    if entry.start_chs.sector() != 0 {
        log::warn!("super-floppy candidate has non-zero starting CHS sector field");
    }
    true
}

/// Correlate a freshly-read `(signature, checksum)` pair against the
/// firmware map, returning the first unbound match.
fn correlate_firmware(
    firmware_disks: &[FirmwareDisk],
    bound: &[bool],
    signature: u32,
    checksum: u32,
) -> Option<usize> {
    firmware_disks
        .iter()
        .enumerate()
        .find(|(i, f)| !bound[*i] && f.signature == signature && f.checksum == checksum)
        .map(|(i, _)| i)
}

/// Scan one device: read its MBR, classify it, and build the region
/// model. `device_name_prefix` is used to build volume device names,
/// e.g. `"\Device\Harddisk0"`.
pub fn scan_disk<Io: DeviceIo, I: FilesystemInference>(
    query: DiskQuery,
    io: &mut Io,
    device_name_prefix: &str,
    firmware_disks: &[FirmwareDisk],
    firmware_bound: &mut [bool],
    inference: &mut I,
) -> Result<Disk, Io::Error> {
    let sector_size = io.sector_size().to_usize().unwrap_or(512);
    let mut sector_buf = vec![0u8; sector_size];
    io.read_sectors(0, &mut sector_buf)?;
    let mbr: MbrSector = *bytemuck::from_bytes(&sector_buf[..core::mem::size_of::<MbrSector>()]);

    let total_sectors = io.num_sectors()?;
    let checksum = mbr.checksum();
    let signature = mbr.unique_disk_signature.to_u32();
    let style = classify_style(&mbr);

    let mut firmware = FirmwareAnnotation::default();
    if let Some(i) = correlate_firmware(firmware_disks, firmware_bound, signature, checksum) {
        firmware_bound[i] = true;
        let f = &firmware_disks[i];
        firmware = FirmwareAnnotation {
            adapter: f.adapter,
            controller: f.controller,
            disk: f.disk,
            fixed_disk_index: 0,
            found: true,
        };
    }

    let mut disk = Disk {
        number: query.number,
        geometry: query.geometry,
        bytes_per_sector: u32::try_from(sector_size).unwrap_or(512),
        total_sectors,
        sector_alignment: query.sector_alignment.max(1),
        cylinder_alignment: query.sector_alignment.max(1) * u64::from(query.geometry.heads_per_cylinder),
        scsi_address: query.scsi_address,
        media_type: query.media_type,
        firmware,
        style,
        signature,
        driver_name: "Disk".to_string(),
        layout: Vec::new(),
        dirty: false,
        new_disk: !firmware.found,
        is_super_floppy: false,
        primary: Vec::new(),
        logical: Vec::new(),
        extended_container: None,
    };

    if style != DiskStyle::Mbr {
        return Ok(disk);
    }

    disk.is_super_floppy = detect_super_floppy(&mbr);

    let mut partition_number = 1u32;
    for (i, entry) in mbr.partitions.iter().enumerate() {
        if !entry.is_used() {
            continue;
        }
        let partition_type = PartitionType(entry.partition_type);
        let start = u64::from(entry.starting_lba.to_u32());
        let count = u64::from(entry.size_in_lba.to_u32());

        let mut region = Region {
            disk_index: 0,
            start_sector: start,
            sector_count: count,
            partition_type,
            boot_indicator: entry.is_active(),
            on_disk_partition_number: None,
            current_partition_number: None,
            layout_buffer_index: Some(i),
            is_logical: false,
            is_partitioned: true,
            new: false,
            auto_created: false,
            volume: crate::model::Volume::empty(),
        };

        if partition_type.is_extended() && disk.extended_container.is_none() {
            disk.extended_container = Some(disk.primary.len());
            disk.primary.push(region);
            continue;
        }

        region.on_disk_partition_number = Some(partition_number);
        region.volume.device_name = format!("{device_name_prefix}\\Partition{partition_number}");
        mount_volume(&mut region.volume, Some(partition_type), inference);
        partition_number += 1;
        disk.primary.push(region);
    }

    scan_for_unpartitioned_space(&mut disk);

    Ok(disk)
}

/// Walk a disk's primary (and, if it has an extended container,
/// logical) list and insert free regions into every gap, including the
/// leading gap before the first region and the trailing gap after the
/// last.
pub fn scan_for_unpartitioned_space(disk: &mut Disk) {
    disk.primary.sort_by_key(|r| r.start_sector);
    let leading_primary_gap_start = disk.leading_primary_gap_start();
    fill_gaps(
        &mut disk.primary,
        leading_primary_gap_start,
        disk.total_sectors,
        disk.sector_alignment,
        false,
    );

    if let Some(container_index) = disk.extended_container {
        let container = &disk.primary[container_index];
        let logical_start = container.start_sector + disk.sector_alignment;
        let logical_end = container.end_sector();
        disk.logical.sort_by_key(|r| r.start_sector);
        fill_gaps(&mut disk.logical, logical_start, logical_end, disk.sector_alignment, true);
    }
}

fn fill_gaps(list: &mut Vec<Region>, span_start: u64, span_end: u64, alignment: u64, is_logical: bool) {
    let mut gaps = Vec::new();
    let mut cursor = span_start;
    for region in list.iter() {
        if region.start_sector > cursor {
            gaps.push((cursor, region.start_sector));
        }
        cursor = cursor.max(region.end_sector());
    }
    if span_end > cursor {
        gaps.push((cursor, span_end));
    }

    for (start, end) in gaps {
        if end <= start {
            continue;
        }
        let len = end - start;
        if len < alignment {
            continue;
        }
        list.push(Region::free(0, start, len, is_logical));
    }
    list.sort_by_key(|r| r.start_sector);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::FS_RAW;
    use partedit_io::SliceDeviceIo;

    struct NoOpInference;
    impl FilesystemInference for NoOpInference {
        type Error = std::convert::Infallible;
        fn infer_filesystem(&mut self, _device_name: &str) -> Result<String, Self::Error> {
            Ok(FS_RAW.to_string())
        }
        fn read_label(&mut self, _device_name: &str) -> Option<String> {
            None
        }
    }

    fn query() -> DiskQuery {
        DiskQuery {
            number: 0,
            geometry: DiskGeometry::UNKNOWN,
            media_type: MediaType::Fixed,
            scsi_address: ScsiAddress::default(),
            sector_alignment: 63,
        }
    }

    #[test]
    fn test_scan_raw_disk_has_no_regions() {
        let bytes = vec![0u8; 512 * 2048];
        let mut io = SliceDeviceIo::new(&bytes, partedit_types::SectorSize::B512);
        let mut bound = Vec::new();
        let mut inference = NoOpInference;
        let disk = scan_disk(query(), &mut io, "\\Device\\Harddisk0", &[], &mut bound, &mut inference).unwrap();
        assert_eq!(disk.style, DiskStyle::Raw);
        assert!(disk.primary.is_empty());
    }

    #[test]
    fn test_scan_mbr_disk_fills_leading_and_trailing_gaps() {
        let mut bytes = vec![0u8; 512 * 20000];
        {
            let mut mbr = MbrSector::new(0x1234_5678);
            mbr.partitions[0].partition_type = PartitionType::FAT32_LBA.0;
            mbr.partitions[0].starting_lba = partedit_types::U32Le::from_u32(2048);
            mbr.partitions[0].size_in_lba = partedit_types::U32Le::from_u32(10000);
            bytes[..512].copy_from_slice(&mbr.as_bytes());
        }
        let mut io = SliceDeviceIo::new(&bytes, partedit_types::SectorSize::B512);
        let mut bound = Vec::new();
        let mut inference = NoOpInference;
        let disk = scan_disk(query(), &mut io, "\\Device\\Harddisk0", &[], &mut bound, &mut inference).unwrap();
        assert_eq!(disk.style, DiskStyle::Mbr);
        assert_eq!(disk.primary.len(), 2);
        assert!(disk.primary[0].is_partitioned);
        assert_eq!(disk.primary[0].start_sector, 2048);
        assert!(!disk.primary[1].is_partitioned);
        assert_eq!(disk.primary[1].start_sector, 12048);
    }

    #[test]
    fn test_super_floppy_detection() {
        let mut mbr = MbrSector::new(1);
        mbr.partitions[0].partition_type = PartitionType::FAT16_SMALL.0;
        mbr.partitions[0].starting_lba = partedit_types::U32Le::from_u32(0);
        mbr.partitions[0].size_in_lba = partedit_types::U32Le::from_u32(2880);
        assert!(detect_super_floppy(&mbr));
    }

    #[test]
    fn test_non_super_floppy_with_two_entries() {
        let mut mbr = MbrSector::new(1);
        mbr.partitions[0].partition_type = PartitionType::FAT16_SMALL.0;
        mbr.partitions[0].starting_lba = partedit_types::U32Le::from_u32(0);
        mbr.partitions[0].size_in_lba = partedit_types::U32Le::from_u32(2880);
        mbr.partitions[1].partition_type = PartitionType::FAT16_SMALL.0;
        mbr.partitions[1].starting_lba = partedit_types::U32Le::from_u32(2880);
        mbr.partitions[1].size_in_lba = partedit_types::U32Le::from_u32(2880);
        assert!(!detect_super_floppy(&mbr));
    }
}
