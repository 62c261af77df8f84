// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rebuilds on-disk MBR layouts from the region model and records
//! mount-point registry entries. Every mutator here is best-effort
//! across disks: one disk's failure is logged and left `dirty` for the
//! next retry rather than aborting the whole batch.

use crate::collab::{ConfigValue, ConfigStore, TimeSource};
use crate::error::PartitionError;
use crate::model::disk::{Disk, DiskStyle};
use crate::model::{PartitionList, Region};
use partedit_io::DeviceIo;
use partedit_types::{MbrPartitionEntry, MbrSector, PartitionType, U32Le};

const MOUNTED_DEVICES_KEY: &str = "SYSTEM\\MountedDevices";

/// Rebuild `disk`'s MBR sector from its layout buffer and push it to
/// `io`. A no-op if the disk isn't dirty. On success, copies the
/// on-disk partition number back into every partitioned region and
/// clears each region's `new` flag.
pub fn write_partitions<Io: DeviceIo>(disk: &mut Disk, io: &mut Io) -> Result<(), PartitionError> {
    if !disk.dirty {
        return Ok(());
    }

    let mut mbr = MbrSector::new(disk.signature);
    for (slot, entry) in disk.layout.iter().take(4).enumerate() {
        if entry.partition_type == PartitionType::UNUSED.0 {
            continue;
        }
        mbr.partitions[slot] = MbrPartitionEntry {
            boot_indicator: if entry.boot_indicator { 0x80 } else { 0x00 },
            start_chs: partedit_types::Chs::MAX,
            partition_type: entry.partition_type,
            end_chs: partedit_types::Chs::MAX,
            starting_lba: U32Le::from_u32(u32::try_from(entry.start_offset / u64::from(disk.bytes_per_sector)).unwrap_or(0)),
            size_in_lba: U32Le::from_u32(u32::try_from(entry.length / u64::from(disk.bytes_per_sector)).unwrap_or(0)),
        };
    }

    let sector_size = io.sector_size().to_usize().unwrap_or(512);
    let mut sector_buf = vec![0u8; sector_size];
    let mbr_bytes = mbr.as_bytes();
    sector_buf[..mbr_bytes.len()].copy_from_slice(&mbr_bytes);
    io.write_sectors(0, &sector_buf).map_err(PartitionError::transient)?;
    io.flush().map_err(PartitionError::transient)?;

    let mut partition_number = 1u32;
    for region in disk.primary.iter_mut().chain(disk.logical.iter_mut()) {
        if region.is_partitioned && !region.is_extended_container() {
            region.current_partition_number = Some(partition_number);
            partition_number += 1;
            region.new = false;
        }
    }
    disk.dirty = false;
    Ok(())
}

/// Write every dirty, non-GPT disk in `list`. Per-disk failures are
/// logged; the disk is left dirty so a later call retries just it.
pub fn write_partitions_to_disk<Io: DeviceIo>(list: &mut PartitionList, mut open_disk: impl FnMut(u32) -> Option<Io>) {
    for disk in &mut list.disks {
        if disk.style == DiskStyle::Gpt {
            continue;
        }
        if !disk.dirty {
            continue;
        }
        let Some(mut io) = open_disk(disk.number) else {
            log::error!("write_partitions_to_disk: could not open disk {}", disk.number);
            continue;
        };
        if let Err(err) = write_partitions(disk, &mut io) {
            log::error!("write_partitions_to_disk: disk {} failed: {err}", disk.number);
        }
    }
}

fn compose_signature(time: crate::collab::BrokenDownTime) -> u32 {
    let b0 = time.year.wrapping_add(u16::from(time.hour)) as u8;
    let b1 = (time.year >> 8).wrapping_add(u16::from(time.minute)) as u8;
    let b2 = time.month.wrapping_add(time.second);
    let b3 = time.day.wrapping_add(u8::try_from(time.millisecond % 256).unwrap_or(0));
    u32::from_le_bytes([b0, b1, b2, b3])
}

/// Assign a fresh, unique, non-zero signature to `disk` if it doesn't
/// already have one, regenerating on collision against `existing`.
fn set_disk_signature<T: TimeSource>(disk: &mut Disk, existing: &[u32], time_source: &T) {
    if disk.signature != 0 {
        return;
    }
    loop {
        let candidate = compose_signature(time_source.now());
        if candidate != 0 && !existing.contains(&candidate) {
            disk.signature = candidate;
            break;
        }
    }
    if disk.layout.is_empty() {
        disk.layout.push(crate::model::disk::LayoutEntry::default());
    }
    disk.layout[0].rewrite = true;
}

/// Batch-assign signatures to every zero-signature disk in `list`,
/// run once before any writeback.
pub fn update_disk_signatures<T: TimeSource>(list: &mut PartitionList, time_source: &T) {
    let mut used: Vec<u32> = list.disks.iter().map(|d| d.signature).filter(|&s| s != 0).collect();
    for disk in &mut list.disks {
        if disk.signature == 0 {
            set_disk_signature(disk, &used, time_source);
            used.push(disk.signature);
        }
    }
}

#[repr(C, packed)]
#[derive(Clone, Copy)]
struct MountedDeviceValue {
    signature: u32,
    starting_offset: i64,
}

/// Write `"\DosDevices\<letter>:"` under `SYSTEM\MountedDevices` for a
/// single drive letter.
pub fn set_mounted_device_value<C: ConfigStore>(store: &mut C, letter: char, signature: u32, starting_offset: i64) {
    let value = MountedDeviceValue { signature, starting_offset };
    let mut bytes = Vec::with_capacity(12);
    bytes.extend_from_slice(&value.signature.to_le_bytes());
    bytes.extend_from_slice(&value.starting_offset.to_le_bytes());
    store.write_value(MOUNTED_DEVICES_KEY, &format!("\\DosDevices\\{letter}:"), ConfigValue::Binary(bytes));
}

fn region_starting_offset(disk: &Disk, region: &Region) -> i64 {
    i64::try_from(region.start_sector * u64::from(disk.bytes_per_sector)).unwrap_or(i64::MAX)
}

/// Write a mount-point registry entry for every partitioned,
/// drive-lettered region across `list`.
pub fn set_mounted_device_values<C: ConfigStore>(list: &PartitionList, store: &mut C) {
    for disk in &list.disks {
        for region in disk.primary.iter().chain(disk.logical.iter()) {
            if !region.is_partitioned {
                continue;
            }
            if let Some(letter) = region.volume.drive_letter {
                set_mounted_device_value(store, letter, disk.signature, region_starting_offset(disk, region));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{BrokenDownTime, MapConfigStore, TimeSource};
    use crate::editor::{create_partition, update_disk_layout};
    use crate::model::disk::{FirmwareAnnotation, MediaType};
    use crate::model::list::RegionRef;
    use crate::model::scsi::ScsiAddress;
    use crate::model::Region;
    use partedit_io::MutSliceDeviceIo;
    use partedit_types::{DiskGeometry, SectorSize};

    struct FixedTime(BrokenDownTime);
    impl TimeSource for FixedTime {
        fn now(&self) -> BrokenDownTime {
            self.0
        }
    }

    fn blank_disk() -> Disk {
        let mut disk = Disk {
            number: 0,
            geometry: DiskGeometry::UNKNOWN,
            bytes_per_sector: 512,
            total_sectors: 20000,
            sector_alignment: 63,
            cylinder_alignment: 63 * 255,
            scsi_address: ScsiAddress::default(),
            media_type: MediaType::Fixed,
            firmware: FirmwareAnnotation::default(),
            style: DiskStyle::Mbr,
            signature: 0x1111_2222,
            driver_name: "Disk".into(),
            layout: Vec::new(),
            dirty: false,
            new_disk: false,
            is_super_floppy: false,
            primary: Vec::new(),
            logical: Vec::new(),
            extended_container: None,
        };
        disk.primary.push(Region::free(0, 2048, 10000, false));
        disk
    }

    #[test]
    fn test_write_partitions_roundtrips_to_device() {
        let mut list = PartitionList::new();
        list.disks.push(blank_disk());
        create_partition(&mut list, RegionRef { disk_index: 0, is_logical: false, region_index: 0 }, 0).unwrap();

        let mut bytes = vec![0u8; 512 * 20000];
        {
            let mut io = MutSliceDeviceIo::new(&mut bytes, SectorSize::B512);
            write_partitions(&mut list.disks[0], &mut io).unwrap();
        }
        assert!(!list.disks[0].dirty);
        assert_eq!(list.disks[0].primary[0].current_partition_number, Some(1));

        let mbr: MbrSector = *bytemuck::from_bytes(&bytes[..core::mem::size_of::<MbrSector>()]);
        assert!(mbr.has_valid_signature());
        assert_eq!(mbr.partitions[0].starting_lba.to_u32(), 2048);
    }

    #[test]
    fn test_write_partitions_skips_clean_disk() {
        let mut disk = blank_disk();
        disk.dirty = false;
        let mut bytes = vec![0u8; 512 * 20000];
        let mut io = MutSliceDeviceIo::new(&mut bytes, SectorSize::B512);
        write_partitions(&mut disk, &mut io).unwrap();
        assert_eq!(bytes[510], 0);
    }

    #[test]
    fn test_update_disk_signatures_assigns_unique_values() {
        let mut list = PartitionList::new();
        let mut a = blank_disk();
        a.signature = 0;
        let mut b = blank_disk();
        b.signature = 0;
        update_disk_layout(&mut a);
        update_disk_layout(&mut b);
        list.disks.push(a);
        list.disks.push(b);

        let time = FixedTime(BrokenDownTime {
            year: 2026,
            month: 8,
            day: 1,
            hour: 12,
            minute: 0,
            second: 0,
            millisecond: 0,
        });
        update_disk_signatures(&mut list, &time);
        assert_ne!(list.disks[0].signature, 0);
        assert_ne!(list.disks[1].signature, 0);
        assert_ne!(list.disks[0].signature, list.disks[1].signature);
        assert!(list.disks[0].layout[0].rewrite);
        assert!(list.disks[1].layout[0].rewrite);
    }

    #[test]
    fn test_set_mounted_device_values_writes_binary_entry() {
        let mut list = PartitionList::new();
        list.disks.push(blank_disk());
        create_partition(&mut list, RegionRef { disk_index: 0, is_logical: false, region_index: 0 }, 0).unwrap();
        crate::editor::assign_drive_letters(&mut list);

        let mut store = MapConfigStore::new();
        set_mounted_device_values(&list, &mut store);
        let value = store.read_value(MOUNTED_DEVICES_KEY, "\\DosDevices\\C:").unwrap();
        let bytes = value.as_binary().unwrap();
        assert_eq!(bytes.len(), 12);
    }
}
