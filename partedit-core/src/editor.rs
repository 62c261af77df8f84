// SPDX-License-Identifier: MIT OR Apache-2.0

//! Creation, extension, and deletion of partitions; drive-letter
//! assignment; active/system-partition selection. Every mutator here
//! leaves the region model in an invariant-respecting state or returns
//! an error without touching it.

use crate::collab::WRITABLE_FILESYSTEMS;
use crate::error::PartitionError;
use crate::geometry::{align_down, extended_container_type};
use crate::model::disk::{Disk, DiskStyle, LayoutEntry};
use crate::model::list::RegionRef;
use crate::model::region::Region;
use crate::model::{PartitionList, Volume};
use crate::mounter::dismount_volume;
use partedit_types::PartitionType;

fn fat_type_for_size(size_bytes: u64) -> PartitionType {
    const MB: u64 = 1024 * 1024;
    if size_bytes < 32 * MB {
        PartitionType::FAT16_SMALL
    } else if size_bytes < 2048 * MB {
        PartitionType::FAT16B_LBA
    } else {
        PartitionType::FAT32_LBA
    }
}

/// Run the checks `create_partition` requires before mutating
/// anything: GPT refusal, already-partitioned rejection, and
/// primary-table-full / super-floppy rejection.
pub fn partition_creation_checks(disk: &Disk, region: &Region) -> Result<(), PartitionError> {
    if disk.style == DiskStyle::Gpt {
        return Err(PartitionError::WarnPartition);
    }
    if region.is_partitioned {
        return Err(PartitionError::NewPartition);
    }
    if !region.is_logical {
        if disk.is_super_floppy && disk.primary_partitioned_count() >= 1 {
            return Err(PartitionError::PartitionTableFull);
        }
        if disk.primary_partitioned_count() >= 4 {
            return Err(PartitionError::PartitionTableFull);
        }
    }
    Ok(())
}

/// As [`partition_creation_checks`], plus the extended-container
/// specific rule that a disk may only ever have one.
pub fn extended_partition_creation_checks(disk: &Disk, region: &Region) -> Result<(), PartitionError> {
    partition_creation_checks(disk, region)?;
    if disk.extended_container.is_some() {
        return Err(PartitionError::OnlyOneExtended);
    }
    Ok(())
}

/// Stamp a free `region` as used, splitting off a trailing free region
/// if the requested size doesn't consume the whole thing. Returns the
/// region reference for the (possibly shrunk) newly-partitioned region
/// and, if one was carved off, the trailing free region's reference.
fn carve_region(
    disk: &mut Disk,
    region_index: usize,
    is_logical: bool,
    size_bytes: u64,
) -> Result<(usize, Option<usize>), PartitionError> {
    let bytes_per_sector = disk.bytes_per_sector;
    let sector_alignment = disk.sector_alignment;

    let (disk_index, start_sector, sector_count) = {
        let list = if is_logical { &disk.logical } else { &disk.primary };
        let region = &list[region_index];
        (region.disk_index, region.start_sector, region.sector_count)
    };

    let region_bytes = sector_count * u64::from(bytes_per_sector);
    let requested = if size_bytes == 0 || size_bytes == region_bytes {
        sector_count
    } else {
        let sectors = size_bytes / u64::from(bytes_per_sector);
        if sectors == 0 {
            return Err(PartitionError::NewPartition);
        }
        sectors.min(sector_count)
    };

    let natural_end = start_sector + sector_count;
    let new_end = align_down(start_sector + requested, sector_alignment).max(start_sector);

    let list = if is_logical {
        &mut disk.logical
    } else {
        &mut disk.primary
    };

    if new_end >= natural_end {
        return Ok((region_index, None));
    }

    let trailing = Region::free(disk_index, new_end, natural_end - new_end, is_logical);
    list[region_index].sector_count = new_end - start_sector;
    list.insert(region_index + 1, trailing);
    Ok((region_index, Some(region_index + 1)))
}

fn stamp_partition(region: &mut Region, partition_type: PartitionType) {
    region.is_partitioned = true;
    region.new = true;
    region.boot_indicator = false;
    region.partition_type = partition_type;
    region.volume = Volume {
        new: true,
        ..Volume::empty()
    };
}

/// Create an ordinary (non-extended) partition out of free `region`,
/// sized to `size_bytes` bytes (0 or the region's full byte size means
/// "use it all").
pub fn create_partition(
    list: &mut PartitionList,
    region_ref: RegionRef,
    size_bytes: u64,
) -> Result<(), PartitionError> {
    let disk = list.disks.get(region_ref.disk_index).ok_or(PartitionError::NotFound)?;
    let region = list.region(region_ref).ok_or(PartitionError::NotFound)?;
    partition_creation_checks(disk, region)?;

    let disk = &mut list.disks[region_ref.disk_index];
    let (region_index, _trailing) = carve_region(disk, region_ref.region_index, region_ref.is_logical, size_bytes)?;

    let list_ref = if region_ref.is_logical {
        &mut disk.logical
    } else {
        &mut disk.primary
    };
    let size = list_ref[region_index].sector_count * u64::from(disk.bytes_per_sector);
    stamp_partition(&mut list_ref[region_index], fat_type_for_size(size));

    update_disk_layout(disk);
    assign_drive_letters(list);
    Ok(())
}

/// Create the disk's extended container out of free `region`, sized to
/// `size_bytes` bytes, and seed its logical list with a single free
/// region spanning the container minus the leading alignment gap.
pub fn create_extended_partition(
    list: &mut PartitionList,
    region_ref: RegionRef,
    size_bytes: u64,
) -> Result<(), PartitionError> {
    if region_ref.is_logical {
        return Err(PartitionError::NewPartition);
    }
    let disk = list.disks.get(region_ref.disk_index).ok_or(PartitionError::NotFound)?;
    let region = list.region(region_ref).ok_or(PartitionError::NotFound)?;
    extended_partition_creation_checks(disk, region)?;

    let disk = &mut list.disks[region_ref.disk_index];
    let (region_index, _trailing) = carve_region(disk, region_ref.region_index, false, size_bytes)?;

    let (start, end, container_type) = {
        let region = &disk.primary[region_index];
        (region.start_sector, region.end_sector(), extended_container_type(region.start_sector))
    };
    stamp_partition(&mut disk.primary[region_index], container_type);
    disk.extended_container = Some(region_index);

    let logical_start = start + disk.sector_alignment;
    if logical_start < end {
        disk.logical.push(Region::free(region_ref.disk_index, logical_start, end - logical_start, true));
    }

    update_disk_layout(disk);
    assign_drive_letters(list);
    Ok(())
}

/// Delete the partition at `region_ref`: dismounts its volume (or, for
/// the extended container, every logical volume beneath it), merges
/// the freed space with any adjacent free regions, and clears the
/// system-partition reference if it pointed here.
pub fn delete_partition(list: &mut PartitionList, region_ref: RegionRef) -> Result<(), PartitionError> {
    let region = list.region(region_ref).ok_or(PartitionError::NotFound)?;
    if !region.is_partitioned {
        return Err(PartitionError::NewPartition);
    }
    let is_container = region.is_extended_container();

    if list.system_partition == Some(region_ref) {
        list.system_partition = None;
    }

    let disk_index = region_ref.disk_index;

    if is_container {
        let disk = &mut list.disks[disk_index];
        for logical in &mut disk.logical {
            dismount_volume(&mut logical.volume);
        }
        disk.logical.clear();
        disk.extended_container = None;
        disk.primary[region_ref.region_index].clear_to_free();
        merge_free_neighbors(&mut disk.primary, region_ref.region_index);
    } else {
        let disk = &mut list.disks[disk_index];
        let list_ref = if region_ref.is_logical {
            &mut disk.logical
        } else {
            &mut disk.primary
        };
        dismount_volume(&mut list_ref[region_ref.region_index].volume);
        list_ref[region_ref.region_index].clear_to_free();
        merge_free_neighbors(list_ref, region_ref.region_index);
    }

    update_disk_layout(&mut list.disks[disk_index]);
    assign_drive_letters(list);
    Ok(())
}

fn is_free(region: &Region) -> bool {
    !region.is_partitioned
}

/// Merge the region at `index` (already converted to free) with an
/// adjacent free predecessor and/or successor, per the four-case table
/// in the editor design.
fn merge_free_neighbors(list: &mut Vec<Region>, index: usize) {
    let prev_free = index > 0 && is_free(&list[index - 1]);
    let next_free = index + 1 < list.len() && is_free(&list[index + 1]);

    match (prev_free, next_free) {
        (true, true) => {
            let this_len = list[index].sector_count;
            let next_len = list[index + 1].sector_count;
            list[index - 1].grow_end(this_len + next_len);
            list.remove(index + 1);
            list.remove(index);
        }
        (true, false) => {
            let this_len = list[index].sector_count;
            list[index - 1].grow_end(this_len);
            list.remove(index);
        }
        (false, true) => {
            let this_start = list[index].start_sector;
            let this_len = list[index].sector_count;
            list[index + 1].start_sector = this_start;
            list[index + 1].grow_end(this_len);
            list.remove(index);
        }
        (false, false) => {
            // Already cleared to free by the caller; nothing further
            // to merge.
        }
    }
}

fn region_is_assignable(region: &Region) -> bool {
    region.is_partitioned && !region.is_extended_container()
}

/// Deterministic single pass assigning drive letters starting at
/// `'C'`: every disk's primaries in order, then every disk's logicals
/// in order. Letters that would fall past `'Z'` are left unassigned.
pub fn assign_drive_letters(list: &mut PartitionList) {
    let mut next_letter = b'C';
    let mut assign = |volume: &mut Volume| {
        if next_letter <= b'Z' {
            volume.drive_letter = Some(next_letter as char);
            next_letter += 1;
        } else {
            volume.drive_letter = None;
        }
    };

    for disk in &mut list.disks {
        for region in &mut disk.primary {
            if region_is_assignable(region) {
                assign(&mut region.volume);
            }
        }
    }
    for disk in &mut list.disks {
        for region in &mut disk.logical {
            if region_is_assignable(region) {
                assign(&mut region.volume);
            }
        }
    }
}

/// Rebuild `disk`'s layout buffer from its current region model.
pub fn update_disk_layout(disk: &mut Disk) {
    let slot_count = 4 + 4 * disk.logical_count();
    disk.layout = vec![LayoutEntry::default(); slot_count];

    let mut partition_number = 1u32;
    let mut primary_slot = 0usize;
    for region in &mut disk.primary {
        if !region.is_partitioned {
            continue;
        }
        let bytes_per_sector = u64::from(disk.bytes_per_sector);
        disk.layout[primary_slot] = LayoutEntry {
            start_offset: region.start_sector * bytes_per_sector,
            length: region.sector_count * bytes_per_sector,
            hidden_sectors: u32::try_from(region.start_sector).unwrap_or(u32::MAX),
            partition_type: region.partition_type.0,
            boot_indicator: region.boot_indicator,
            recognized: !region.partition_type.is_unused() && !region.partition_type.is_extended(),
            rewrite: true,
        };
        region.layout_buffer_index = Some(primary_slot);
        if !region.is_extended_container() {
            region.on_disk_partition_number = Some(partition_number);
            partition_number += 1;
        }
        primary_slot += 1;
    }

    let bytes_per_sector = u64::from(disk.bytes_per_sector);
    for (i, region) in disk.logical.iter_mut().enumerate() {
        let slot = 4 + 4 * i;
        disk.layout[slot] = LayoutEntry {
            start_offset: region.start_sector * bytes_per_sector,
            length: region.sector_count * bytes_per_sector,
            hidden_sectors: u32::try_from(disk.sector_alignment).unwrap_or(u32::MAX),
            partition_type: region.partition_type.0,
            boot_indicator: region.boot_indicator,
            recognized: region.is_partitioned && !region.partition_type.is_unused(),
            rewrite: true,
        };
        region.layout_buffer_index = Some(slot);
        if region.is_partitioned {
            region.on_disk_partition_number = Some(partition_number);
            partition_number += 1;
        }

        if i > 0 {
            let link_start = (region.start_sector - disk.sector_alignment) * bytes_per_sector;
            let link_length = (region.start_sector + disk.sector_alignment) * bytes_per_sector;
            disk.layout[slot - 3] = LayoutEntry {
                start_offset: link_start,
                length: link_length,
                hidden_sectors: 0,
                partition_type: extended_container_type(region.start_sector).0,
                boot_indicator: false,
                recognized: false,
                rewrite: true,
            };
        }
    }

    disk.dirty = true;
}

/// Set `region` as the disk's active (boot) partition, clearing the
/// indicator on whatever was previously active. Returns `false` if the
/// list has no disks.
pub fn set_active_partition(list: &mut PartitionList, region_ref: RegionRef) -> bool {
    if list.disks.is_empty() {
        return false;
    }
    let Some(disk) = list.disks.get_mut(region_ref.disk_index) else {
        return false;
    };

    for region in disk.primary.iter_mut().chain(disk.logical.iter_mut()) {
        if region.boot_indicator {
            region.boot_indicator = false;
        }
    }

    let list_ref = if region_ref.is_logical {
        &mut disk.logical
    } else {
        &mut disk.primary
    };
    let Some(region) = list_ref.get_mut(region_ref.region_index) else {
        return false;
    };
    region.boot_indicator = true;
    update_disk_layout(disk);

    if list.system_partition.map(|r| r.disk_index) == Some(region_ref.disk_index) {
        list.system_partition = Some(region_ref);
    }
    true
}

fn region_is_supported(region: &Region) -> bool {
    if region.is_extended_container() {
        return false;
    }
    if region.partition_type == PartitionType::IFS {
        return false;
    }
    match region.volume.format_state {
        crate::collab::FormatState::Unformatted => true,
        crate::collab::FormatState::Formatted => WRITABLE_FILESYSTEMS.contains(&region.volume.filesystem.as_str()),
        _ => false,
    }
}

/// Three-stage search for a bootable, writable system partition: the
/// current selection if still supported, then the system disk's
/// primaries, then an alternative disk's best candidate.
#[must_use]
pub fn find_supported_system_partition(
    list: &PartitionList,
    force_select: bool,
    alt_disk_index: Option<usize>,
    alt_part: Option<RegionRef>,
) -> Option<RegionRef> {
    if let Some(current) = list.system_partition {
        if let Some(region) = list.region(current) {
            if region_is_supported(region) {
                return Some(current);
            }
        }
    }

    if let Some(system_disk_index) = list.disks.iter().position(|d| d.firmware.found) {
        let disk = &list.disks[system_disk_index];
        for (i, region) in disk.primary.iter().enumerate() {
            if region.is_partitioned && region_is_supported(region) {
                return Some(RegionRef {
                    disk_index: system_disk_index,
                    is_logical: false,
                    region_index: i,
                });
            }
        }
        if disk.primary_partitioned_count() < 4 {
            if let Some(i) = disk.primary.iter().position(|r| !r.is_partitioned) {
                return Some(RegionRef {
                    disk_index: system_disk_index,
                    is_logical: false,
                    region_index: i,
                });
            }
        }
    }

    let Some(alt_disk_index) = alt_disk_index else {
        return alt_part;
    };
    let Some(disk) = list.disks.get(alt_disk_index) else {
        return alt_part;
    };
    if !force_select && list.disks.iter().any(|d| d.firmware.found && core::ptr::eq(d, disk)) {
        return alt_part;
    }

    if let Some((i, region)) = disk.primary.iter().enumerate().find(|(_, r)| r.boot_indicator) {
        if region_is_supported(region) {
            return Some(RegionRef {
                disk_index: alt_disk_index,
                is_logical: false,
                region_index: i,
            });
        }
    }

    if disk.new_disk {
        if let Some(first) = disk.primary.first() {
            if !first.is_partitioned || !first.boot_indicator {
                return Some(RegionRef {
                    disk_index: alt_disk_index,
                    is_logical: false,
                    region_index: 0,
                });
            }
        }
    }

    if let Some((i, _)) = disk
        .primary
        .iter()
        .enumerate()
        .find(|(_, r)| r.is_partitioned || r.boot_indicator)
    {
        return Some(RegionRef {
            disk_index: alt_disk_index,
            is_logical: false,
            region_index: i,
        });
    }

    if !disk.primary.is_empty() {
        return Some(RegionRef {
            disk_index: alt_disk_index,
            is_logical: false,
            region_index: 0,
        });
    }

    alt_part
}
