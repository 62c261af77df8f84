// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::model::disk::Disk;
use crate::model::list::PartitionList;
use bitflags::bitflags;

bitflags! {
    /// Direction and filtering flags for [`adjacent_region`] and
    /// [`adjacent_partition`].
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    pub struct TraverseFlags: u32 {
        /// Move to the next region/partition in sequence.
        const NEXT = 0b0000_0001;
        /// Move to the previous region/partition in sequence.
        const PREV = 0b0000_0010;
        /// Skip free regions.
        const PARTITIONED_ONLY = 0b0000_0100;
        /// Visit only the primary list.
        const MBR_PRIMARY_ONLY = 0b0000_1000;
        /// Visit only the logical list.
        const MBR_LOGICAL_ONLY = 0b0001_0000;
        /// Interleave primaries and logicals in disk-appearance order:
        /// the extended container is replaced in sequence by its
        /// logical regions.
        const MBR_BY_ORDER = 0b0010_0000;
    }
}

/// A cursor identifying one region on one disk's primary or logical
/// list, used as the `current` argument to [`adjacent_region`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RegionCursor {
    /// True if `index` refers to the logical list, false for primary.
    pub is_logical: bool,
    /// Index within that list.
    pub index: usize,
}

fn by_order_sequence(disk: &Disk) -> Vec<RegionCursor> {
    let mut out = Vec::with_capacity(disk.primary.len() + disk.logical.len());
    for (i, region) in disk.primary.iter().enumerate() {
        if region.is_extended_container() {
            for j in 0..disk.logical.len() {
                out.push(RegionCursor {
                    is_logical: true,
                    index: j,
                });
            }
        } else {
            out.push(RegionCursor {
                is_logical: false,
                index: i,
            });
        }
    }
    out
}

fn region_at(disk: &Disk, cursor: RegionCursor) -> Option<&crate::model::region::Region> {
    if cursor.is_logical {
        disk.logical.get(cursor.index)
    } else {
        disk.primary.get(cursor.index)
    }
}

fn passes_filter(disk: &Disk, cursor: RegionCursor, flags: TraverseFlags) -> bool {
    let Some(region) = region_at(disk, cursor) else {
        return false;
    };
    if flags.contains(TraverseFlags::PARTITIONED_ONLY) && !region.is_partitioned {
        return false;
    }
    true
}

/// Find the next or previous region on `disk` relative to `current`,
/// honoring the direction and filter flags.
///
/// `disk` of `None` or an empty sequence yields `None`. When `current`
/// is `None`, the walk starts from the first (for `NEXT`) or last (for
/// `PREV`) region in the selected sequence.
#[must_use]
pub fn adjacent_region(
    disk: Option<&Disk>,
    current: Option<RegionCursor>,
    flags: TraverseFlags,
) -> Option<RegionCursor> {
    let disk = disk?;

    let sequence: Vec<RegionCursor> = if flags.contains(TraverseFlags::MBR_BY_ORDER) {
        by_order_sequence(disk)
    } else if flags.contains(TraverseFlags::MBR_PRIMARY_ONLY) {
        (0..disk.primary.len())
            .map(|index| RegionCursor {
                is_logical: false,
                index,
            })
            .collect()
    } else if flags.contains(TraverseFlags::MBR_LOGICAL_ONLY) {
        (0..disk.logical.len())
            .map(|index| RegionCursor {
                is_logical: true,
                index,
            })
            .collect()
    } else {
        (0..disk.primary.len())
            .map(|index| RegionCursor {
                is_logical: false,
                index,
            })
            .chain((0..disk.logical.len()).map(|index| RegionCursor {
                is_logical: true,
                index,
            }))
            .collect()
    };

    if sequence.is_empty() {
        return None;
    }

    let reverse = flags.contains(TraverseFlags::PREV) && !flags.contains(TraverseFlags::NEXT);

    let start_pos = match current {
        Some(cur) => sequence.iter().position(|c| *c == cur),
        None => None,
    };

    let ordered: Vec<RegionCursor> = if reverse {
        sequence.iter().rev().copied().collect()
    } else {
        sequence.clone()
    };

    let start_in_ordered = start_pos.map(|p| {
        if reverse {
            ordered.len() - 1 - p
        } else {
            p
        }
    });

    let candidates = match start_in_ordered {
        Some(p) => &ordered[p + 1..],
        None => &ordered[..],
    };

    candidates
        .iter()
        .copied()
        .find(|&c| passes_filter(disk, c, flags))
}

/// A cursor identifying one region on one disk within a
/// [`PartitionList`], used as the `current` argument to
/// [`adjacent_partition`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PartitionCursor {
    /// Index of the disk within the list.
    pub disk_index: usize,
    /// Cursor into that disk's region lists.
    pub region: RegionCursor,
}

/// Extend [`adjacent_region`] across every disk in `list`: when a
/// disk's sequence is exhausted, continue on the next (or previous)
/// disk. Returns `None` immediately if both `current` and no starting
/// disk can be inferred, or the list is empty.
#[must_use]
pub fn adjacent_partition(
    list: &PartitionList,
    current: Option<PartitionCursor>,
    flags: TraverseFlags,
) -> Option<PartitionCursor> {
    if list.disks.is_empty() {
        return None;
    }

    let reverse = flags.contains(TraverseFlags::PREV) && !flags.contains(TraverseFlags::NEXT);

    let mut disk_index = match current {
        Some(cur) => cur.disk_index,
        None => {
            if reverse {
                list.disks.len() - 1
            } else {
                0
            }
        }
    };
    let mut region_cursor = current.map(|c| c.region);

    loop {
        let disk = &list.disks[disk_index];
        if let Some(next) = adjacent_region(Some(disk), region_cursor, flags) {
            return Some(PartitionCursor {
                disk_index,
                region: next,
            });
        }

        let next_disk_index = if reverse {
            disk_index.checked_sub(1)
        } else if disk_index + 1 < list.disks.len() {
            Some(disk_index + 1)
        } else {
            None
        };

        match next_disk_index {
            Some(next) => {
                disk_index = next;
                region_cursor = None;
            }
            None => return None,
        }
    }
}
