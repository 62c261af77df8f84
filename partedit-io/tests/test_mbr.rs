// SPDX-License-Identifier: MIT OR Apache-2.0

mod common;

use common::check_derives;
use partedit_types::{Chs, DiskGeometry, MbrPartitionEntry, U32Le};

#[test]
fn test_chs() {
    check_derives::<Chs>();

    assert_eq!(
        Chs::from_lba(8191, DiskGeometry::UNKNOWN).unwrap().as_tuple(),
        (0, 130, 2)
    );

    // Out of range errors.
    assert!(Chs::new(0xf000, 1, 1).is_none());
    assert!(Chs::new(1, 1, 0xf0).is_none());

    // LBAs past the CHS limit saturate to the max address rather than
    // erroring.
    assert_eq!(
        Chs::from_lba_saturating(u64::from(u32::MAX), DiskGeometry::UNKNOWN),
        Chs::MAX
    );
}

#[test]
fn test_disk_geometry() {
    check_derives::<DiskGeometry>();
}

#[test]
fn test_mbr_partition_entry_display() {
    let entry = MbrPartitionEntry {
        boot_indicator: 0x80,
        start_chs: Chs::new(1, 2, 3).unwrap(),
        partition_type: 0x07,
        end_chs: Chs::new(4, 5, 6).unwrap(),
        starting_lba: U32Le::from_u32(123),
        size_in_lba: U32Le::from_u32(456),
    };
    assert_eq!(
        entry.to_string(),
        "MbrPartitionEntry { boot_indicator: 0x80, start_chs: CHS=1/2/3, \
         partition_type: 0x7, end_chs: CHS=4/5/6, starting_lba: 123, \
         size_in_lba: 456 }"
    );

    assert!(entry.is_used());
    assert!(entry.is_active());
    assert!(!MbrPartitionEntry::EMPTY.is_used());
}
