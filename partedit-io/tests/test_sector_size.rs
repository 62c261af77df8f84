// SPDX-License-Identifier: MIT OR Apache-2.0

mod common;

use common::check_derives;
use partedit_types::SectorSize;

#[test]
fn test_sector_size() {
    check_derives::<SectorSize>();

    assert_eq!(SectorSize::new(512).unwrap().to_u32(), 512);
    assert!(SectorSize::new(0).is_none());
    assert!(SectorSize::new(511).is_none());

    assert_eq!(SectorSize::default().to_u64(), 512);
    assert_eq!(SectorSize::B512.to_usize().unwrap(), 512);
}

#[test]
#[should_panic]
fn test_assert_valid_sector_buffer_rejects_short_buffer() {
    SectorSize::B512.assert_valid_sector_buffer(&[0u8; 10]);
}
