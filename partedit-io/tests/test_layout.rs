// SPDX-License-Identifier: MIT OR Apache-2.0

use partedit_types::{MbrPartitionEntry, MbrSector};
use std::mem;

#[test]
fn test_layouts() {
    assert_eq!(mem::size_of::<MbrPartitionEntry>(), 16);
    assert_eq!(mem::align_of::<MbrPartitionEntry>(), 1);

    assert_eq!(mem::size_of::<MbrSector>(), 512);
    assert_eq!(mem::align_of::<MbrSector>(), 1);
}
