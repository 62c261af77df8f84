// SPDX-License-Identifier: MIT OR Apache-2.0

use anyhow::Result;
use partedit_io::{DeviceError, DeviceHandle, DeviceIo, MutSliceDeviceIo};
use partedit_types::{Chs, MbrPartitionEntry, MbrSector, SectorSize, U32Le};
#[cfg(feature = "std")]
use {
    partedit_io::StdDeviceIo,
    std::fs::{self, OpenOptions},
    tempfile::TempDir,
};

fn sample_mbr() -> MbrSector {
    let mut mbr = MbrSector::new(0xdead_beef);
    mbr.partitions[0] = MbrPartitionEntry {
        boot_indicator: 0x80,
        start_chs: Chs::new(0, 1, 1).unwrap(),
        partition_type: 0x07,
        end_chs: Chs::new(10, 254, 63).unwrap(),
        starting_lba: U32Le::from_u32(2048),
        size_in_lba: U32Le::from_u32(204_800),
    };
    mbr
}

fn test_disk_io_roundtrip<Io>(
    io: Io,
) -> Result<(), DeviceError<Io::Error>>
where
    Io: DeviceIo,
{
    let mut sector_buf = vec![0u8; 512];
    let mut device = DeviceHandle::new(io)?;

    let mbr = sample_mbr();
    device.write_mbr(&mbr, &mut sector_buf)?;
    device.flush()?;

    let read_back = device.read_mbr(&mut sector_buf)?;
    assert_eq!(read_back.as_bytes(), mbr.as_bytes());
    assert!(read_back.has_valid_signature());
    assert_eq!(read_back.partitions[0].partition_type, 0x07);
    assert_eq!(read_back.partitions[0].starting_lba.to_u32(), 2048);

    Ok(())
}

#[test]
fn test_disk_io_mut_slice() {
    let mut data = vec![0u8; 512 * 4];
    test_disk_io_roundtrip(MutSliceDeviceIo::new(
        &mut data,
        SectorSize::B512,
    ))
    .unwrap();
}

#[cfg(feature = "std")]
#[test]
fn test_disk_io_file() -> Result<()> {
    let tmp_dir = TempDir::new()?;
    let path = tmp_dir.path().join("disk.img");
    fs::write(&path, vec![0u8; 512 * 4])?;

    let mut file = OpenOptions::new().read(true).write(true).open(&path)?;
    test_disk_io_roundtrip(StdDeviceIo::new(&mut file, SectorSize::B512))
        .unwrap();

    Ok(())
}
