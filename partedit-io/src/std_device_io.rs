// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{DeviceError, DeviceIo, SliceDeviceIoError};
use partedit_types::SectorSize;
use std::error::Error;
use std::fmt::{Debug, Display};
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Wrapper type that implements the [`DeviceIo`] trait for a file-like
/// type that implements [`Read`], [`Write`], and [`Seek`].
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use partedit_io::{DeviceHandle, StdDeviceIo};
/// use partedit_types::SectorSize;
/// use std::fs::File;
///
/// let mut file = File::open("some/disk")?;
/// let io = StdDeviceIo::new(&mut file, SectorSize::B512);
///
/// let mut sector_buf = vec![0u8; 512];
/// let mut device = DeviceHandle::new(io)?;
/// let mbr = device.read_mbr(&mut sector_buf)?;
/// # Ok(())
/// # }
/// ```
pub struct StdDeviceIo<'a, T>
where
    T: Read + Write + Seek,
{
    file: &'a mut T,
    sector_size: SectorSize,
}

impl<'a, T> StdDeviceIo<'a, T>
where
    T: Read + Write + Seek,
{
    /// Create a `StdDeviceIo` from a file-like input. The input type
    /// must implement [`Read`], [`Write`], and [`Seek`].
    pub fn new(file: &'a mut T, sector_size: SectorSize) -> Self {
        Self { file, sector_size }
    }
}

impl<'a, T> DeviceIo for StdDeviceIo<'a, T>
where
    T: Read + Write + Seek,
{
    type Error = io::Error;

    fn sector_size(&self) -> SectorSize {
        self.sector_size
    }

    fn num_sectors(&mut self) -> Result<u64, Self::Error> {
        let sector_size = self.sector_size().to_u64();
        let num_bytes = self.file.seek(SeekFrom::End(0))?;
        Ok(num_bytes / sector_size)
    }

    fn read_sectors(
        &mut self,
        start_sector: u64,
        dst: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.assert_valid_buffer(dst);

        self.file.seek(SeekFrom::Start(
            start_sector * self.sector_size().to_u64(),
        ))?;
        self.file.read_exact(dst)?;
        Ok(())
    }

    fn write_sectors(
        &mut self,
        start_sector: u64,
        src: &[u8],
    ) -> Result<(), Self::Error> {
        self.assert_valid_buffer(src);

        self.file.seek(SeekFrom::Start(
            start_sector * self.sector_size().to_u64(),
        ))?;
        self.file.write_all(src)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.file.flush()
    }
}

impl<Custom> Error for DeviceError<Custom> where Custom: Debug + Display {}

impl Error for SliceDeviceIoError {}
