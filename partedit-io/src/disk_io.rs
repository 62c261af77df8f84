// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::DeviceIo;
use bytemuck::bytes_of;
use core::fmt::{self, Debug, Display, Formatter};
use core::mem;
use partedit_types::MbrSector;

/// Error type used by [`DeviceHandle`] methods.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
pub enum DeviceError<IoError: Debug + Display> {
    /// The storage buffer is not large enough.
    BufferTooSmall,

    /// Numeric overflow occurred.
    Overflow,

    /// Error from a [`DeviceIo`] implementation (see
    /// [`DeviceIo::Error`]).
    ///
    /// [`DeviceIo`]: crate::DeviceIo
    /// [`DeviceIo::Error`]: crate::DeviceIo::Error
    Io(IoError),
}

impl<IoError> From<IoError> for DeviceError<IoError>
where
    IoError: Debug + Display,
{
    fn from(err: IoError) -> Self {
        DeviceError::Io(err)
    }
}

impl<IoError> Display for DeviceError<IoError>
where
    IoError: Debug + Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall => f.write_str("storage buffer is too small"),
            Self::Overflow => f.write_str("numeric overflow occurred"),
            Self::Io(io) => Display::fmt(io, f),
        }
    }
}

/// Read and write MBR sectors on a device.
///
/// The device is accessed via an object implementing the [`DeviceIo`]
/// trait, so all reads and writes are on sector boundaries. Writes are
/// not guaranteed to be completed until [`flush`] is called. This
/// happens automatically when the `DeviceHandle` is dropped, but if an
/// error occurs at that point it is silently ignored, so it's best to
/// call [`flush`] directly before dropping the handle.
///
/// Every method here takes a `sector_buf` argument: a mutable byte
/// buffer with a length of at least one sector. This lets `DeviceHandle`
/// avoid doing any internal memory allocation.
///
/// [`flush`]: Self::flush
pub struct DeviceHandle<Io: DeviceIo> {
    io: Io,
}

impl<Io: DeviceIo> DeviceHandle<Io> {
    /// Create a `DeviceHandle`.
    pub fn new(io: Io) -> Result<Self, DeviceError<Io::Error>> {
        Ok(Self { io })
    }

    /// Clip the size of `sector_buf` to a single sector. Return
    /// `BufferTooSmall` if the buffer isn't big enough.
    fn clip_sector_buf_size<'buf>(
        &self,
        sector_buf: &'buf mut [u8],
    ) -> Result<&'buf mut [u8], DeviceError<Io::Error>> {
        if let Some(sector_size) = self.io.sector_size().to_usize() {
            sector_buf
                .get_mut(..sector_size)
                .ok_or(DeviceError::BufferTooSmall)
        } else {
            Err(DeviceError::BufferTooSmall)
        }
    }

    /// Read the MBR sector at sector 0 of the device.
    ///
    /// `sector_buf` is a mutable byte buffer with a length of at least
    /// one sector.
    pub fn read_mbr(
        &mut self,
        sector_buf: &mut [u8],
    ) -> Result<MbrSector, DeviceError<Io::Error>> {
        self.read_mbr_at(0, sector_buf)
    }

    /// Read an MBR-formatted sector at an arbitrary sector offset. Used
    /// both for the disk's own MBR and for the embedded boot-record of
    /// an extended partition.
    ///
    /// No validation (e.g. boot signature) is performed here; callers
    /// decide what to do with an invalid sector.
    pub fn read_mbr_at(
        &mut self,
        sector: u64,
        mut sector_buf: &mut [u8],
    ) -> Result<MbrSector, DeviceError<Io::Error>> {
        sector_buf = self.clip_sector_buf_size(sector_buf)?;
        self.io.read_sectors(sector, sector_buf)?;
        let bytes = sector_buf
            .get(..mem::size_of::<MbrSector>())
            // OK to unwrap: the sector size type guarantees a minimum
            // size of 512 bytes, which is exactly `size_of::<MbrSector>()`.
            .unwrap();
        Ok(*bytemuck::from_bytes(bytes))
    }

    /// Write an MBR sector at sector 0 of the device. If the sector size
    /// is bigger than 512 bytes, the rest of the sector is filled with
    /// zeroes.
    ///
    /// `sector_buf` is a mutable byte buffer with a length of at least
    /// one sector.
    pub fn write_mbr(
        &mut self,
        mbr: &MbrSector,
        sector_buf: &mut [u8],
    ) -> Result<(), DeviceError<Io::Error>> {
        self.write_mbr_at(0, mbr, sector_buf)
    }

    /// Write an MBR-formatted sector at an arbitrary sector offset.
    ///
    /// `sector_buf` is a mutable byte buffer with a length of at least
    /// one sector.
    pub fn write_mbr_at(
        &mut self,
        sector: u64,
        mbr: &MbrSector,
        mut sector_buf: &mut [u8],
    ) -> Result<(), DeviceError<Io::Error>> {
        sector_buf = self.clip_sector_buf_size(sector_buf)?;

        let mbr_bytes = bytes_of(mbr);

        // This should always be true because sector_buf is already
        // known to be exactly one sector, and the sector size is
        // enforced to be at least 512 bytes, the size of an MbrSector.
        assert!(sector_buf.len() >= mbr_bytes.len());

        {
            let (left, right) = sector_buf.split_at_mut(mbr_bytes.len());
            left.copy_from_slice(mbr_bytes);
            right.fill(0);
        }

        self.io.write_sectors(sector, sector_buf)?;
        Ok(())
    }
}

impl<Io: DeviceIo> DeviceIo for DeviceHandle<Io> {
    type Error = Io::Error;

    fn sector_size(&self) -> partedit_types::SectorSize {
        self.io.sector_size()
    }

    fn num_sectors(&mut self) -> Result<u64, Self::Error> {
        self.io.num_sectors()
    }

    fn read_sectors(
        &mut self,
        start_sector: u64,
        dst: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.io.read_sectors(start_sector, dst)
    }

    fn write_sectors(
        &mut self,
        start_sector: u64,
        src: &[u8],
    ) -> Result<(), Self::Error> {
        self.io.write_sectors(start_sector, src)
    }

    /// Flush any pending writes to the device.
    ///
    /// This is called automatically when the handle is dropped, but if
    /// an error occurs at that point it is silently ignored. It's best
    /// to call this method directly before dropping the handle.
    fn flush(&mut self) -> Result<(), Self::Error> {
        self.io.flush()
    }
}

impl<Io: DeviceIo> Drop for DeviceHandle<Io> {
    fn drop(&mut self) {
        // Throw away any errors.
        let _r = self.flush();
    }
}
