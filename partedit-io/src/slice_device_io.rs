// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::DeviceIo;
use core::fmt::{self, Debug, Display, Formatter};
use core::ops::Range;
use partedit_types::SectorSize;

/// Error type used by [`SliceDeviceIo`] and [`MutSliceDeviceIo`].
///
/// If the `std` feature is enabled, this type implements the [`Error`]
/// trait.
///
/// [`Error`]: std::error::Error
#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum SliceDeviceIoError {
    /// Numeric overflow occurred.
    #[default]
    Overflow,

    /// Attempted to write a read-only byte slice.
    ReadOnly,

    /// A read or write is out of bounds.
    OutOfBounds {
        /// Start sector.
        start_sector: u64,

        /// Length in bytes.
        length_in_bytes: usize,
    },
}

impl Display for SliceDeviceIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow => f.write_str("numeric overflow occurred"),
            Self::ReadOnly => {
                f.write_str("attempted to write to a read-only byte slice")
            }
            Self::OutOfBounds {
                start_sector,
                length_in_bytes,
            } => {
                write!(
                    f,
                    "out of bounds: start_sector={start_sector}, length_in_bytes={length_in_bytes}"
                )
            }
        }
    }
}

#[track_caller]
fn buffer_byte_range_opt(
    sector_size: SectorSize,
    start_sector: u64,
    buf: &[u8],
) -> Option<Range<usize>> {
    let start_sector = usize::try_from(start_sector).ok()?;
    let start_byte = start_sector.checked_mul(sector_size.to_usize()?)?;
    let end_byte = start_byte.checked_add(buf.len())?;
    Some(start_byte..end_byte)
}

#[track_caller]
fn buffer_byte_range(
    sector_size: SectorSize,
    start_sector: u64,
    buf: &[u8],
) -> Result<Range<usize>, SliceDeviceIoError> {
    buffer_byte_range_opt(sector_size, start_sector, buf)
        .ok_or(SliceDeviceIoError::Overflow)
}

#[track_caller]
fn num_sectors(
    data: &[u8],
    sector_size: SectorSize,
) -> Result<u64, SliceDeviceIoError> {
    let data_len =
        u64::try_from(data.len()).map_err(|_| SliceDeviceIoError::Overflow)?;

    Ok(data_len / sector_size.to_u64())
}

#[track_caller]
fn read_sectors(
    data: &[u8],
    sector_size: SectorSize,
    start_sector: u64,
    dst: &mut [u8],
) -> Result<(), SliceDeviceIoError> {
    sector_size.assert_valid_sector_buffer(dst);

    let src = data
        .get(buffer_byte_range(sector_size, start_sector, dst)?)
        .ok_or(SliceDeviceIoError::OutOfBounds {
            start_sector,
            length_in_bytes: dst.len(),
        })?;
    dst.copy_from_slice(src);
    Ok(())
}

/// Wrapper type that implements the [`DeviceIo`] trait for immutable
/// byte slices. Useful for testing against in-memory disk images.
#[allow(clippy::module_name_repetitions)]
pub struct SliceDeviceIo<'a> {
    data: &'a [u8],
    sector_size: SectorSize,
}

impl<'a> SliceDeviceIo<'a> {
    /// Create a new `SliceDeviceIo`.
    #[must_use]
    pub fn new(data: &'a [u8], sector_size: SectorSize) -> Self {
        Self { data, sector_size }
    }
}

impl<'a> DeviceIo for SliceDeviceIo<'a> {
    type Error = SliceDeviceIoError;

    fn sector_size(&self) -> SectorSize {
        self.sector_size
    }

    fn num_sectors(&mut self) -> Result<u64, Self::Error> {
        num_sectors(self.data, self.sector_size)
    }

    fn read_sectors(
        &mut self,
        start_sector: u64,
        dst: &mut [u8],
    ) -> Result<(), Self::Error> {
        read_sectors(self.data, self.sector_size, start_sector, dst)
    }

    fn write_sectors(
        &mut self,
        _start_sector: u64,
        _src: &[u8],
    ) -> Result<(), Self::Error> {
        Err(Self::Error::ReadOnly)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Wrapper type that implements the [`DeviceIo`] trait for mutable byte
/// slices. Useful for testing in-memory disk mutations without
/// touching real storage.
#[allow(clippy::module_name_repetitions)]
pub struct MutSliceDeviceIo<'a> {
    data: &'a mut [u8],
    sector_size: SectorSize,
}

impl<'a> MutSliceDeviceIo<'a> {
    /// Create a new `MutSliceDeviceIo`.
    pub fn new(data: &'a mut [u8], sector_size: SectorSize) -> Self {
        Self { data, sector_size }
    }
}

impl<'a> DeviceIo for MutSliceDeviceIo<'a> {
    type Error = SliceDeviceIoError;

    fn sector_size(&self) -> SectorSize {
        self.sector_size
    }

    fn num_sectors(&mut self) -> Result<u64, Self::Error> {
        num_sectors(self.data, self.sector_size)
    }

    fn read_sectors(
        &mut self,
        start_sector: u64,
        dst: &mut [u8],
    ) -> Result<(), Self::Error> {
        read_sectors(self.data, self.sector_size, start_sector, dst)
    }

    fn write_sectors(
        &mut self,
        start_sector: u64,
        src: &[u8],
    ) -> Result<(), Self::Error> {
        self.sector_size.assert_valid_sector_buffer(src);

        let dst = self
            .data
            .get_mut(buffer_byte_range(self.sector_size, start_sector, src)?)
            .ok_or(Self::Error::OutOfBounds {
                start_sector,
                length_in_bytes: src.len(),
            })?;
        dst.copy_from_slice(src);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
