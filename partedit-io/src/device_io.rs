// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt::{Debug, Display};
use partedit_types::SectorSize;

/// Trait for reading from and writing to a block-addressed storage
/// device.
///
/// This is the only seam between the partition-editing engine and the
/// outside world that actually touches bytes on a disk: everything
/// above this trait deals in sectors and partition tables, never in
/// platform-specific handles.
pub trait DeviceIo {
    /// IO error type.
    type Error: Debug + Display + Send + Sync + 'static;

    /// Panic if the `buffer` size is zero, or not a multiple of
    /// [`sector_size`].
    ///
    /// [`sector_size`]: Self::sector_size
    fn assert_valid_buffer(&self, buffer: &[u8]) {
        let buf_len = u64::try_from(buffer.len()).unwrap();
        let sector_size = self.sector_size().to_u64();
        assert_eq!(buf_len % sector_size, 0);
    }

    /// Get the [`SectorSize`]. The return value is not allowed to
    /// change over the lifetime of a single `DeviceIo`.
    fn sector_size(&self) -> SectorSize;

    /// Get the total number of sectors on the device.
    ///
    /// If the underlying storage has a number of bytes that are not
    /// evenly divisible by [`sector_size`], the implementation should
    /// return the number of whole sectors. In that case, the partial
    /// sector at the end is not accessible.
    ///
    /// [`sector_size`]: Self::sector_size
    fn num_sectors(&mut self) -> Result<u64, Self::Error>;

    /// Read contiguous sectors from the device. The `dst` buffer size
    /// must be a non-zero multiple of [`sector_size`]. Implementations
    /// can use [`assert_valid_buffer`] to check this.
    ///
    /// [`assert_valid_buffer`]: Self::assert_valid_buffer
    /// [`sector_size`]: Self::sector_size
    fn read_sectors(
        &mut self,
        start_sector: u64,
        dst: &mut [u8],
    ) -> Result<(), Self::Error>;

    /// Write contiguous sectors to the device. The `src` buffer size
    /// must be a non-zero multiple of [`sector_size`]. Implementations
    /// can use [`assert_valid_buffer`] to check this.
    ///
    /// Writes are not guaranteed to be complete until [`flush`] is
    /// called.
    ///
    /// [`assert_valid_buffer`]: Self::assert_valid_buffer
    /// [`sector_size`]: Self::sector_size
    /// [`flush`]: Self::flush
    fn write_sectors(
        &mut self,
        start_sector: u64,
        src: &[u8],
    ) -> Result<(), Self::Error>;

    /// Flush any pending writes to the device.
    fn flush(&mut self) -> Result<(), Self::Error>;
}
