// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt::{self, Display, Formatter};
use core::num::NonZeroU32;

/// Size of a sector in bytes.
///
/// This type enforces some restrictions on the sector size: it must be
/// at least 512 bytes and fit within a [`u32`].
///
/// # Minimum size
///
/// The [`MbrSector`] size is 512 bytes and must fit within a sector, so
/// the sector size must be at least that large.
///
/// [`MbrSector`]: crate::MbrSector
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct SectorSize(NonZeroU32);

impl SectorSize {
    /// 512-byte sector size. The overwhelming majority of disks this
    /// engine handles use this size.
    pub const B512: Self = Self(if let Some(nz) = NonZeroU32::new(512) {
        nz
    } else {
        unreachable!()
    });

    /// Create a `SectorSize`.
    #[must_use]
    pub const fn new(num_bytes: u32) -> Option<Self> {
        if let Some(nz) = NonZeroU32::new(num_bytes) {
            if num_bytes >= 512 {
                Some(Self(nz))
            } else {
                None
            }
        } else {
            None
        }
    }

    /// Get the size in bytes as a [`u32`].
    #[must_use]
    pub const fn to_u32(self) -> u32 {
        self.0.get()
    }

    /// Get the size in bytes as a [`u64`].
    #[must_use]
    pub const fn to_u64(self) -> u64 {
        self.0.get() as u64
    }

    /// Get the size in bytes as a [`usize`].
    #[must_use]
    pub fn to_usize(self) -> Option<usize> {
        self.0.get().try_into().ok()
    }

    /// Panic if `buffer` is not a non-zero multiple of this sector size.
    pub fn assert_valid_sector_buffer(&self, buffer: &[u8]) {
        let len = u64::try_from(buffer.len()).unwrap();
        assert_ne!(len, 0);
        assert_eq!(len % self.to_u64(), 0);
    }
}

impl Default for SectorSize {
    fn default() -> Self {
        SectorSize::B512
    }
}

impl Display for SectorSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
