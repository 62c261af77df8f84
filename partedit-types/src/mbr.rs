// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::num::format_u8_slice_lower_hex_le;
use crate::U32Le;
use core::fmt::{self, Display, Formatter};

#[cfg(feature = "bytemuck")]
use bytemuck::{Pod, Zeroable};

/// Legacy disk geometry used for converting an LBA to a [`Chs`] address.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DiskGeometry {
    /// Heads per cylinder.
    pub heads_per_cylinder: u32,

    /// Sectors per track.
    pub sectors_per_track: u32,
}

impl DiskGeometry {
    /// Fallback geometry used when the firmware does not report one.
    /// These are the same values most BIOS-era partitioning tools fall
    /// back to.
    pub const UNKNOWN: Self = Self {
        heads_per_cylinder: 255,
        sectors_per_track: 63,
    };
}

impl Default for DiskGeometry {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl Display for DiskGeometry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HPC={}/SPT={}",
            self.heads_per_cylinder, self.sectors_per_track
        )
    }
}

/// Legacy cylinder/head/sector address, as packed into an MBR partition
/// entry.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "bytemuck", derive(Pod, Zeroable))]
#[repr(C)]
pub struct Chs(pub [u8; 3]);

impl Chs {
    /// CHS address used to mark a partition that has no representable
    /// CHS geometry (cylinder, head, and sector all saturated).
    pub const MAX: Self = Self([0xff, 0xff, 0xff]);

    /// Get the 10 cylinder bits as a [`u16`].
    #[must_use]
    pub fn cylinder(self) -> u16 {
        let h = self.0[1] & 0b1100_0000;
        let l = self.0[2];
        (u16::from(h) << 2) | u16::from(l)
    }

    /// Get the 8 head bits as a [`u8`].
    #[must_use]
    pub fn head(self) -> u8 {
        self.0[0]
    }

    /// Get the 6 sector bits as a [`u8`].
    #[must_use]
    pub fn sector(self) -> u8 {
        self.0[1] & 0b0011_1111
    }

    /// Get a tuple of `(cylinder, head, sector)`.
    #[must_use]
    pub fn as_tuple(self) -> (u16, u8, u8) {
        (self.cylinder(), self.head(), self.sector())
    }

    /// Create a new `Chs`. Returns `None` if `cylinder` can't fit in 10
    /// bits, or if `sector` can't fit in 6 bits.
    #[allow(clippy::missing_panics_doc)]
    #[must_use]
    pub fn new(cylinder: u16, head: u8, sector: u8) -> Option<Self> {
        if (cylinder & 0b1111_1100_0000_0000) != 0 {
            return None;
        }
        if (sector & 0b1100_0000) != 0 {
            return None;
        }
        Some(Chs([
            head,
            u8::try_from((cylinder & 0b11_0000_0000) >> 2).unwrap()
                | (sector & 0b0011_1111),
            u8::try_from(cylinder & 0xff).unwrap(),
        ]))
    }

    /// Convert a zero-based LBA to a CHS address using the given
    /// geometry. Returns [`Chs::MAX`] (rather than `None`) when the LBA
    /// doesn't fit, matching how real firmware marks an address that
    /// overflows the legacy CHS fields.
    #[must_use]
    pub fn from_lba_saturating(lba: u64, geom: DiskGeometry) -> Self {
        Self::from_lba(lba, geom).unwrap_or(Self::MAX)
    }

    /// Convert a zero-based LBA to a CHS address. Returns `None` if the
    /// LBA value cannot fit in the CHS format.
    #[must_use]
    pub fn from_lba(lba: u64, geom: DiskGeometry) -> Option<Self> {
        let lba = u32::try_from(lba).ok()?;

        // https://en.wikipedia.org/wiki/Logical_block_addressing
        let cylinder = lba / (geom.heads_per_cylinder * geom.sectors_per_track);
        let head = (lba / geom.sectors_per_track) % geom.heads_per_cylinder;
        let sector = (lba % geom.sectors_per_track) + 1;

        Self::new(
            cylinder.try_into().ok()?,
            head.try_into().ok()?,
            sector.try_into().ok()?,
        )
    }
}

impl Display for Chs {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CHS={}/{}/{}",
            self.cylinder(),
            self.head(),
            self.sector()
        )
    }
}

/// A single 16-byte entry in the MBR partition table.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "bytemuck", derive(Pod, Zeroable))]
#[repr(C)]
pub struct MbrPartitionEntry {
    /// A value of `0x80` marks this as the legacy-bootable partition.
    /// Any other value means it is not bootable.
    pub boot_indicator: u8,

    /// Legacy start-of-partition address. Superseded by `starting_lba`
    /// on any disk larger than the 8.4 GB CHS limit.
    pub start_chs: Chs,

    /// Partition type byte. See `partition_type::PartitionType` for the
    /// values this engine recognizes.
    pub partition_type: u8,

    /// Legacy end-of-partition address.
    pub end_chs: Chs,

    /// Starting LBA of the partition, relative to the start of the
    /// disk for primary/extended entries, or relative to the start of
    /// the containing extended partition for logical entries.
    pub starting_lba: U32Le,

    /// Size of the partition in sectors.
    pub size_in_lba: U32Le,
}

impl MbrPartitionEntry {
    /// An all-zero entry, i.e. an unused table slot.
    pub const EMPTY: Self = Self {
        boot_indicator: 0,
        start_chs: Chs([0, 0, 0]),
        partition_type: 0,
        end_chs: Chs([0, 0, 0]),
        starting_lba: U32Le([0; 4]),
        size_in_lba: U32Le([0; 4]),
    };

    /// Whether this slot holds a partition (non-zero type byte).
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.partition_type != 0
    }

    /// Whether the boot indicator marks this as the active/bootable
    /// partition.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.boot_indicator == 0x80
    }
}

impl Display for MbrPartitionEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("MbrPartitionEntry { ")?;
        write!(f, "boot_indicator: {:#x}", self.boot_indicator)?;
        write!(f, ", start_chs: {}", self.start_chs)?;
        write!(f, ", partition_type: {:#x}", self.partition_type)?;
        write!(f, ", end_chs: {}", self.end_chs)?;
        write!(f, ", starting_lba: {}", self.starting_lba)?;
        write!(f, ", size_in_lba: {}", self.size_in_lba)?;
        f.write_str(" }")
    }
}

/// The first sector of a disk: boot code, disk signature, and the
/// four-entry primary partition table.
#[derive(Clone, Copy, Eq, PartialEq)]
#[repr(C)]
pub struct MbrSector {
    /// Boot code. Preserved verbatim by this engine; never executed or
    /// interpreted.
    pub boot_strap_code: [u8; 440],

    /// Disk signature used by the mount-point registry to identify a
    /// disk across reboots.
    pub unique_disk_signature: U32Le,

    /// Reserved, historically used for a copy-protection flag.
    pub unknown: [u8; 2],

    /// The four legacy partition table entries.
    pub partitions: [MbrPartitionEntry; 4],

    /// Boot signature, must be `[0x55, 0xaa]` for the sector to be
    /// recognized as a valid MBR.
    pub signature: [u8; 2],
}

/// Required value of [`MbrSector::signature`].
pub const MBR_BOOT_SIGNATURE: [u8; 2] = [0x55, 0xaa];

// Manual implementation needed because of the large boot_strap_code
// array field.
impl Default for MbrSector {
    fn default() -> Self {
        Self {
            boot_strap_code: [0; 440],
            unique_disk_signature: U32Le::default(),
            unknown: [0; 2],
            partitions: [MbrPartitionEntry::default(); 4],
            signature: [0; 2],
        }
    }
}

// Manual implementation needed because of the large boot_strap_code
// array field.
#[cfg(feature = "bytemuck")]
#[allow(unsafe_code)]
unsafe impl Pod for MbrSector {}
#[cfg(feature = "bytemuck")]
#[allow(unsafe_code)]
unsafe impl Zeroable for MbrSector {}

impl MbrSector {
    /// Whether the `boot_strap_code` field is all zeros.
    #[must_use]
    pub fn is_boot_strap_code_zero(&self) -> bool {
        self.boot_strap_code.iter().all(|b| *b == 0)
    }

    /// Whether [`Self::signature`] holds the required boot signature.
    #[must_use]
    pub fn has_valid_signature(&self) -> bool {
        self.signature == MBR_BOOT_SIGNATURE
    }

    /// Create a blank MBR sector with the boot signature already set and
    /// the given disk signature, but with an empty partition table.
    #[must_use]
    pub fn new(disk_signature: u32) -> Self {
        Self {
            boot_strap_code: [0; 440],
            unique_disk_signature: U32Le::from_u32(disk_signature),
            unknown: [0; 2],
            partitions: [MbrPartitionEntry::EMPTY; 4],
            signature: MBR_BOOT_SIGNATURE,
        }
    }

    /// Compute the checksum used to detect disk-signature collisions: the
    /// two's-complement negation of the sum of the sector's first 128
    /// little-endian 32-bit words (i.e. the whole 512-byte sector,
    /// viewed as `u32`s).
    #[must_use]
    pub fn checksum(&self) -> u32 {
        let bytes = self.as_bytes();
        let mut sum: u32 = 0;
        for word in bytes.chunks_exact(4) {
            let word = u32::from_le_bytes(word.try_into().unwrap());
            sum = sum.wrapping_add(word);
        }
        sum.wrapping_neg()
    }

    /// View the sector as its raw 512-byte on-disk representation.
    #[must_use]
    pub fn as_bytes(&self) -> [u8; 512] {
        let mut out = [0u8; 512];
        out[0..440].copy_from_slice(&self.boot_strap_code);
        out[440..444].copy_from_slice(&self.unique_disk_signature.0);
        out[444..446].copy_from_slice(&self.unknown);
        for (i, entry) in self.partitions.iter().enumerate() {
            let offset = 446 + i * 16;
            out[offset] = entry.boot_indicator;
            out[offset + 1..offset + 4].copy_from_slice(&entry.start_chs.0);
            out[offset + 4] = entry.partition_type;
            out[offset + 5..offset + 8].copy_from_slice(&entry.end_chs.0);
            out[offset + 8..offset + 12]
                .copy_from_slice(&entry.starting_lba.0);
            out[offset + 12..offset + 16]
                .copy_from_slice(&entry.size_in_lba.0);
        }
        out[510..512].copy_from_slice(&self.signature);
        out
    }
}

impl Display for MbrSector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("MbrSector { boot_strap_code: ")?;

        if self.is_boot_strap_code_zero() {
            write!(f, "[0; {}]", self.boot_strap_code.len())?;
        } else {
            f.write_str("<non-zero>")?;
        }

        f.write_str(", unique_disk_signature: ")?;
        Display::fmt(&self.unique_disk_signature, f)?;

        f.write_str(", unknown: ")?;
        format_u8_slice_lower_hex_le(f, &self.unknown)?;

        f.write_str(", partitions: [")?;
        for (i, partition) in self.partitions.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            partition.fmt(f)?;
        }

        f.write_str("], signature: 0x")?;
        format_u8_slice_lower_hex_le(f, &self.signature)?;

        f.write_str(" }")
    }
}
