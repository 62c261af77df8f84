// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alignment arithmetic and the handful of geometry constants the rest
//! of the engine leans on.

/// Required value of the boot signature word at the end of every MBR
/// sector (offset 0x1FE).
pub const MBR_SIGNATURE: u16 = 0xaa55;

/// Boundary, in sectors, below which an extended container is stamped
/// with the CHS-era type code (`0x05`) and at or above which it is
/// stamped with the LBA-era code (`0x0F`). Equivalent to 8.4 GB at a
/// 512-byte sector size.
pub const CHS_LBA_BOUNDARY_SECTORS: u64 = 1_450_560;

/// Round `value` down to the nearest multiple of `alignment`.
///
/// `alignment` of zero is treated as "no alignment" and returns `value`
/// unchanged; callers are expected to validate a non-zero disk
/// alignment up front.
#[must_use]
pub fn align_down(value: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return value;
    }
    (value / alignment) * alignment
}

/// Round `value` up to the nearest multiple of `alignment`, unless it
/// is already a multiple.
#[must_use]
pub fn align_up(value: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return value;
    }
    let down = align_down(value, alignment);
    if down == value {
        down
    } else {
        down + alignment
    }
}

/// Pick the extended-container partition type for a container starting
/// at `start_sector`, per the CHS/LBA boundary rule.
#[must_use]
pub fn extended_container_type(start_sector: u64) -> partedit_types::PartitionType {
    if start_sector < CHS_LBA_BOUNDARY_SECTORS {
        partedit_types::PartitionType::EXTENDED_CHS
    } else {
        partedit_types::PartitionType::EXTENDED_LBA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_down() {
        assert_eq!(align_down(100, 63), 63);
        assert_eq!(align_down(63, 63), 63);
        assert_eq!(align_down(62, 63), 0);
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(100, 63), 126);
        assert_eq!(align_up(63, 63), 63);
        assert_eq!(align_up(0, 63), 0);
    }

    #[test]
    fn test_extended_container_type_boundary() {
        assert_eq!(
            extended_container_type(CHS_LBA_BOUNDARY_SECTORS - 1),
            partedit_types::PartitionType::EXTENDED_CHS
        );
        assert_eq!(
            extended_container_type(CHS_LBA_BOUNDARY_SECTORS),
            partedit_types::PartitionType::EXTENDED_LBA
        );
    }
}
