// SPDX-License-Identifier: MIT OR Apache-2.0

//! Opens a region's volume, infers its filesystem, and records the
//! resulting format state. The inverse, dismounting, is a best-effort
//! cleanup that always resets the volume record regardless of whether
//! the underlying device operation succeeded.

use crate::collab::{FilesystemInference, FormatState, FS_RAW};
use crate::model::Volume;
use partedit_types::PartitionType;

const FAT_FAMILY: &[PartitionType] = &[
    PartitionType::FAT12,
    PartitionType::FAT16_SMALL,
    PartitionType::FAT16B,
    PartitionType::FAT16B_LBA,
    PartitionType::FAT32_CHS,
    PartitionType::FAT32_LBA,
];

/// Mount `volume`, inferring its filesystem through `inference`.
///
/// A no-op if `volume.device_name` is empty. Logs and leaves the
/// volume `Unformatted`/empty on inference failure, since a failed
/// probe should not abort the caller's scan or edit.
pub fn mount_volume<I: FilesystemInference>(
    volume: &mut Volume,
    mbr_type: Option<PartitionType>,
    inference: &mut I,
) {
    volume.format_state = FormatState::Unformatted;
    volume.filesystem.clear();

    if volume.device_name.is_empty() {
        return;
    }

    let filesystem = match inference.infer_filesystem(&volume.device_name) {
        Ok(fs) => fs,
        Err(err) => {
            log::warn!("mount_volume: infer_filesystem({}) failed: {err}", volume.device_name);
            return;
        }
    };

    if filesystem == FS_RAW {
        if mbr_type.is_some_and(|t| FAT_FAMILY.contains(&t)) {
            volume.format_state = FormatState::Unformatted;
        } else {
            dismount_volume(volume);
            volume.format_state = FormatState::UnknownFormat;
            volume.filesystem.clear();
            return;
        }
    } else {
        volume.filesystem = filesystem;
        volume.format_state = FormatState::Formatted;
    }

    volume.label = inference.read_label(&volume.device_name).unwrap_or_default();
}

/// Dismount `volume`: clears drive letter, filesystem, and label
/// regardless of whether the underlying lock/dismount device
/// operation succeeds, since the in-memory model must not keep
/// claiming a mount that the caller is in the process of tearing
/// down. The device handle itself is the caller's to close.
pub fn dismount_volume(volume: &mut Volume) {
    if !volume.is_mounted() {
        return;
    }
    volume.clear_mount_state();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeInference {
        filesystems: HashMap<String, String>,
        labels: HashMap<String, String>,
    }

    impl FilesystemInference for FakeInference {
        type Error = std::convert::Infallible;

        fn infer_filesystem(&mut self, device_name: &str) -> Result<String, Self::Error> {
            Ok(self
                .filesystems
                .get(device_name)
                .cloned()
                .unwrap_or_else(|| FS_RAW.to_string()))
        }

        fn read_label(&mut self, device_name: &str) -> Option<String> {
            self.labels.get(device_name).cloned()
        }
    }

    #[test]
    fn test_mount_volume_raw_fat_type_is_unformatted() {
        let mut volume = Volume {
            device_name: "\\Device\\Harddisk0\\Partition1".into(),
            ..Volume::empty()
        };
        let mut inference = FakeInference {
            filesystems: HashMap::new(),
            labels: HashMap::new(),
        };
        mount_volume(&mut volume, Some(PartitionType::FAT32_LBA), &mut inference);
        assert_eq!(volume.format_state, FormatState::Unformatted);
    }

    #[test]
    fn test_mount_volume_raw_non_fat_type_is_unknown() {
        let mut volume = Volume {
            device_name: "\\Device\\Harddisk0\\Partition1".into(),
            ..Volume::empty()
        };
        let mut inference = FakeInference {
            filesystems: HashMap::new(),
            labels: HashMap::new(),
        };
        mount_volume(&mut volume, Some(PartitionType::IFS), &mut inference);
        assert_eq!(volume.format_state, FormatState::UnknownFormat);
        assert!(volume.filesystem.is_empty());
    }

    #[test]
    fn test_mount_volume_recognized_filesystem() {
        let mut volume = Volume {
            device_name: "\\Device\\Harddisk0\\Partition1".into(),
            ..Volume::empty()
        };
        let mut inference = FakeInference {
            filesystems: [(volume.device_name.clone(), "NTFS".to_string())].into(),
            labels: [(volume.device_name.clone(), "DATA".to_string())].into(),
        };
        mount_volume(&mut volume, Some(PartitionType::IFS), &mut inference);
        assert_eq!(volume.format_state, FormatState::Formatted);
        assert_eq!(volume.filesystem, "NTFS");
        assert_eq!(volume.label, "DATA");
    }

    #[test]
    fn test_mount_volume_empty_device_name_is_noop() {
        let mut volume = Volume::empty();
        let mut inference = FakeInference {
            filesystems: HashMap::new(),
            labels: HashMap::new(),
        };
        mount_volume(&mut volume, None, &mut inference);
        assert_eq!(volume.format_state, FormatState::Unformatted);
    }

    #[test]
    fn test_dismount_volume_clears_state() {
        let mut volume = Volume {
            device_name: "\\Device\\Harddisk0\\Partition1".into(),
            drive_letter: Some('D'),
            filesystem: "NTFS".into(),
            label: "DATA".into(),
            format_state: FormatState::Formatted,
            ..Volume::empty()
        };
        dismount_volume(&mut volume);
        assert_eq!(volume.drive_letter, None);
        assert!(volume.filesystem.is_empty());
        assert_eq!(volume.format_state, FormatState::Unformatted);
    }
}
