// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::collab::FormatState;

/// Filesystem view of a partitioned region.
#[derive(Clone, Debug, Default)]
pub struct Volume {
    /// NT-style device name, e.g. `\Device\Harddisk0\Partition1`. Empty
    /// for an unmounted or free region.
    pub device_name: String,

    /// Assigned drive letter, if any.
    pub drive_letter: Option<char>,

    /// Up to 32 characters long.
    pub label: String,

    /// Filesystem tag reported by filesystem inference, e.g. `"FAT32"`.
    /// Empty when unknown or unformatted.
    pub filesystem: String,

    /// Current format classification.
    pub format_state: FormatState,

    /// True if this volume was created by the current edit and has not
    /// yet been written back.
    pub new: bool,

    /// True if the volume should be chkdsk'd before use (not currently
    /// set by this engine, but plumbed through for callers).
    pub needs_check: bool,
}

impl Volume {
    /// An empty, unmounted volume record — the state a free region's
    /// embedded volume always holds.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this volume currently has an open device mapping.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        !self.device_name.is_empty()
    }

    /// Clear everything a dismount resets, regardless of how the
    /// dismount itself went.
    pub fn clear_mount_state(&mut self) {
        self.drive_letter = None;
        self.filesystem.clear();
        self.label.clear();
        self.format_state = FormatState::Unformatted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_volume_is_not_mounted() {
        let v = Volume::empty();
        assert!(!v.is_mounted());
    }

    #[test]
    fn test_clear_mount_state() {
        let mut v = Volume {
            device_name: "\\Device\\Harddisk0\\Partition1".into(),
            drive_letter: Some('D'),
            label: "DATA".into(),
            filesystem: "NTFS".into(),
            format_state: FormatState::Formatted,
            new: false,
            needs_check: false,
        };
        v.clear_mount_state();
        assert_eq!(v.drive_letter, None);
        assert!(v.filesystem.is_empty());
        assert!(v.label.is_empty());
        assert_eq!(v.format_state, FormatState::Unformatted);
        // device_name is left alone; callers clear it separately when
        // the device handle itself is closed.
        assert!(v.is_mounted());
    }
}
