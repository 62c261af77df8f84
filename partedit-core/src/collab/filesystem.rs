// SPDX-License-Identifier: MIT OR Apache-2.0

/// Format state of a volume, as classified by the Mounter.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum FormatState {
    /// No recognizable filesystem; assumed safe to format as RawFS.
    #[default]
    Unformatted,
    /// No recognizable filesystem and the device didn't look like a
    /// plain unformatted FAT-family partition either; inference or the
    /// device itself may be damaged.
    UnformattedOrDamaged,
    /// A filesystem was detected but this engine doesn't otherwise
    /// model it.
    UnknownFormat,
    /// A named filesystem was recognized.
    Formatted,
}

/// Filesystem name reported by [`FilesystemInference`]. `"RAW"` is the
/// sentinel meaning "no filesystem recognized".
pub const FS_RAW: &str = "RAW";

/// Infers the filesystem present on an already-opened device.
///
/// This is the engine's only source of filesystem knowledge; it does
/// not parse boot sectors itself.
pub trait FilesystemInference {
    /// Error type for a failed inference attempt.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Inspect the device named `device_name` and report the
    /// filesystem found, or [`FS_RAW`] if none was recognized.
    fn infer_filesystem(&mut self, device_name: &str) -> Result<String, Self::Error>;

    /// Read up to a 32-character volume label for `device_name`. An
    /// absent or unreadable label is `None`, not an error.
    fn read_label(&mut self, device_name: &str) -> Option<String>;
}

/// Filesystem names this engine is willing to leave mounted read-write
/// when selecting a system partition (see
/// `editor::find_supported_system_partition`).
pub const WRITABLE_FILESYSTEMS: &[&str] = &["FAT", "FAT32", "BTRFS"];
