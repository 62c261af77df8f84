// SPDX-License-Identifier: MIT OR Apache-2.0

//! External collaborator traits: the seams a caller wires up to real
//! device I/O, the platform registry, a clock, and filesystem
//! detection. Everything above this module talks only to these traits,
//! never to the outside world directly.

mod config_store;
mod filesystem;
mod time_source;

pub use config_store::{ConfigStore, ConfigValue, MapConfigStore};
pub use filesystem::{
    FilesystemInference, FormatState, FS_RAW, WRITABLE_FILESYSTEMS,
};
pub use time_source::{BrokenDownTime, SystemTimeSource, TimeSource};
