// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline MBR disk partition editor: enumerates existing partition
//! tables, models each disk as ordered sectors of used and free
//! regions, lets a caller create and delete primary/extended/logical
//! partitions, selects a bootable system partition, and writes the
//! modified tables back.
//!
//! This crate never touches a device or the platform configuration
//! store directly — it is driven entirely through the collaborator
//! traits in [`collab`], so a caller can test against in-memory fakes
//! (`partedit_io::SliceDeviceIo`, [`collab::MapConfigStore`]) or wire
//! up real device I/O and registry access.

#![warn(missing_debug_implementations, unreachable_pub)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod collab;
pub mod editor;
pub mod error;
pub mod firmware;
pub mod geometry;
pub mod model;
pub mod mounter;
pub mod scanner;
pub mod writer;

pub use error::PartitionError;
pub use firmware::{enumerate_firmware_disks, FirmwareDisk};
pub use model::{Disk, DiskStyle, PartitionList, Region, RegionRef, Volume};
