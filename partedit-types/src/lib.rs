// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for legacy MBR partition tables.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────┬──────────┬─────────┬──────────────────┬───────────┐
//! │Boot strap code│Disk sig. │Reserved │4 partition entries│Boot sig.  │
//! │440 bytes      │4 bytes   │2 bytes  │16 bytes each      │0x55 0xaa  │
//! └──────────────┴──────────┴─────────┴──────────────────┴───────────┘
//! ```
//!
//! Everything here describes the single 512-byte sector at the start of
//! a disk (or of an extended partition, for logical volumes). There is
//! no GPT support: a disk whose first sector carries the GPT protective
//! marker (see [`PartitionType::GPT_PROTECTIVE`]) is something higher
//! layers detect and refuse to touch, never something this crate
//! parses.
//!
//! # Endianness
//!
//! Multi-byte integer fields are little-endian on disk regardless of
//! host endianness. [`U16Le`] and [`U32Le`] enforce this; reach for
//! `to_u16`/`to_u32` to get a host-endian value and `from_u16`/
//! `from_u32` to go the other way.
//!
//! # Features
//!
//! * `std`: currently unused by this crate directly, reserved for
//!   downstream `std::error::Error` impls.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::as_conversions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

mod block;
mod mbr;
mod num;
mod partition_type;

// Re-export dependencies used in our public API.
pub use bytemuck;

pub use block::SectorSize;
pub use mbr::{
    Chs, DiskGeometry, MbrPartitionEntry, MbrSector, MBR_BOOT_SIGNATURE,
};
pub use num::{U16Le, U32Le};
pub use partition_type::PartitionType;
