// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sector-level I/O for reading and writing MBR partition tables
//! through a block-device interface.
//!
//! This crate adds a convenient interface for reading and writing the
//! wire types defined in the [`partedit_types`] crate to a
//! [`DeviceHandle`]. The device is represented by the [`DeviceIo`]
//! trait, which allows this library to be `no_std`. It can be backed
//! by:
//! * [`SliceDeviceIo`]: a read-only byte slice
//! * [`MutSliceDeviceIo`]: a mutable byte slice
//! * [`StdDeviceIo`] (only available if the `std` feature is enabled):
//!   wraps any type that implements [`Read`] + [`Write`] + [`Seek`],
//!   such as a [`File`].
//! * A custom implementation of the [`DeviceIo`] trait, e.g. for a raw
//!   platform disk handle.
//!
//! # Features
//!
//! * `std`: Enables the [`StdDeviceIo`] type, as well as
//!   `std::error::Error` implementations for all of the error types.
//!   Off by default.
//!
//! [`File`]: std::fs::File
//! [`Read`]: std::io::Read
//! [`Seek`]: std::io::Seek
//! [`Write`]: std::io::Write

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::as_conversions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod device_io;
mod disk_io;
mod slice_device_io;
#[cfg(feature = "std")]
mod std_device_io;

// Re-export dependencies.
pub use partedit_types;

pub use device_io::DeviceIo;
pub use disk_io::{DeviceError, DeviceHandle};
pub use slice_device_io::{
    MutSliceDeviceIo, SliceDeviceIo, SliceDeviceIoError,
};

#[cfg(feature = "std")]
pub use std_device_io::StdDeviceIo;
