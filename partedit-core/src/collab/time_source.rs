// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{Datelike, Timelike, Utc};

/// Current time broken into the fields `set_disk_signature` needs.
///
/// Modeled as a trait (rather than calling `chrono::Utc::now()`
/// directly) so disk-signature generation is reproducible in tests.
pub trait TimeSource {
    /// Read the current broken-down time.
    fn now(&self) -> BrokenDownTime;
}

/// Broken-down time fields used to seed a disk signature.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct BrokenDownTime {
    /// Full year, e.g. `2026`.
    pub year: u16,
    /// Month, 1-12.
    pub month: u8,
    /// Day of month, 1-31.
    pub day: u8,
    /// Hour, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
    /// Second, 0-59.
    pub second: u8,
    /// Millisecond, 0-999.
    pub millisecond: u16,
}

/// [`TimeSource`] backed by the system clock via `chrono`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> BrokenDownTime {
        let now = Utc::now();
        BrokenDownTime {
            year: u16::try_from(now.year()).unwrap_or(0),
            month: u8::try_from(now.month()).unwrap_or(0),
            day: u8::try_from(now.day()).unwrap_or(0),
            hour: u8::try_from(now.hour()).unwrap_or(0),
            minute: u8::try_from(now.minute()).unwrap_or(0),
            second: u8::try_from(now.second()).unwrap_or(0),
            millisecond: u16::try_from(now.timestamp_subsec_millis()).unwrap_or(0),
        }
    }
}
