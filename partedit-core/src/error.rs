// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt::{Debug, Display};

/// Errors returned by the partition editor.
///
/// There is deliberately no `Success` variant: a successful operation
/// returns `Ok(())` (or `Ok(region)`, etc.) rather than an explicit
/// success case.
#[derive(Debug, thiserror::Error)]
pub enum PartitionError {
    /// Attempted to (re)create a region that is already partitioned.
    #[error("region is already partitioned")]
    NewPartition,

    /// The primary partition table is full (four partitioned entries
    /// already present), or the disk is a super-floppy and already has
    /// its one allowed partition.
    #[error("partition table is full")]
    PartitionTableFull,

    /// Attempted to create a second extended container on a disk that
    /// already has one.
    #[error("disk already has an extended partition")]
    OnlyOneExtended,

    /// The operation targets a GPT disk, which this engine detects but
    /// refuses to mutate.
    #[error("operation is not supported on a GPT disk")]
    WarnPartition,

    /// The underlying device or configuration-store operation failed.
    /// If the failure happened before any mutation the model is
    /// unchanged; otherwise the offending disk is left `dirty` and the
    /// caller may retry.
    #[error("device or configuration I/O failed: {0}")]
    TransientIo(String),

    /// The requested disk or region index does not exist in the list.
    #[error("no such disk or region")]
    NotFound,
}

impl PartitionError {
    /// Wrap an arbitrary I/O failure as [`PartitionError::TransientIo`].
    pub fn transient<E: Debug + Display>(err: E) -> Self {
        Self::TransientIo(err.to_string())
    }
}
