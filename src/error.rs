//! Error types for vcf-partition

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vcf-partition operations
pub type Result<T> = std::result::Result<T, PartitionError>;

/// Error types that can occur while reading indexes or planning partitions
#[derive(Debug, Error)]
pub enum PartitionError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not in the expected index format
    #[error("File not in expected index format: {msg}")]
    InvalidFormat {
        /// Error message
        msg: String,
    },

    /// Index is structurally damaged
    #[error("Corrupt index: {msg}")]
    CorruptIndex {
        /// Error message
        msg: String,
    },

    /// Invalid argument or input value
    #[error("Invalid input: {msg}")]
    InvalidInput {
        /// Error message
        msg: String,
    },

    /// No .tbi or .csi index next to the variant file
    #[error("Cannot find .tbi or .csi file for {}", path.display())]
    IndexNotFound {
        /// Variant file the index was looked up for
        path: PathBuf,
    },
}

impl PartitionError {
    pub(crate) fn invalid_format(msg: impl Into<String>) -> Self {
        PartitionError::InvalidFormat { msg: msg.into() }
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        PartitionError::CorruptIndex { msg: msg.into() }
    }

    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        PartitionError::InvalidInput { msg: msg.into() }
    }
}
