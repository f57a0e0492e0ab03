//! Error types for resource table chunk decoding and encoding.
//!
//! Decoding is all-or-nothing: the first violated size or offset constraint
//! aborts the decode and no partially populated chunk is returned. Binary
//! parsing is deterministic, so none of these errors are worth retrying.
//!
//! # Error Categories
//!
//! ## Data errors (the input is bad)
//!
//! - [`ResTableError::WrongChunkType`] - The header tag belongs to another chunk kind
//! - [`ResTableError::MalformedChunk`] - Redundant size fields disagree with each other
//! - [`ResTableError::OutOfBounds`] - A derived range leaves the chunk or the buffer
//!
//! ## Caller errors
//!
//! - [`ResTableError::BufferTooSmall`] - Encode destination lacks capacity
//!
//! ## Internal errors
//!
//! - [`ResTableError::EncodeLengthMismatch`] - The encoder wrote a different number
//!   of bytes than the chunk declares. Always a bug in this crate, never a data problem.

use thiserror::Error;

/// Result type alias using [`ResTableError`] as the error type.
pub type Result<T> = std::result::Result<T, ResTableError>;

/// Errors that can occur while decoding or encoding resource table chunks.
#[derive(Error, Debug)]
pub enum ResTableError {
    /// Underlying I/O error while writing to a [`std::io::Write`] sink.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by the binrw header codec.
    #[error("binrw error: {0}")]
    BinrwError(String),

    /// The chunk header carries a different type tag than the codec handles.
    ///
    /// The caller dispatched a chunk to the wrong codec.
    #[error("Wrong chunk type at offset {offset}: expected 0x{expected:04X}, found 0x{found:04X}")]
    WrongChunkType {
        /// Type tag the codec decodes.
        expected: u16,
        /// Type tag found in the header.
        found: u16,
        /// Buffer offset of the chunk.
        offset: usize,
    },

    /// The redundant size fields of a chunk are inconsistent.
    #[error("Malformed chunk at offset {offset}: {reason}")]
    MalformedChunk {
        /// Buffer offset of the chunk.
        offset: usize,
        /// Which constraint failed.
        reason: String,
    },

    /// A derived byte range does not fit inside the bytes available to it.
    #[error("Range out of bounds: {length} bytes at offset {offset}, only {available} available")]
    OutOfBounds {
        /// Start of the requested range.
        offset: usize,
        /// Length of the requested range.
        length: usize,
        /// Bytes available to satisfy it.
        available: usize,
    },

    /// The encode destination is smaller than the chunk.
    #[error("Buffer too small: chunk needs {required} bytes, destination has {available}")]
    BufferTooSmall {
        /// Declared chunk size.
        required: usize,
        /// Capacity of the destination.
        available: usize,
    },

    /// The encoder produced a different number of bytes than the declared chunk size.
    #[error("Encoded {written} bytes but chunk declares {expected}")]
    EncodeLengthMismatch {
        /// Declared chunk size.
        expected: usize,
        /// Bytes actually written.
        written: usize,
    },
}

impl ResTableError {
    /// Create a malformed chunk error
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedChunk {
            offset,
            reason: reason.into(),
        }
    }

    /// Create an out of bounds error
    pub fn out_of_bounds(offset: usize, length: usize, available: usize) -> Self {
        Self::OutOfBounds {
            offset,
            length,
            available,
        }
    }
}

impl From<binrw::Error> for ResTableError {
    fn from(err: binrw::Error) -> Self {
        Self::BinrwError(format!("{err}"))
    }
}
