//! Zero-copy views over a region of a caller-owned buffer
//!
//! Every variable-length section of a decoded chunk is exposed as a
//! [`ByteRangeView`] so that decoding never copies configuration, offset
//! table or entry bytes. The buffer has a single owner (the caller) and the
//! views only carry `(offset, len)` into it.

use std::fmt;

use crate::error::{ResTableError, Result};

/// Read-only `(offset, len)` window into a borrowed buffer.
///
/// # Binary Layout
///
/// ```text
/// base:  [....................................................]
///                 ^ offset
///                 [========= len =========]
/// ```
///
/// Equality compares the viewed bytes, not the positions, so a view into a
/// freshly encoded buffer equals the view it was encoded from.
#[derive(Clone, Copy)]
pub struct ByteRangeView<'a> {
    base: &'a [u8],
    offset: usize,
    len: usize,
}

impl<'a> ByteRangeView<'a> {
    /// Create a view over `base[offset..offset + len]`
    ///
    /// # Example
    ///
    /// ```rust
    /// use res_table::ByteRangeView;
    ///
    /// let data = [0u8, 1, 2, 3, 4, 5];
    /// let view = ByteRangeView::new(&data, 2, 3).unwrap();
    /// assert_eq!(view.as_bytes(), &[2, 3, 4]);
    ///
    /// assert!(ByteRangeView::new(&data, 4, 3).is_err());
    /// ```
    pub fn new(base: &'a [u8], offset: usize, len: usize) -> Result<Self> {
        match offset.checked_add(len) {
            Some(end) if end <= base.len() => Ok(Self { base, offset, len }),
            _ => Err(ResTableError::out_of_bounds(offset, len, base.len())),
        }
    }

    /// View covering the whole of `base`
    pub fn whole(base: &'a [u8]) -> Self {
        Self {
            base,
            offset: 0,
            len: base.len(),
        }
    }

    /// Narrow this view to `len` bytes starting `extra_offset` bytes into it
    ///
    /// The request is checked against this view, not against the underlying
    /// buffer, so a sub-view can never reach bytes its parent does not cover.
    pub fn slice(&self, extra_offset: usize, len: usize) -> Result<Self> {
        match extra_offset.checked_add(len) {
            Some(end) if end <= self.len => Ok(Self {
                base: self.base,
                offset: self.offset + extra_offset,
                len,
            }),
            _ => Err(ResTableError::out_of_bounds(extra_offset, len, self.len)),
        }
    }

    /// The whole underlying buffer
    pub(crate) fn base(&self) -> &'a [u8] {
        self.base
    }

    /// Offset of the view within the underlying buffer
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes covered
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the view covers no bytes
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The viewed bytes, borrowed for the lifetime of the underlying buffer
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.base[self.offset..self.offset + self.len]
    }

    /// Owned copy of the viewed bytes
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Read a little-endian `u16` at `at` bytes into the view
    pub fn read_u16_le(&self, at: usize) -> Result<u16> {
        let bytes = self.slice(at, 2)?.as_bytes();
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a little-endian `u32` at `at` bytes into the view
    pub fn read_u32_le(&self, at: usize) -> Result<u32> {
        let bytes = self.slice(at, 4)?.as_bytes();
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl PartialEq for ByteRangeView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for ByteRangeView<'_> {}

impl AsRef<[u8]> for ByteRangeView<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for ByteRangeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteRangeView")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish()
    }
}
