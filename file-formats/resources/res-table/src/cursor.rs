//! Sequential access to sibling chunks
//!
//! Chunks inside a container follow each other back to back, each one
//! starting `chunk_size` bytes after the previous. A corrupt chunk makes the
//! position of every later sibling meaningless, so the cursor stops for good
//! at the first error.

use crate::chunk_header::ChunkHeader;
use crate::error::Result;
use crate::options::DecodeOptions;
use crate::table_type::TableTypeChunk;
use crate::view::ByteRangeView;

/// A chunk located by the cursor but not decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChunk<'a> {
    /// Offset of the chunk in the cursor buffer
    pub offset: usize,
    /// Validated generic header
    pub header: ChunkHeader,
    /// The whole chunk, header included
    pub bytes: ByteRangeView<'a>,
}

impl<'a> RawChunk<'a> {
    /// Decode this chunk as a table-type chunk
    ///
    /// Offsets in errors and views stay relative to the cursor buffer.
    pub fn decode_table_type(&self, options: DecodeOptions) -> Result<TableTypeChunk<'a>> {
        TableTypeChunk::decode_at(self.bytes.base(), self.offset, options)
    }

    /// Body of the chunk following its header
    pub fn body(&self) -> ByteRangeView<'a> {
        let header_size = self.header.header_size as usize;
        self.bytes
            .slice(header_size, self.bytes.len() - header_size)
            .unwrap_or(self.bytes)
    }
}

/// Cursor over a buffer of consecutive chunks
///
/// # Example
///
/// ```rust
/// use res_table::{ChunkCursor, DecodeOptions, TableTypeBuilder};
///
/// let mut data = TableTypeBuilder::new(0).entry(vec![8, 0, 0, 0, 0, 0, 0, 0]).build().unwrap();
/// data.extend(TableTypeBuilder::new(1).missing_entry().build().unwrap());
///
/// let mut cursor = ChunkCursor::new(&data);
/// let first = cursor.next_table_type(DecodeOptions::default()).unwrap().unwrap();
/// let second = cursor.next_table_type(DecodeOptions::default()).unwrap().unwrap();
///
/// assert_eq!(first.resource_type_id(), 0);
/// assert_eq!(second.resource_type_id(), 1);
/// assert!(cursor.is_at_end());
/// ```
#[derive(Debug, Clone)]
pub struct ChunkCursor<'a> {
    buf: &'a [u8],
    position: usize,
    poisoned: bool,
}

impl<'a> ChunkCursor<'a> {
    /// Cursor at the start of `buf`
    pub fn new(buf: &'a [u8]) -> Self {
        Self::at(buf, 0)
    }

    /// Cursor at `position` in `buf`
    pub fn at(buf: &'a [u8], position: usize) -> Self {
        Self {
            buf,
            position,
            poisoned: false,
        }
    }

    /// Underlying buffer
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    /// Absolute position of the next chunk
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.position)
    }

    /// Check if no bytes are left
    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Check if an earlier error stopped the cursor
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub(crate) fn advance_to(&mut self, position: usize) {
        self.position = position;
    }

    /// Read the header of the next chunk without moving
    pub fn peek_header(&self) -> Result<ChunkHeader> {
        ChunkHeader::read_validated(self.buf, self.position)
    }

    /// Move past the next chunk without decoding it
    pub fn skip_chunk(&mut self) -> Result<ChunkHeader> {
        let raw = self.locate().inspect_err(|_| self.poisoned = true)?;
        Ok(raw.header)
    }

    /// Locate the next chunk of any type
    pub fn next_chunk(&mut self) -> Option<Result<RawChunk<'a>>> {
        if self.poisoned || self.is_at_end() {
            return None;
        }
        Some(self.locate().inspect_err(|_| self.poisoned = true))
    }

    /// Decode the next chunk, which must be a table-type chunk
    pub fn next_table_type(
        &mut self,
        options: DecodeOptions,
    ) -> Option<Result<TableTypeChunk<'a>>> {
        if self.poisoned || self.is_at_end() {
            return None;
        }
        Some(TableTypeChunk::decode(self, options).inspect_err(|err| {
            log::debug!("Chunk cursor stopped at offset {}: {}", self.position, err);
            self.poisoned = true;
        }))
    }

    fn locate(&mut self) -> Result<RawChunk<'a>> {
        let offset = self.position;
        let header = self.peek_header()?;
        let bytes = ByteRangeView::new(self.buf, offset, header.chunk_size as usize)?;
        log::trace!(
            "Located {} chunk at offset {} ({} bytes)",
            header.kind(),
            offset,
            header.chunk_size
        );
        self.position = offset + bytes.len();
        Ok(RawChunk {
            offset,
            header,
            bytes,
        })
    }
}

impl<'a> Iterator for ChunkCursor<'a> {
    type Item = Result<RawChunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk()
    }
}
