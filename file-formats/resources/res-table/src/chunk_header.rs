//! Generic resource chunk header
//!
//! Every chunk of a compiled resource table starts with the same 8-byte
//! header. It identifies the chunk kind and carries two sizes: the size of
//! the chunk's own header (fixed fields plus any embedded header blocks) and
//! the size of the whole chunk including its body.

use std::fmt;
use std::io::{Cursor, Write};

use binrw::io::NoSeek;
use binrw::{BinRead, BinWrite};

use crate::error::{ResTableError, Result};

/// Resource chunk header (8 bytes)
///
/// # Binary Layout
///
/// ```text
/// Offset | Size | Field       | Description
/// -------|------|-------------|------------------------------------------
/// 0x00   |  2   | chunk_type  | Chunk type tag, see [`ChunkType`]
/// 0x02   |  2   | header_size | Size of the chunk header, this header included
/// 0x04   |  4   | chunk_size  | Size of the whole chunk, header included
/// ```
///
/// # Size Field Semantics
///
/// Both sizes count from the first byte of this header. A well-formed chunk
/// satisfies `chunk_size >= header_size >= 8`, and the next sibling chunk
/// starts `chunk_size` bytes after this one.
///
/// ```rust
/// use res_table::{ChunkHeader, ChunkType};
///
/// let data = [0x01, 0x02, 0x18, 0x00, 0x24, 0x00, 0x00, 0x00];
/// let header = ChunkHeader::read_from(&data, 0).unwrap();
///
/// assert_eq!(header.kind(), ChunkType::TableType);
/// assert_eq!(header.header_size, 24);
/// assert_eq!(header.chunk_size, 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct ChunkHeader {
    /// Chunk type tag
    pub chunk_type: u16,
    /// Size of the chunk header in bytes
    pub header_size: u16,
    /// Size of the entire chunk in bytes
    pub chunk_size: u32,
}

impl ChunkHeader {
    /// Size of the generic header on the wire
    pub const SIZE: usize = 8;

    /// Create a header from its three fields
    pub fn new(chunk_type: ChunkType, header_size: u16, chunk_size: u32) -> Self {
        Self {
            chunk_type: chunk_type.into(),
            header_size,
            chunk_size,
        }
    }

    /// Read the header of the chunk starting at `offset` in `buf`
    ///
    /// The sizes are not checked; see [`ChunkHeader::validate`].
    pub fn read_from(buf: &[u8], offset: usize) -> Result<Self> {
        let bytes = offset
            .checked_add(Self::SIZE)
            .and_then(|end| buf.get(offset..end))
            .ok_or_else(|| ResTableError::out_of_bounds(offset, Self::SIZE, buf.len()))?;

        Ok(Self::read(&mut Cursor::new(bytes))?)
    }

    /// Read the header at `offset` and check its sizes
    pub fn read_validated(buf: &[u8], offset: usize) -> Result<Self> {
        let header = Self::read_from(buf, offset)?;
        header.validate(offset)?;
        Ok(header)
    }

    /// Write the header to `writer`
    pub fn write_header<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.write(&mut NoSeek::new(writer))?;
        Ok(())
    }

    /// Check `chunk_size >= header_size >= 8`
    pub fn validate(&self, offset: usize) -> Result<()> {
        if (self.header_size as usize) < Self::SIZE {
            return Err(ResTableError::malformed(
                offset,
                format!(
                    "header size {} is smaller than the {}-byte chunk header",
                    self.header_size,
                    Self::SIZE
                ),
            ));
        }
        if self.chunk_size < u32::from(self.header_size) {
            return Err(ResTableError::malformed(
                offset,
                format!(
                    "chunk size {} is smaller than header size {}",
                    self.chunk_size, self.header_size
                ),
            ));
        }
        Ok(())
    }

    /// Decoded chunk type
    pub fn kind(&self) -> ChunkType {
        ChunkType::from(self.chunk_type)
    }

    /// Check if the header carries the expected type tag
    pub fn is_chunk(&self, expected: ChunkType) -> bool {
        self.kind() == expected
    }

    /// Size of the chunk body following the header
    pub fn body_size(&self) -> usize {
        self.chunk_size as usize - self.header_size as usize
    }
}

/// Known resource chunk type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkType {
    /// Empty chunk
    Null,
    /// String pool
    StringPool,
    /// Resource table, the container root
    Table,
    /// Compiled XML document
    Xml,
    /// Package of types and keys
    TablePackage,
    /// Values of one type under one configuration
    TableType,
    /// Per-entry configuration change masks of one type
    TableTypeSpec,
    /// Shared library package id mapping
    TableLibrary,
    /// Any tag not listed above
    Unknown(u16),
}

impl ChunkType {
    /// Wire value of the tag
    pub const fn tag(self) -> u16 {
        match self {
            Self::Null => 0x0000,
            Self::StringPool => 0x0001,
            Self::Table => 0x0002,
            Self::Xml => 0x0003,
            Self::TablePackage => 0x0200,
            Self::TableType => 0x0201,
            Self::TableTypeSpec => 0x0202,
            Self::TableLibrary => 0x0203,
            Self::Unknown(tag) => tag,
        }
    }
}

impl From<u16> for ChunkType {
    fn from(tag: u16) -> Self {
        match tag {
            0x0000 => Self::Null,
            0x0001 => Self::StringPool,
            0x0002 => Self::Table,
            0x0003 => Self::Xml,
            0x0200 => Self::TablePackage,
            0x0201 => Self::TableType,
            0x0202 => Self::TableTypeSpec,
            0x0203 => Self::TableLibrary,
            other => Self::Unknown(other),
        }
    }
}

impl From<ChunkType> for u16 {
    fn from(kind: ChunkType) -> Self {
        kind.tag()
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::StringPool => write!(f, "STRING_POOL"),
            Self::Table => write!(f, "TABLE"),
            Self::Xml => write!(f, "XML"),
            Self::TablePackage => write!(f, "TABLE_PACKAGE"),
            Self::TableType => write!(f, "TABLE_TYPE"),
            Self::TableTypeSpec => write!(f, "TABLE_TYPE_SPEC"),
            Self::TableLibrary => write!(f, "TABLE_LIBRARY"),
            Self::Unknown(tag) => write!(f, "UNKNOWN(0x{tag:04X})"),
        }
    }
}
