//! Table-type chunk - resource values of one type under one configuration
//!
//! A table-type chunk holds, for a single resource type (`string`, `drawable`,
//! ...) and a single device configuration (locale, density, ...), an offset
//! table with one slot per resource entry and the packed entry records those
//! offsets point into.
//!
//! # Binary Layout
//!
//! ```text
//! Offset | Size      | Field         | Description
//! -------|-----------|---------------|------------------------------------------
//! 0x00   |  8        | header        | Generic chunk header, type 0x0201
//! 0x08   |  1        | id            | Resource type id, 1-based
//! 0x09   |  1        | padding       | Unused
//! 0x0A   |  2        | reserved      | Unused
//! 0x0C   |  4        | entry_count   | Number of slots in the offset table
//! 0x10   |  4        | entries_start | Offset of the entry data from chunk start
//! 0x14   |  N        | config        | Configuration descriptor, N = its own u32 prefix
//! hdr    |  4 * cnt  | offsets       | Entry offsets relative to entries_start
//! start  |  rest     | entry data    | Packed entry records
//! ```
//!
//! The header size declared in the generic header covers everything up to
//! and including the configuration descriptor, so `header_size == 20 + N`.
//! An offset of [`NO_ENTRY`] marks a slot without a value in this
//! configuration.
//!
//! Each entry record starts with an 8-byte [`EntryHeader`]. Values following
//! the header are not interpreted here.

use std::io::{Cursor, Write};

use binrw::{BinRead, BinWrite};
use bitflags::bitflags;

use crate::chunk_header::{ChunkHeader, ChunkType};
use crate::cursor::ChunkCursor;
use crate::error::{ResTableError, Result};
use crate::options::{DecodeOptions, EncodeOptions, EntriesStartPolicy, ReservedFields};
use crate::view::ByteRangeView;

/// Offset table sentinel for a slot without a value
pub const NO_ENTRY: u32 = 0xFFFF_FFFF;

const ID_SIZE: usize = 1;
const PADDING_SIZE: usize = 1;
const RESERVED_SIZE: usize = 2;
const ENTRY_COUNT_SIZE: usize = 4;
const ENTRIES_START_SIZE: usize = 4;

/// Size of the fixed table-type fields following the generic header
pub(crate) const FIELDS_SIZE: usize =
    ID_SIZE + PADDING_SIZE + RESERVED_SIZE + ENTRY_COUNT_SIZE + ENTRIES_START_SIZE;

/// Offset of the configuration descriptor from the chunk start
pub const CONFIG_OFFSET: usize = ChunkHeader::SIZE + FIELDS_SIZE;

/// Size of the length prefix every configuration descriptor starts with
pub const CONFIG_SIZE_FIELD: usize = 4;

/// Size of one offset table slot
pub const ENTRY_OFFSET_SIZE: usize = 4;

/// Fixed table-type fields, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub(crate) struct TableTypeFields {
    pub id: u8,
    pub padding: u8,
    pub reserved: u16,
    pub entry_count: u32,
    pub entries_start: u32,
}

/// Decoded table-type chunk
///
/// Only constructed by [`TableTypeChunk::decode`] and [`TableTypeChunk::parse`].
/// The three variable-length sections borrow the decoded buffer.
///
/// # Example
///
/// ```rust
/// use res_table::{TableTypeBuilder, TableTypeChunk};
///
/// let bytes = TableTypeBuilder::new(0)
///     .missing_entry()
///     .entry(vec![8, 0, 0, 0, 1, 0, 0, 0])
///     .build()
///     .unwrap();
///
/// let chunk = TableTypeChunk::parse(&bytes).unwrap();
/// assert_eq!(chunk.resource_type(), 1);
/// assert_eq!(chunk.entry_count(), 2);
/// assert_eq!(chunk.entry_offset(0).unwrap(), None);
/// assert_eq!(chunk.entry_offset(1).unwrap(), Some(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableTypeChunk<'a> {
    header: ChunkHeader,
    resource_type_id: u8,
    padding: u8,
    reserved: u16,
    entry_count: u32,
    entries_start: u32,
    config: ByteRangeView<'a>,
    entry_offsets: ByteRangeView<'a>,
    entry_data: ByteRangeView<'a>,
}

impl<'a> TableTypeChunk<'a> {
    /// Decode the chunk at the start of `buf` with default options
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        Self::decode_at(buf, 0, DecodeOptions::default())
    }

    /// Decode the chunk at the cursor position and move the cursor past it
    ///
    /// On failure the cursor does not move.
    pub fn decode(cursor: &mut ChunkCursor<'a>, options: DecodeOptions) -> Result<Self> {
        let start = ChunkCursor::position(cursor);
        let chunk = Self::decode_at(cursor.buffer(), start, options)?;
        cursor.advance_to(start + chunk.chunk_size());
        Ok(chunk)
    }

    /// Decode the chunk starting at `start` in `buf`
    pub fn decode_at(buf: &'a [u8], start: usize, options: DecodeOptions) -> Result<Self> {
        let header = ChunkHeader::read_from(buf, start)?;
        if !header.is_chunk(ChunkType::TableType) {
            return Err(ResTableError::WrongChunkType {
                expected: ChunkType::TableType.tag(),
                found: header.chunk_type,
                offset: start,
            });
        }
        header.validate(start)?;

        let header_size = header.header_size as usize;
        let chunk_size = header.chunk_size as usize;
        if header_size < CONFIG_OFFSET + CONFIG_SIZE_FIELD {
            return Err(ResTableError::malformed(
                start,
                format!(
                    "header size {header_size} cannot hold the {CONFIG_OFFSET}-byte table type header and a configuration"
                ),
            ));
        }

        // Everything below is sliced relative to the chunk, so no range can
        // escape it.
        let chunk = ByteRangeView::new(buf, start, chunk_size)?;

        let fields_bytes = chunk.slice(ChunkHeader::SIZE, FIELDS_SIZE)?;
        let fields = TableTypeFields::read(&mut Cursor::new(fields_bytes.as_bytes()))?;
        if fields.id == 0 {
            return Err(ResTableError::malformed(start, "resource type id 0 is invalid"));
        }

        let config_size = chunk.read_u32_le(CONFIG_OFFSET)? as usize;
        if config_size < CONFIG_SIZE_FIELD {
            return Err(ResTableError::malformed(
                start,
                format!("configuration size {config_size} is smaller than its own length field"),
            ));
        }
        if CONFIG_OFFSET.checked_add(config_size) != Some(header_size) {
            return Err(ResTableError::malformed(
                start,
                format!(
                    "header size {header_size} does not match configuration size {config_size} + {CONFIG_OFFSET}"
                ),
            ));
        }

        let offsets_size = (fields.entry_count as usize)
            .checked_mul(ENTRY_OFFSET_SIZE)
            .ok_or_else(|| {
                ResTableError::malformed(
                    start,
                    format!("entry count {} overflows", fields.entry_count),
                )
            })?;
        let entry_data_size = chunk_size
            .checked_sub(header_size)
            .and_then(|body| body.checked_sub(offsets_size))
            .ok_or_else(|| {
                ResTableError::malformed(
                    start,
                    format!(
                        "chunk size {chunk_size} is smaller than header size {header_size} plus {} entry offsets",
                        fields.entry_count
                    ),
                )
            })?;

        let canonical_start = header_size + offsets_size;
        let entries_start = fields.entries_start as usize;
        if entries_start != canonical_start {
            match options.entries_start {
                EntriesStartPolicy::Strict => {
                    return Err(ResTableError::malformed(
                        start,
                        format!(
                            "entries start {entries_start} does not follow the offset table ending at {canonical_start}"
                        ),
                    ));
                }
                EntriesStartPolicy::Bounded if entries_start < header_size => {
                    return Err(ResTableError::malformed(
                        start,
                        format!(
                            "entries start {entries_start} lies inside the {header_size}-byte header"
                        ),
                    ));
                }
                EntriesStartPolicy::Bounded => {
                    log::warn!(
                        "Table type chunk at offset {}: non-canonical entries start {} (expected {})",
                        start,
                        entries_start,
                        canonical_start
                    );
                }
            }
        }

        let config = chunk.slice(CONFIG_OFFSET, config_size)?;
        let entry_offsets = chunk.slice(header_size, offsets_size)?;
        let entry_data = chunk.slice(entries_start, entry_data_size)?;

        log::debug!(
            "Decoded table type chunk at offset {}: type {}, {} entries, {} config bytes, {} entry data bytes",
            start,
            fields.id,
            fields.entry_count,
            config_size,
            entry_data_size
        );
        log::trace!(
            "Table type sections: config {:?}, offsets {:?}, data {:?}",
            config,
            entry_offsets,
            entry_data
        );

        Ok(Self {
            header,
            resource_type_id: fields.id - 1,
            padding: fields.padding,
            reserved: fields.reserved,
            entry_count: fields.entry_count,
            entries_start: fields.entries_start,
            config,
            entry_offsets,
            entry_data,
        })
    }

    /// Encode the chunk into the start of `out`, returning the bytes written
    ///
    /// `entries_start` is always rewritten as `header_size + 4 * entry_count`,
    /// so the output is canonical even when the decoded input was not.
    pub fn encode_into(&self, out: &mut [u8], options: EncodeOptions) -> Result<usize> {
        let chunk_size = self.chunk_size();
        if out.len() < chunk_size {
            return Err(ResTableError::BufferTooSmall {
                required: chunk_size,
                available: out.len(),
            });
        }

        let (padding, reserved) = match options.reserved {
            ReservedFields::Preserve => (self.padding, self.reserved),
            ReservedFields::Zero => (0, 0),
        };
        let fields = TableTypeFields {
            id: self.resource_type(),
            padding,
            reserved,
            entry_count: self.entry_count,
            entries_start: self.canonical_entries_start(),
        };

        let mut writer = Cursor::new(out);
        self.header.write_header(&mut writer)?;
        fields.write(&mut writer)?;
        writer.write_all(self.config.as_bytes())?;
        writer.write_all(self.entry_offsets.as_bytes())?;
        writer.write_all(self.entry_data.as_bytes())?;

        let written = writer.position() as usize;
        debug_assert_eq!(written, chunk_size, "table type encoder length mismatch");
        if written != chunk_size {
            log::error!(
                "Table type encoder wrote {} bytes for a {}-byte chunk",
                written,
                chunk_size
            );
            return Err(ResTableError::EncodeLengthMismatch {
                expected: chunk_size,
                written,
            });
        }

        Ok(written)
    }

    /// Encode the chunk into a new buffer
    pub fn to_bytes(&self, options: EncodeOptions) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.chunk_size()];
        self.encode_into(&mut out, options)?;
        Ok(out)
    }

    /// Encode the chunk to `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W, options: EncodeOptions) -> Result<()> {
        writer.write_all(&self.to_bytes(options)?)?;
        Ok(())
    }

    /// Generic chunk header
    pub fn header(&self) -> ChunkHeader {
        self.header
    }

    /// Declared header size, configuration included
    pub fn header_size(&self) -> usize {
        self.header.header_size as usize
    }

    /// Declared size of the whole chunk
    pub fn chunk_size(&self) -> usize {
        self.header.chunk_size as usize
    }

    /// 0-based resource type id
    pub fn resource_type_id(&self) -> u8 {
        self.resource_type_id
    }

    /// 1-based resource type id as stored on the wire
    pub fn resource_type(&self) -> u8 {
        self.resource_type_id + 1
    }

    /// Padding byte following the id
    pub fn padding(&self) -> u8 {
        self.padding
    }

    /// Reserved field following the padding byte
    pub fn reserved(&self) -> u16 {
        self.reserved
    }

    /// Number of slots in the offset table
    pub fn entry_count(&self) -> u32 {
        self.entry_count
    }

    /// Entry data offset as declared on the wire
    pub fn entries_start(&self) -> u32 {
        self.entries_start
    }

    /// Entry data offset the encoder writes
    pub fn canonical_entries_start(&self) -> u32 {
        (self.header_size() + self.entry_offsets.len()) as u32
    }

    /// Check if the entry data directly follows the offset table
    pub fn is_canonical(&self) -> bool {
        self.entries_start == self.canonical_entries_start()
    }

    /// Raw configuration descriptor, length prefix included
    pub fn config(&self) -> ByteRangeView<'a> {
        self.config
    }

    /// Configuration descriptor wrapper
    pub fn config_descriptor(&self) -> ConfigDescriptor<'a> {
        ConfigDescriptor { bytes: self.config }
    }

    /// Raw offset table
    pub fn entry_offsets(&self) -> ByteRangeView<'a> {
        self.entry_offsets
    }

    /// Raw entry data region
    pub fn entry_data(&self) -> ByteRangeView<'a> {
        self.entry_data
    }

    /// Offset of slot `index` into the entry data, `None` when the slot is empty
    pub fn entry_offset(&self, index: u32) -> Result<Option<u32>> {
        if index >= self.entry_count {
            return Err(ResTableError::out_of_bounds(
                index as usize * ENTRY_OFFSET_SIZE,
                ENTRY_OFFSET_SIZE,
                self.entry_offsets.len(),
            ));
        }
        let offset = self
            .entry_offsets
            .read_u32_le(index as usize * ENTRY_OFFSET_SIZE)?;
        Ok((offset != NO_ENTRY).then_some(offset))
    }

    /// Iterate over all slots of the offset table
    pub fn entry_offsets_iter(&self) -> impl Iterator<Item = Option<u32>> + 'a {
        self.entry_offsets
            .as_bytes()
            .chunks_exact(ENTRY_OFFSET_SIZE)
            .map(|slot| {
                let offset = u32::from_le_bytes([slot[0], slot[1], slot[2], slot[3]]);
                (offset != NO_ENTRY).then_some(offset)
            })
    }

    /// Number of slots holding a value
    pub fn present_entries(&self) -> usize {
        self.entry_offsets_iter().flatten().count()
    }

    /// Resolve slot `index` to its entry record
    pub fn entry(&self, index: u32) -> Result<Option<TableEntry<'a>>> {
        let Some(offset) = self.entry_offset(index)? else {
            return Ok(None);
        };
        let offset = offset as usize;

        let header_bytes = self.entry_data.slice(offset, EntryHeader::SIZE)?;
        let header = EntryHeader::read(&mut Cursor::new(header_bytes.as_bytes()))?;
        if (header.size as usize) < EntryHeader::SIZE {
            return Err(ResTableError::malformed(
                self.entry_data.offset() + offset,
                format!(
                    "entry {index} declares size {} below the {}-byte entry header",
                    header.size,
                    EntryHeader::SIZE
                ),
            ));
        }

        let record = self.entry_data.slice(offset, header.size as usize)?;
        let value_start = offset + header.size as usize;
        let value = self
            .entry_data
            .slice(value_start, self.entry_data.len() - value_start)?;

        Ok(Some(TableEntry {
            index,
            offset: offset as u32,
            header,
            record,
            value,
        }))
    }
}

bitflags! {
    /// Entry record flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EntryFlags: u16 {
        /// Entry holds a map of values rather than a single value
        const COMPLEX = 0x0001;
        /// Entry is public and may be referenced by other packages
        const PUBLIC  = 0x0002;
        /// Entry may be overridden by a strong definition
        const WEAK    = 0x0004;
    }
}

/// Header of an entry record (8 bytes)
///
/// ```text
/// Offset | Size | Field | Description
/// -------|------|-------|------------------------------------------
/// 0x00   |  2   | size  | Size of the entry structure, this header included
/// 0x02   |  2   | flags | See [`EntryFlags`]
/// 0x04   |  4   | key   | Index into the package key string pool
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct EntryHeader {
    /// Size of the entry structure in bytes
    pub size: u16,
    /// Entry flags
    #[br(map = EntryFlags::from_bits_retain)]
    #[bw(map = |flags: &EntryFlags| flags.bits())]
    pub flags: EntryFlags,
    /// Key string index
    pub key: u32,
}

impl EntryHeader {
    /// Size of the entry header on the wire
    pub const SIZE: usize = 8;

    /// Check if the entry holds a map of values
    pub fn is_complex(&self) -> bool {
        self.flags.contains(EntryFlags::COMPLEX)
    }
}

/// An entry record resolved from the offset table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry<'a> {
    /// Slot index in the offset table
    pub index: u32,
    /// Offset of the record within the entry data
    pub offset: u32,
    /// Entry header
    pub header: EntryHeader,
    /// The entry structure, `header.size` bytes
    pub record: ByteRangeView<'a>,
    /// Remaining entry data after the structure, where the value starts
    pub value: ByteRangeView<'a>,
}

/// Configuration descriptor of a table-type chunk
///
/// The descriptor contents are opaque here; only its size matters to the
/// chunk layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigDescriptor<'a> {
    bytes: ByteRangeView<'a>,
}

impl<'a> ConfigDescriptor<'a> {
    /// Size the descriptor declares for itself
    pub fn declared_size(&self) -> u32 {
        // The decoder only accepts descriptors of at least CONFIG_SIZE_FIELD bytes
        self.bytes.read_u32_le(0).unwrap_or(0)
    }

    /// Descriptor bytes after the length prefix
    pub fn payload(&self) -> ByteRangeView<'a> {
        self.bytes
            .slice(CONFIG_SIZE_FIELD, self.bytes.len() - CONFIG_SIZE_FIELD)
            .unwrap_or(self.bytes)
    }

    /// Whole descriptor, length prefix included
    pub fn as_view(&self) -> ByteRangeView<'a> {
        self.bytes
    }
}
