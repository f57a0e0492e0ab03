//! Builder for canonical table-type chunks

use std::io::{Cursor, Write};

use binrw::BinWrite;

use crate::chunk_header::{ChunkHeader, ChunkType};
use crate::error::{ResTableError, Result};
use crate::table_type::{
    CONFIG_OFFSET, CONFIG_SIZE_FIELD, ENTRY_OFFSET_SIZE, NO_ENTRY, TableTypeFields,
};

/// Assembles a table-type chunk from owned parts
///
/// Entry records are packed in slot order with no gaps, and the entry data
/// directly follows the offset table.
///
/// # Example
///
/// ```rust
/// use res_table::{TableTypeBuilder, TableTypeChunk};
///
/// let bytes = TableTypeBuilder::new(4)
///     .config_payload(&[0x00, 0x00, 0x65, 0x6E])
///     .entry(vec![8, 0, 0, 0, 3, 0, 0, 0])
///     .missing_entry()
///     .build()
///     .unwrap();
///
/// let chunk = TableTypeChunk::parse(&bytes).unwrap();
/// assert_eq!(chunk.header_size(), 28);
/// assert_eq!(chunk.config_descriptor().payload().as_bytes(), &[0x00, 0x00, 0x65, 0x6E]);
/// assert_eq!(chunk.present_entries(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TableTypeBuilder {
    resource_type_id: u8,
    padding: u8,
    reserved: u16,
    config: Vec<u8>,
    entries: Vec<Option<Vec<u8>>>,
}

impl TableTypeBuilder {
    /// Start a chunk for the 0-based `resource_type_id` with an empty configuration
    pub fn new(resource_type_id: u8) -> Self {
        Self {
            resource_type_id,
            padding: 0,
            reserved: 0,
            config: (CONFIG_SIZE_FIELD as u32).to_le_bytes().to_vec(),
            entries: Vec::new(),
        }
    }

    /// Use a complete configuration descriptor, length prefix included
    pub fn config(mut self, descriptor: impl Into<Vec<u8>>) -> Self {
        self.config = descriptor.into();
        self
    }

    /// Use a configuration descriptor built from `payload` and a length prefix
    pub fn config_payload(mut self, payload: &[u8]) -> Self {
        let size = (CONFIG_SIZE_FIELD + payload.len()) as u32;
        let mut config = Vec::with_capacity(size as usize);
        config.extend_from_slice(&size.to_le_bytes());
        config.extend_from_slice(payload);
        self.config = config;
        self
    }

    /// Set the padding byte and reserved field
    pub fn reserved_fields(mut self, padding: u8, reserved: u16) -> Self {
        self.padding = padding;
        self.reserved = reserved;
        self
    }

    /// Append a slot holding `record`
    pub fn entry(mut self, record: impl Into<Vec<u8>>) -> Self {
        self.entries.push(Some(record.into()));
        self
    }

    /// Append a slot without a value
    pub fn missing_entry(mut self) -> Self {
        self.entries.push(None);
        self
    }

    /// Append a slot per item, `None` marking slots without a value
    pub fn entries<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = Option<Vec<u8>>>,
    {
        self.entries.extend(entries);
        self
    }

    /// Serialize the chunk
    pub fn build(&self) -> Result<Vec<u8>> {
        if self.resource_type_id == u8::MAX {
            return Err(ResTableError::malformed(
                0,
                "resource type id 255 has no 1-based wire encoding",
            ));
        }
        self.check_config()?;

        let header_size = u16::try_from(CONFIG_OFFSET + self.config.len()).map_err(|_| {
            ResTableError::malformed(
                0,
                format!("configuration of {} bytes overflows the header size", self.config.len()),
            )
        })?;

        let mut offsets = Vec::with_capacity(self.entries.len());
        let mut data = Vec::new();
        for record in &self.entries {
            match record {
                Some(record) => {
                    let offset = u32::try_from(data.len()).map_err(|_| {
                        ResTableError::malformed(0, "entry data exceeds the 32-bit offset range")
                    })?;
                    offsets.push(offset);
                    data.extend_from_slice(record);
                }
                None => offsets.push(NO_ENTRY),
            }
        }

        let entry_count = u32::try_from(offsets.len())
            .map_err(|_| ResTableError::malformed(0, "too many entries"))?;
        let entries_start = header_size as usize + offsets.len() * ENTRY_OFFSET_SIZE;
        let chunk_size = u32::try_from(entries_start + data.len())
            .map_err(|_| ResTableError::malformed(0, "chunk exceeds the 32-bit size range"))?;

        let mut out = Cursor::new(Vec::with_capacity(chunk_size as usize));
        ChunkHeader::new(ChunkType::TableType, header_size, chunk_size).write_header(&mut out)?;
        TableTypeFields {
            id: self.resource_type_id + 1,
            padding: self.padding,
            reserved: self.reserved,
            entry_count,
            entries_start: entries_start as u32,
        }
        .write(&mut out)?;
        out.write_all(&self.config)?;
        for offset in offsets {
            out.write_all(&offset.to_le_bytes())?;
        }
        out.write_all(&data)?;

        log::debug!(
            "Built table type chunk: type {}, {} entries, {} bytes",
            self.resource_type_id + 1,
            entry_count,
            chunk_size
        );

        Ok(out.into_inner())
    }

    fn check_config(&self) -> Result<()> {
        if self.config.len() < CONFIG_SIZE_FIELD {
            return Err(ResTableError::malformed(
                0,
                format!(
                    "configuration of {} bytes cannot hold its length field",
                    self.config.len()
                ),
            ));
        }
        let declared = u32::from_le_bytes([
            self.config[0],
            self.config[1],
            self.config[2],
            self.config[3],
        ]) as usize;
        if declared != self.config.len() {
            return Err(ResTableError::malformed(
                0,
                format!(
                    "configuration declares {declared} bytes but holds {}",
                    self.config.len()
                ),
            ));
        }
        Ok(())
    }
}
