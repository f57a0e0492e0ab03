//! Codec for table-type chunks of compiled Android resource tables
//!
//! A compiled resource table (`resources.arsc`) is a tree of self-describing
//! chunks. This crate decodes and encodes the table-type chunk, which holds the
//! values of one resource type under one device configuration, and provides
//! the pieces needed around it: the generic chunk header, a cursor over
//! sibling chunks and a builder for canonical chunks.
//!
//! ## Features
//!
//! - Zero-copy decoding: configuration, offset table and entry data are
//!   [`ByteRangeView`]s into the caller's buffer
//! - Cross-checking of the redundant size fields (chunk size, header size,
//!   configuration size, entry count)
//! - Canonicalizing encoder that always places the entry data directly after
//!   the offset table
//! - Optional `res_table_tool` binary (with the `cli` feature)
//!
//! ## Example
//!
//! ```rust
//! use res_table::{EncodeOptions, TableTypeBuilder, TableTypeChunk};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = TableTypeBuilder::new(0)
//!     .missing_entry()
//!     .entry(vec![8, 0, 0, 0, 0, 0, 0, 0])
//!     .build()?;
//!
//! let chunk = TableTypeChunk::parse(&bytes)?;
//! assert_eq!(chunk.entry_count(), 2);
//! assert_eq!(chunk.present_entries(), 1);
//!
//! assert_eq!(chunk.to_bytes(EncodeOptions::default())?, bytes);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod builder;
mod chunk_header;
mod cursor;
mod error;
mod options;
mod table_type;
mod view;

pub use builder::TableTypeBuilder;
pub use chunk_header::{ChunkHeader, ChunkType};
pub use cursor::{ChunkCursor, RawChunk};
pub use error::{ResTableError, Result};
pub use options::{DecodeOptions, EncodeOptions, EntriesStartPolicy, ReservedFields};
pub use table_type::{
    CONFIG_OFFSET, CONFIG_SIZE_FIELD, ConfigDescriptor, ENTRY_OFFSET_SIZE, EntryFlags,
    EntryHeader, NO_ENTRY, TableEntry, TableTypeChunk,
};
pub use view::ByteRangeView;
