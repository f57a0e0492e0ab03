//! Decode and encode options

/// How the declared `entries_start` of a table-type chunk is treated on decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntriesStartPolicy {
    /// Trust the declared offset but require the entry data it points at to
    /// start past the chunk header and end inside the chunk
    ///
    /// The entry data may overlap the offset table.
    #[default]
    Bounded,
    /// Require the declared offset to equal `header_size + 4 * entry_count`
    Strict,
}

/// What the encoder writes for the padding byte and reserved `u16`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReservedFields {
    /// Write back the values carried on the decoded chunk
    #[default]
    Preserve,
    /// Write zeros, as older producers do
    Zero,
}

/// Options for decoding chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Handling of the declared entry data offset
    pub entries_start: EntriesStartPolicy,
}

impl DecodeOptions {
    /// Options that reject any non-canonical `entries_start`
    pub fn strict() -> Self {
        Self {
            entries_start: EntriesStartPolicy::Strict,
        }
    }
}

/// Options for encoding chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    /// Handling of the padding and reserved fields
    pub reserved: ReservedFields,
}

impl EncodeOptions {
    /// Options that zero the padding and reserved fields
    pub fn zero_reserved() -> Self {
        Self {
            reserved: ReservedFields::Zero,
        }
    }
}
