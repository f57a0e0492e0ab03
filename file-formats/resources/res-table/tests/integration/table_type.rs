//! Table-type chunk decoding and encoding

use pretty_assertions::assert_eq;
use res_table::{
    ChunkType, DecodeOptions, EncodeOptions, EntryFlags, NO_ENTRY, ResTableError,
    TableTypeBuilder, TableTypeChunk,
};
use test_case::test_case;

use super::{raw_chunk, reference_chunk};

#[test]
fn test_reference_chunk_fields() {
    let data = reference_chunk();
    assert_eq!(data.len(), 36);

    let chunk = TableTypeChunk::parse(&data).unwrap();

    assert_eq!(chunk.header().kind(), ChunkType::TableType);
    assert_eq!(chunk.header_size(), 24);
    assert_eq!(chunk.chunk_size(), 36);
    assert_eq!(chunk.resource_type_id(), 0);
    assert_eq!(chunk.entry_count(), 2);
    assert_eq!(chunk.entries_start(), 32);
    assert_eq!(chunk.config().as_bytes(), &[0x04, 0x00, 0x00, 0x00]);
    assert_eq!(
        chunk.entry_offsets().as_bytes(),
        &[0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00]
    );
    assert_eq!(chunk.entry_data().as_bytes(), &[0x11, 0x22, 0x33, 0x44]);
}

#[test]
fn test_reference_chunk_reencodes_exactly() {
    let data = reference_chunk();
    let chunk = TableTypeChunk::parse(&data).unwrap();

    assert_eq!(chunk.to_bytes(EncodeOptions::default()).unwrap(), data);
    assert_eq!(chunk.to_bytes(EncodeOptions::zero_reserved()).unwrap(), data);
}

#[test]
fn test_views_borrow_source_buffer() {
    let data = reference_chunk();
    let chunk = TableTypeChunk::parse(&data).unwrap();

    // Same memory, not a copy
    assert!(std::ptr::eq(chunk.config().as_bytes().as_ptr(), &data[20]));
    assert!(std::ptr::eq(chunk.entry_offsets().as_bytes().as_ptr(), &data[24]));
    assert!(std::ptr::eq(chunk.entry_data().as_bytes().as_ptr(), &data[32]));
}

#[test]
fn test_id_boundary() {
    let data = reference_chunk();
    assert_eq!(data[8], 0x01);
    assert_eq!(TableTypeChunk::parse(&data).unwrap().resource_type_id(), 0);

    let built = TableTypeBuilder::new(0).build().unwrap();
    assert_eq!(built[8], 0x01);
}

#[test_case(&[(2, 0x1C)] ; "header size disagrees with configuration size")]
#[test_case(&[(20, 0x08)] ; "configuration size disagrees with header size")]
#[test_case(&[(20, 0x02)] ; "configuration shorter than its length field")]
#[test_case(&[(12, 0x05)] ; "offset table runs past chunk end")]
#[test_case(&[(12, 0xFF), (13, 0xFF), (14, 0xFF), (15, 0xFF)] ; "huge entry count")]
#[test_case(&[(8, 0x00)] ; "resource type id zero")]
#[test_case(&[(2, 0x10)] ; "header too small for table type fields")]
#[test_case(&[(2, 0x04)] ; "header smaller than chunk header")]
#[test_case(&[(4, 0x10)] ; "chunk smaller than header")]
fn test_rejects_malformed(patches: &[(usize, u8)]) {
    let mut data = reference_chunk();
    for &(index, value) in patches {
        data[index] = value;
    }

    let result = TableTypeChunk::parse(&data);
    assert!(
        matches!(result, Err(ResTableError::MalformedChunk { offset: 0, .. })),
        "unexpected result: {result:?}"
    );
}

#[test]
fn test_rejects_negative_entry_data_size() {
    // 24-byte header + 3 offsets = 36 > 32
    let data = raw_chunk(
        1,
        24,
        32,
        3,
        36,
        &[0x04, 0x00, 0x00, 0x00],
        &[0u8; 8],
    );
    assert!(matches!(
        TableTypeChunk::parse(&data),
        Err(ResTableError::MalformedChunk { .. })
    ));
}

#[test]
fn test_rejects_wrong_chunk_type() {
    let mut data = reference_chunk();
    data[0..2].copy_from_slice(&ChunkType::TableTypeSpec.tag().to_le_bytes());

    assert!(matches!(
        TableTypeChunk::parse(&data),
        Err(ResTableError::WrongChunkType {
            expected: 0x0201,
            found: 0x0202,
            ..
        })
    ));
}

#[test]
fn test_rejects_truncated_chunk() {
    let data = reference_chunk();
    for len in [0, 7, 8, 20, 35] {
        let result = TableTypeChunk::parse(&data[..len]);
        assert!(
            matches!(result, Err(ResTableError::OutOfBounds { .. })),
            "length {len}: {result:?}"
        );
    }
}

#[test]
fn test_non_canonical_entries_start_is_normalized() {
    // entries_start points 4 bytes early, overlapping the last offset slot
    let mut data = reference_chunk();
    data[16] = 28;

    let chunk = TableTypeChunk::parse(&data).unwrap();
    assert_eq!(chunk.entries_start(), 28);
    assert!(!chunk.is_canonical());
    assert_eq!(chunk.entry_data().as_bytes(), &[0x00, 0x00, 0x00, 0x00]);

    let encoded = chunk.to_bytes(EncodeOptions::default()).unwrap();
    let normalized = TableTypeChunk::parse(&encoded).unwrap();
    assert_eq!(normalized.entries_start(), 32);
    assert!(normalized.is_canonical());
    assert_eq!(normalized.entry_data(), chunk.entry_data());
}

#[test]
fn test_strict_policy_rejects_non_canonical_entries_start() {
    let mut data = reference_chunk();
    data[16] = 28;

    assert!(matches!(
        TableTypeChunk::decode_at(&data, 0, DecodeOptions::strict()),
        Err(ResTableError::MalformedChunk { .. })
    ));
    assert!(TableTypeChunk::decode_at(&reference_chunk(), 0, DecodeOptions::strict()).is_ok());
}

#[test]
fn test_entries_start_past_chunk_end_is_out_of_bounds() {
    let mut data = reference_chunk();
    data[16] = 33;

    assert!(matches!(
        TableTypeChunk::parse(&data),
        Err(ResTableError::OutOfBounds { .. })
    ));

    // Beyond the chunk even though the buffer continues
    data.extend_from_slice(&[0u8; 16]);
    assert!(matches!(
        TableTypeChunk::parse(&data),
        Err(ResTableError::OutOfBounds { .. })
    ));
}

#[test_case(0 ; "on the chunk header")]
#[test_case(8 ; "on the fixed fields")]
#[test_case(20 ; "on the configuration")]
fn test_entries_start_inside_header_is_rejected(entries_start: u8) {
    let mut data = reference_chunk();
    data[16] = entries_start;

    let result = TableTypeChunk::parse(&data);
    assert!(
        matches!(result, Err(ResTableError::MalformedChunk { offset: 0, .. })),
        "unexpected result: {result:?}"
    );
}

#[test]
fn test_entries_start_at_offset_table_is_accepted() {
    let mut data = reference_chunk();
    data[16] = 24;

    let chunk = TableTypeChunk::parse(&data).unwrap();
    assert_eq!(chunk.entry_data().offset(), 24);
    assert_eq!(chunk.entry_data().as_bytes(), &[0xFF, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn test_decode_at_offset() {
    let mut data = vec![0xEEu8; 12];
    data.extend(reference_chunk());

    let chunk = TableTypeChunk::decode_at(&data, 12, DecodeOptions::default()).unwrap();
    assert_eq!(chunk.config().offset(), 32);
    assert_eq!(chunk.entry_data().as_bytes(), &[0x11, 0x22, 0x33, 0x44]);
    assert_eq!(chunk.to_bytes(EncodeOptions::default()).unwrap(), reference_chunk());
}

#[test]
fn test_entry_records() {
    let simple = vec![
        0x08, 0x00, 0x02, 0x00, 0x05, 0x00, 0x00, 0x00, // entry: size 8, PUBLIC, key 5
        0x08, 0x00, 0x00, 0x10, 0x2A, 0x00, 0x00, 0x00, // value: int 42
    ];
    let complex = vec![
        0x10, 0x00, 0x01, 0x00, 0x06, 0x00, 0x00, 0x00, // entry: size 16, COMPLEX, key 6
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // parent 0, 0 map entries
    ];
    let bytes = TableTypeBuilder::new(2)
        .config_payload(&[0u8; 60])
        .entry(simple)
        .missing_entry()
        .entry(complex)
        .build()
        .unwrap();
    let chunk = TableTypeChunk::parse(&bytes).unwrap();
    assert_eq!(chunk.header_size(), 84);

    let first = chunk.entry(0).unwrap().unwrap();
    assert_eq!(first.offset, 0);
    assert_eq!(first.header.size, 8);
    assert_eq!(first.header.flags, EntryFlags::PUBLIC);
    assert_eq!(first.header.key, 5);
    assert!(!first.header.is_complex());
    assert_eq!(first.record.len(), 8);
    assert_eq!(&first.value.as_bytes()[..8], &[0x08, 0x00, 0x00, 0x10, 0x2A, 0x00, 0x00, 0x00]);

    assert_eq!(chunk.entry(1).unwrap(), None);
    assert_eq!(chunk.entry_offset(1).unwrap(), None);

    let third = chunk.entry(2).unwrap().unwrap();
    assert_eq!(third.offset, 16);
    assert!(third.header.is_complex());
    assert_eq!(third.record.len(), 16);
    assert!(third.value.is_empty());

    assert!(matches!(chunk.entry(3), Err(ResTableError::OutOfBounds { .. })));
}

#[test]
fn test_entry_offset_outside_entry_data() {
    let data = raw_chunk(
        1,
        24,
        36,
        2,
        32,
        &[0x04, 0x00, 0x00, 0x00],
        &[
            0x00, 0x00, 0x00, 0x00, // slot 0: offset 0, record too short for a header
            0x40, 0x00, 0x00, 0x00, // slot 1: offset 64, outside the entry data
            0x08, 0x00, 0x00, 0x00,
        ],
    );
    let chunk = TableTypeChunk::parse(&data).unwrap();

    assert!(matches!(chunk.entry(0), Err(ResTableError::OutOfBounds { .. })));
    assert!(matches!(chunk.entry(1), Err(ResTableError::OutOfBounds { .. })));
}

#[test]
fn test_entry_size_below_header() {
    let bytes = TableTypeBuilder::new(0)
        .entry(vec![0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00])
        .build()
        .unwrap();
    let chunk = TableTypeChunk::parse(&bytes).unwrap();

    assert!(matches!(
        chunk.entry(0),
        Err(ResTableError::MalformedChunk { .. })
    ));
}

#[test]
fn test_all_slots_missing() {
    let bytes = TableTypeBuilder::new(7)
        .entries(std::iter::repeat_n(None, 5))
        .build()
        .unwrap();
    let chunk = TableTypeChunk::parse(&bytes).unwrap();

    assert_eq!(chunk.entry_count(), 5);
    assert_eq!(chunk.present_entries(), 0);
    assert!(chunk.entry_data().is_empty());
    assert!(
        chunk
            .entry_offsets()
            .as_bytes()
            .chunks_exact(4)
            .all(|slot| slot == NO_ENTRY.to_le_bytes())
    );
}
