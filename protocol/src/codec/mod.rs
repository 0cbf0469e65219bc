//! # Record Codec
//!
//! Deterministic, schema-driven binary serialization. The wire format is the
//! protobuf encoding the ledger itself uses, so every byte here must match
//! what the node produces for the same logical value:
//!
//! ```text
//! key      = varint(field_number << 3 | wire_type)
//! uint*    = varint                         (wire type 0)
//! sint*    = zig-zag varint                 (wire type 0)
//! boolean  = varint 0 / 1                   (wire type 0)
//! bytes    = varint(len) || bytes           (wire type 2)
//! string   = varint(len) || utf-8           (wire type 2)
//! object   = varint(len) || nested record   (wire type 2)
//! uint[]   = key || varint(len) || packed varints
//! bytes[]  = (key || varint(len) || bytes)*  one key per element
//! object[] = (key || varint(len) || record)* one key per element
//! ```
//!
//! The round-trip law `decode(s, encode(s, v)) == v` holds for every value
//! conforming to `s`.

pub mod decoder;
pub mod encoder;
pub mod schema;
pub mod value;
pub mod varint;

use thiserror::Error;

pub use decoder::decode;
pub use encoder::encode;
pub use schema::{ArrayItems, DataType, Field, FieldKind, Schema};
pub use value::{parse_scalar, Record, Value};

pub(crate) const WIRE_VARINT: u8 = 0;
pub(crate) const WIRE_LENGTH_DELIMITED: u8 = 2;

/// Errors raised while converting, encoding or decoding schema-typed values.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("field {0} is not part of the schema")]
    UnknownField(String),

    #[error("field number {0} is not part of the schema")]
    UnknownFieldNumber(u32),

    #[error("field {0} appears more than once")]
    DuplicateField(String),

    #[error("field {field}: expected {expected}")]
    TypeMismatch { field: String, expected: &'static str },

    #[error("field {field}: Cannot convert {value} to an integer")]
    InvalidNumber { field: String, value: String },

    #[error("field {field}: {value} is not valid hex")]
    InvalidHex { field: String, value: String },

    #[error("field {field}: {value} is not a boolean")]
    InvalidBoolean { field: String, value: String },

    #[error("field {field}: value out of range for {data_type}")]
    OutOfRange { field: String, data_type: DataType },

    #[error("field {field}: length {actual} outside bounds (min {min:?}, max {max:?})")]
    InvalidLength {
        field: String,
        min: Option<usize>,
        max: Option<usize>,
        actual: usize,
    },

    #[error("field {field}: {actual} items outside bounds (min {min:?}, max {max:?})")]
    InvalidItemCount {
        field: String,
        min: Option<usize>,
        max: Option<usize>,
        actual: usize,
    },

    #[error("field {field}: expected {expected} values, got {actual}")]
    ArityMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("field {field}: wire type {actual}, expected {expected}")]
    WireTypeMismatch { field: String, expected: u8, actual: u8 },

    #[error("field {0} is not valid utf-8")]
    InvalidUtf8(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("varint overflows 64 bits")]
    VarintOverflow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn transfer_schema() -> Schema {
        Schema::new(
            "test/transfer",
            vec![
                Field::scalar("amount", 1, DataType::Uint64),
                Field::scalar("recipientAddress", 2, DataType::Bytes).fixed_length(20),
                Field::scalar("data", 3, DataType::String),
            ],
        )
        .unwrap()
    }

    fn vote_schema() -> Schema {
        let vote = Schema::new(
            "test/vote.votes",
            vec![
                Field::scalar("delegateAddress", 1, DataType::Bytes).fixed_length(20),
                Field::scalar("amount", 2, DataType::Sint64),
            ],
        )
        .unwrap();
        Schema::new("test/vote", vec![Field::object_array("votes", 1, vote)]).unwrap()
    }

    fn record(pairs: Vec<(&str, Value)>) -> Value {
        Value::Object(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    fn address() -> Vec<u8> {
        hex::decode("ab0041a7d3f7b2c290b5b834d46bdc7b7eb85815").unwrap()
    }

    #[test]
    fn transfer_asset_matches_ledger_bytes() {
        let value = record(vec![
            ("amount", Value::Uint(100)),
            ("recipientAddress", Value::Bytes(address())),
            ("data", Value::String("send token".into())),
        ]);
        let bytes = encode(&transfer_schema(), &value).unwrap();
        assert_eq!(
            hex::encode(&bytes),
            "08641214ab0041a7d3f7b2c290b5b834d46bdc7b7eb858151a0a73656e6420746f6b656e"
        );
        assert_eq!(decode(&transfer_schema(), &bytes).unwrap(), value);
    }

    #[test]
    fn vote_asset_matches_ledger_bytes() {
        let value = record(vec![(
            "votes",
            Value::Array(vec![
                record(vec![
                    ("delegateAddress", Value::Bytes(address())),
                    ("amount", Value::Sint(100)),
                ]),
                record(vec![
                    ("delegateAddress", Value::Bytes(address())),
                    ("amount", Value::Sint(-50)),
                ]),
            ]),
        )]);
        let bytes = encode(&vote_schema(), &value).unwrap();
        assert_eq!(
            hex::encode(&bytes),
            "0a190a14ab0041a7d3f7b2c290b5b834d46bdc7b7eb8581510c8010a180a14ab0041a7d3f7b2c290b5b834d46bdc7b7eb858151063"
        );
        assert_eq!(decode(&vote_schema(), &bytes).unwrap(), value);
    }

    #[test]
    fn packed_and_repeated_arrays_round_trip() {
        let schema = Schema::new(
            "test/arrays",
            vec![
                Field::array("heights", 1, DataType::Uint32),
                Field::array("keys", 2, DataType::Bytes),
                Field::array("flags", 3, DataType::Boolean),
                Field::array("names", 4, DataType::String),
            ],
        )
        .unwrap();
        let value = record(vec![
            ("heights", Value::Array(vec![Value::Uint(1), Value::Uint(300), Value::Uint(1)])),
            ("keys", Value::Array(vec![Value::Bytes(vec![0xaa]), Value::Bytes(vec![])])),
            ("flags", Value::Array(vec![])),
            ("names", Value::Array(vec![Value::String("a".into())])),
        ]);
        let bytes = encode(&schema, &value).unwrap();
        // heights packed: key 0x0a, len 4, 01 ac02 01
        assert_eq!(&bytes[..6], &[0x0a, 0x04, 0x01, 0xac, 0x02, 0x01]);
        assert_eq!(decode(&schema, &bytes).unwrap(), value);
    }

    #[test]
    fn array_bounds_apply_on_decode() {
        let bounded = Schema::new(
            "test/bounded",
            vec![Field::array("keys", 1, DataType::Bytes)
                .fixed_item_length(2)
                .item_count(Some(1), Some(1))],
        )
        .unwrap();
        let free = Schema::new("test/free", vec![Field::array("keys", 1, DataType::Bytes)]).unwrap();
        let encode_keys = |keys: Vec<Vec<u8>>| {
            let items = keys.into_iter().map(Value::Bytes).collect();
            encode(&free, &record(vec![("keys", Value::Array(items))])).unwrap()
        };

        assert!(decode(&bounded, &encode_keys(vec![vec![1, 2]])).is_ok());
        assert!(matches!(
            decode(&bounded, &encode_keys(vec![vec![1]])),
            Err(CodecError::InvalidLength { actual: 1, .. })
        ));
        assert!(matches!(
            decode(&bounded, &encode_keys(vec![vec![1, 2], vec![3, 4]])),
            Err(CodecError::InvalidItemCount { actual: 2, .. })
        ));
        assert!(matches!(
            decode(&bounded, &[]),
            Err(CodecError::InvalidItemCount { actual: 0, .. })
        ));
    }

    #[test]
    fn nested_object_round_trips() {
        let inner = Schema::new("test/inner", vec![Field::scalar("nonce", 1, DataType::Uint64)]).unwrap();
        let schema = Schema::new(
            "test/outer",
            vec![
                Field::scalar("address", 1, DataType::Bytes),
                Field::object("sequence", 2, inner),
                Field::scalar("banned", 3, DataType::Boolean),
            ],
        )
        .unwrap();
        let value = record(vec![
            ("address", Value::Bytes(address())),
            ("sequence", record(vec![("nonce", Value::Uint(0))])),
            ("banned", Value::Boolean(false)),
        ]);
        let bytes = encode(&schema, &value).unwrap();
        assert_eq!(decode(&schema, &bytes).unwrap(), value);
    }

    #[test]
    fn encoding_is_deterministic() {
        let value = record(vec![
            ("amount", Value::Uint(7)),
            ("recipientAddress", Value::Bytes(address())),
            ("data", Value::String(String::new())),
        ]);
        let first = encode(&transfer_schema(), &value).unwrap();
        for _ in 0..10 {
            assert_eq!(encode(&transfer_schema(), &value).unwrap(), first);
        }
    }

    #[test]
    fn zero_scalars_are_still_written() {
        let schema = Schema::new("test/zero", vec![Field::scalar("n", 1, DataType::Uint64)]).unwrap();
        let bytes = encode(&schema, &record(vec![("n", Value::Uint(0))])).unwrap();
        assert_eq!(bytes, [0x08, 0x00]);
    }

    #[test]
    fn type_mismatch_is_reported() {
        let value = record(vec![
            ("amount", Value::String("100".into())),
            ("recipientAddress", Value::Bytes(address())),
            ("data", Value::String(String::new())),
        ]);
        assert!(matches!(
            encode(&transfer_schema(), &value),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn decode_rejects_unknown_field_numbers() {
        assert!(matches!(
            decode(&transfer_schema(), &[0x20, 0x01]),
            Err(CodecError::UnknownFieldNumber(4))
        ));
    }

    #[test]
    fn decode_rejects_truncated_input() {
        let value = record(vec![
            ("amount", Value::Uint(1)),
            ("recipientAddress", Value::Bytes(address())),
            ("data", Value::String("abc".into())),
        ]);
        let bytes = encode(&transfer_schema(), &value).unwrap();
        assert!(matches!(
            decode(&transfer_schema(), &bytes[..bytes.len() - 1]),
            Err(CodecError::UnexpectedEof)
        ));
    }

    #[test]
    fn decode_rejects_missing_scalar() {
        assert!(matches!(
            decode(&transfer_schema(), &[0x08, 0x01]),
            Err(CodecError::MissingField(ref f)) if f == "recipientAddress"
        ));
    }

    #[test]
    fn decode_rejects_wrong_wire_type() {
        assert!(matches!(
            decode(&transfer_schema(), &[0x0a, 0x00]),
            Err(CodecError::WireTypeMismatch { .. })
        ));
    }
}
