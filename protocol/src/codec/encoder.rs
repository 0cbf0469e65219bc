//! Deterministic record encoder.
//!
//! Fields are emitted in ascending field-number order. Scalars are always
//! written, zero values included; empty arrays are omitted entirely.

use super::schema::{DataType, Field, FieldKind, Schema};
use super::value::{check_range, check_scalar_length, Value};
use super::varint::write_varint;
use super::{CodecError, WIRE_LENGTH_DELIMITED, WIRE_VARINT};

/// Encodes `value` according to `schema`.
pub fn encode(schema: &Schema, value: &Value) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(128);
    encode_object(schema, value, &mut buf)?;
    Ok(buf)
}

fn encode_object(schema: &Schema, value: &Value, buf: &mut Vec<u8>) -> Result<(), CodecError> {
    let record = value.as_object().ok_or_else(|| CodecError::TypeMismatch {
        field: schema.id.clone(),
        expected: "object",
    })?;
    if let Some(unknown) = record.keys().find(|key| schema.field(key).is_none()) {
        return Err(CodecError::UnknownField(unknown.clone()));
    }

    for field in schema.fields() {
        let value = record
            .get(&field.name)
            .ok_or_else(|| CodecError::MissingField(field.name.clone()))?;
        encode_field(field, value, buf)?;
    }
    Ok(())
}

fn encode_field(field: &Field, value: &Value, buf: &mut Vec<u8>) -> Result<(), CodecError> {
    match &field.kind {
        FieldKind::Scalar(dt) => {
            let wire_type = if dt.is_varint() { WIRE_VARINT } else { WIRE_LENGTH_DELIMITED };
            write_key(buf, field.field_number, wire_type);
            encode_scalar(field, *dt, value, buf)
        }
        FieldKind::Array(array) => {
            let dt = &array.data_type;
            let items = array_items(field, value)?;
            field.check_item_count(items.len())?;
            if items.is_empty() {
                return Ok(());
            }
            if dt.is_varint() {
                let mut packed = Vec::with_capacity(items.len() * 2);
                for item in items {
                    encode_scalar(field, *dt, item, &mut packed)?;
                }
                write_key(buf, field.field_number, WIRE_LENGTH_DELIMITED);
                write_length_delimited(buf, &packed);
            } else {
                for item in items {
                    write_key(buf, field.field_number, WIRE_LENGTH_DELIMITED);
                    encode_scalar(field, *dt, item, buf)?;
                }
            }
            Ok(())
        }
        FieldKind::Object(schema) => {
            let nested = encode(schema, value)?;
            write_key(buf, field.field_number, WIRE_LENGTH_DELIMITED);
            write_length_delimited(buf, &nested);
            Ok(())
        }
        FieldKind::ObjectArray(schema) => {
            for item in array_items(field, value)? {
                let nested = encode(schema, item)?;
                write_key(buf, field.field_number, WIRE_LENGTH_DELIMITED);
                write_length_delimited(buf, &nested);
            }
            Ok(())
        }
    }
}

fn encode_scalar(
    field: &Field,
    data_type: DataType,
    value: &Value,
    buf: &mut Vec<u8>,
) -> Result<(), CodecError> {
    match (data_type, value) {
        (DataType::Uint32 | DataType::Uint64, Value::Uint(n)) => {
            check_range(&field.name, data_type, value.clone())?;
            write_varint(buf, *n);
        }
        (DataType::Sint32 | DataType::Sint64, Value::Sint(n)) => {
            check_range(&field.name, data_type, value.clone())?;
            write_varint(buf, *n);
        }
        (DataType::Boolean, Value::Boolean(b)) => write_varint(buf, u64::from(*b)),
        (DataType::Bytes, Value::Bytes(bytes)) => {
            check_scalar_length(field, value)?;
            write_length_delimited(buf, bytes);
        }
        (DataType::String, Value::String(s)) => {
            check_scalar_length(field, value)?;
            write_length_delimited(buf, s.as_bytes());
        }
        _ => {
            return Err(CodecError::TypeMismatch {
                field: field.name.clone(),
                expected: data_type.keyword(),
            })
        }
    }
    Ok(())
}

fn array_items<'a>(field: &Field, value: &'a Value) -> Result<&'a [Value], CodecError> {
    value.as_array().ok_or_else(|| CodecError::TypeMismatch {
        field: field.name.clone(),
        expected: "array",
    })
}

fn write_key(buf: &mut Vec<u8>, field_number: u32, wire_type: u8) {
    write_varint(buf, (u64::from(field_number) << 3) | u64::from(wire_type));
}

fn write_length_delimited(buf: &mut Vec<u8>, data: &[u8]) {
    write_varint(buf, data.len() as u64);
    buf.extend_from_slice(data);
}
