//! Record decoder, the inverse of [`super::encoder`].

use super::schema::{DataType, Field, FieldKind, Schema};
use super::value::{check_range, check_scalar_length, Record, Value};
use super::varint::{read_sint, read_varint};
use super::{CodecError, WIRE_LENGTH_DELIMITED, WIRE_VARINT};

/// Decodes `bytes` as a record conforming to `schema`.
///
/// Array fields absent from the input decode as empty arrays. Any other
/// absent field is an error.
pub fn decode(schema: &Schema, bytes: &[u8]) -> Result<Value, CodecError> {
    let mut record = Record::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let key = read_varint(bytes, &mut pos)?;
        let wire_type = (key & 0x07) as u8;
        let field_number = u32::try_from(key >> 3).map_err(|_| CodecError::UnknownFieldNumber(u32::MAX))?;
        let field = schema
            .field_by_number(field_number)
            .ok_or(CodecError::UnknownFieldNumber(field_number))?;

        match &field.kind {
            FieldKind::Scalar(dt) => {
                expect_wire_type(field, wire_type, scalar_wire_type(*dt))?;
                let value = decode_scalar(field, *dt, bytes, &mut pos)?;
                insert_once(&mut record, field, value)?;
            }
            FieldKind::Array(array) => {
                let dt = &array.data_type;
                expect_wire_type(field, wire_type, WIRE_LENGTH_DELIMITED)?;
                let items = array_slot(&mut record, field);
                if dt.is_varint() {
                    let packed = read_length_delimited(bytes, &mut pos)?;
                    let mut inner = 0;
                    while inner < packed.len() {
                        items.push(decode_scalar(field, *dt, packed, &mut inner)?);
                    }
                } else {
                    items.push(decode_scalar(field, *dt, bytes, &mut pos)?);
                }
            }
            FieldKind::Object(nested) => {
                expect_wire_type(field, wire_type, WIRE_LENGTH_DELIMITED)?;
                let value = decode(nested, read_length_delimited(bytes, &mut pos)?)?;
                insert_once(&mut record, field, value)?;
            }
            FieldKind::ObjectArray(nested) => {
                expect_wire_type(field, wire_type, WIRE_LENGTH_DELIMITED)?;
                let value = decode(nested, read_length_delimited(bytes, &mut pos)?)?;
                array_slot(&mut record, field).push(value);
            }
        }
    }

    for field in schema.fields() {
        match (&field.kind, record.get(&field.name)) {
            (FieldKind::Array(_), Some(Value::Array(items))) => field.check_item_count(items.len())?,
            (_, Some(_)) => {}
            (FieldKind::Array(_) | FieldKind::ObjectArray(_), None) => {
                field.check_item_count(0)?;
                record.insert(field.name.clone(), Value::Array(Vec::new()));
            }
            (_, None) => return Err(CodecError::MissingField(field.name.clone())),
        }
    }
    Ok(Value::Object(record))
}

fn scalar_wire_type(data_type: DataType) -> u8 {
    if data_type.is_varint() {
        WIRE_VARINT
    } else {
        WIRE_LENGTH_DELIMITED
    }
}

fn expect_wire_type(field: &Field, actual: u8, expected: u8) -> Result<(), CodecError> {
    if actual == expected {
        Ok(())
    } else {
        Err(CodecError::WireTypeMismatch {
            field: field.name.clone(),
            expected,
            actual,
        })
    }
}

fn insert_once(record: &mut Record, field: &Field, value: Value) -> Result<(), CodecError> {
    if record.insert(field.name.clone(), value).is_some() {
        return Err(CodecError::DuplicateField(field.name.clone()));
    }
    Ok(())
}

fn array_slot<'a>(record: &'a mut Record, field: &Field) -> &'a mut Vec<Value> {
    let slot = record
        .entry(field.name.clone())
        .or_insert_with(|| Value::Array(Vec::new()));
    match slot {
        Value::Array(items) => items,
        // Only this module inserts under array field names.
        _ => unreachable!("array field {} holds a non-array value", field.name),
    }
}

fn read_length_delimited<'a>(bytes: &'a [u8], pos: &mut usize) -> Result<&'a [u8], CodecError> {
    let len = usize::try_from(read_varint(bytes, pos)?).map_err(|_| CodecError::UnexpectedEof)?;
    let end = pos.checked_add(len).ok_or(CodecError::UnexpectedEof)?;
    let slice = bytes.get(*pos..end).ok_or(CodecError::UnexpectedEof)?;
    *pos = end;
    Ok(slice)
}

fn decode_scalar(
    field: &Field,
    data_type: DataType,
    bytes: &[u8],
    pos: &mut usize,
) -> Result<Value, CodecError> {
    let value = match data_type {
        DataType::Uint32 | DataType::Uint64 => Value::Uint(read_varint(bytes, pos)?),
        DataType::Sint32 | DataType::Sint64 => Value::Sint(read_sint(bytes, pos)?),
        DataType::Boolean => match read_varint(bytes, pos)? {
            0 => Value::Boolean(false),
            1 => Value::Boolean(true),
            other => {
                return Err(CodecError::InvalidBoolean {
                    field: field.name.clone(),
                    value: other.to_string(),
                })
            }
        },
        DataType::Bytes => Value::Bytes(read_length_delimited(bytes, pos)?.to_vec()),
        DataType::String => {
            let raw = read_length_delimited(bytes, pos)?;
            let s = std::str::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8(field.name.clone()))?;
            Value::String(s.to_string())
        }
    };
    let value = check_range(&field.name, data_type, value)?;
    check_scalar_length(field, &value)?;
    Ok(value)
}
