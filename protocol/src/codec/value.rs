//! Schema-typed values and their JSON representation.
//!
//! JSON is the boundary format: 64-bit integers travel as decimal strings so
//! that no JavaScript-style consumer ever routes them through a float, and
//! byte fields travel as lowercase hex.

use serde_json::{Map, Number, Value as Json};
use std::collections::BTreeMap;

use super::schema::{DataType, Field, FieldKind, Schema};
use super::CodecError;

/// Named fields of a decoded record.
pub type Record = BTreeMap<String, Value>;

/// A value conforming to some [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Uint(u64),
    Sint(i64),
    Bytes(Vec<u8>),
    String(String),
    Boolean(bool),
    Array(Vec<Value>),
    Object(Record),
}

impl Value {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Record> {
        match self {
            Self::Object(record) => Some(record),
            _ => None,
        }
    }

    /// Looks up a field of an object value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|record| record.get(name))
    }

    /// Converts a JSON object into a value conforming to `schema`.
    ///
    /// Fields are visited in schema order, so the first offending field is
    /// the one reported. Keys not present in the schema are rejected.
    pub fn from_json(schema: &Schema, json: &Json) -> Result<Self, CodecError> {
        let object = json.as_object().ok_or_else(|| CodecError::TypeMismatch {
            field: schema.id.clone(),
            expected: "object",
        })?;

        let mut record = Record::new();
        for field in schema.fields() {
            let raw = object
                .get(&field.name)
                .ok_or_else(|| CodecError::MissingField(field.name.clone()))?;
            record.insert(field.name.clone(), field_from_json(field, raw)?);
        }
        if let Some(unknown) = object.keys().find(|key| schema.field(key).is_none()) {
            return Err(CodecError::UnknownField(unknown.clone()));
        }
        Ok(Self::Object(record))
    }

    /// Renders an object value as JSON according to `schema`.
    pub fn to_json(&self, schema: &Schema) -> Result<Json, CodecError> {
        let record = self.as_object().ok_or_else(|| CodecError::TypeMismatch {
            field: schema.id.clone(),
            expected: "object",
        })?;
        let mut object = Map::new();
        for field in schema.fields() {
            let value = record
                .get(&field.name)
                .ok_or_else(|| CodecError::MissingField(field.name.clone()))?;
            object.insert(field.name.clone(), field_to_json(field, value)?);
        }
        Ok(Json::Object(object))
    }
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// Parses one scalar from its textual form.
///
/// Shared by JSON conversion (for string-encoded integers and hex) and by
/// the prompt transformer.
pub fn parse_scalar(field: &str, data_type: DataType, raw: &str) -> Result<Value, CodecError> {
    let invalid_number = || CodecError::InvalidNumber {
        field: field.to_string(),
        value: raw.to_string(),
    };
    let text = raw.trim();
    match data_type {
        DataType::Uint32 | DataType::Uint64 => {
            let n: u64 = text.parse().map_err(|_| invalid_number())?;
            check_range(field, data_type, Value::Uint(n))
        }
        DataType::Sint32 | DataType::Sint64 => {
            let n: i64 = text.parse().map_err(|_| invalid_number())?;
            check_range(field, data_type, Value::Sint(n))
        }
        DataType::Bytes => hex::decode(text)
            .map(Value::Bytes)
            .map_err(|_| CodecError::InvalidHex {
                field: field.to_string(),
                value: raw.to_string(),
            }),
        DataType::String => Ok(Value::String(raw.to_string())),
        DataType::Boolean => match text.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err(CodecError::InvalidBoolean {
                field: field.to_string(),
                value: raw.to_string(),
            }),
        },
    }
}

pub(crate) fn check_range(field: &str, data_type: DataType, value: Value) -> Result<Value, CodecError> {
    let in_range = match (&value, data_type) {
        (Value::Uint(n), DataType::Uint32) => u32::try_from(*n).is_ok(),
        (Value::Sint(n), DataType::Sint32) => i32::try_from(*n).is_ok(),
        _ => true,
    };
    if in_range {
        Ok(value)
    } else {
        Err(CodecError::OutOfRange {
            field: field.to_string(),
            data_type,
        })
    }
}

fn scalar_from_json(field: &Field, data_type: DataType, json: &Json) -> Result<Value, CodecError> {
    let mismatch = |expected| CodecError::TypeMismatch {
        field: field.name.clone(),
        expected,
    };
    let value = match (data_type, json) {
        (DataType::Uint32 | DataType::Uint64, Json::Number(n)) => {
            let n = n.as_u64().ok_or_else(|| CodecError::InvalidNumber {
                field: field.name.clone(),
                value: n.to_string(),
            })?;
            check_range(&field.name, data_type, Value::Uint(n))?
        }
        (DataType::Sint32 | DataType::Sint64, Json::Number(n)) => {
            let n = n.as_i64().ok_or_else(|| CodecError::InvalidNumber {
                field: field.name.clone(),
                value: n.to_string(),
            })?;
            check_range(&field.name, data_type, Value::Sint(n))?
        }
        (DataType::Uint32 | DataType::Uint64 | DataType::Sint32 | DataType::Sint64, Json::String(s)) => {
            parse_scalar(&field.name, data_type, s)?
        }
        (DataType::Bytes, Json::String(s)) => parse_scalar(&field.name, data_type, s)?,
        (DataType::String, Json::String(s)) => Value::String(s.clone()),
        (DataType::Boolean, Json::Bool(b)) => Value::Boolean(*b),
        (DataType::Uint32 | DataType::Uint64 | DataType::Sint32 | DataType::Sint64, _) => {
            return Err(mismatch("integer"))
        }
        (DataType::Bytes, _) => return Err(mismatch("hex string")),
        (DataType::String, _) => return Err(mismatch("string")),
        (DataType::Boolean, _) => return Err(mismatch("boolean")),
    };
    check_scalar_length(field, &value)?;
    Ok(value)
}

pub(crate) fn check_scalar_length(field: &Field, value: &Value) -> Result<(), CodecError> {
    match value {
        Value::Bytes(bytes) => field.check_length(bytes.len()),
        Value::String(s) => field.check_length(s.chars().count()),
        _ => Ok(()),
    }
}

fn scalar_to_json(field: &Field, data_type: DataType, value: &Value) -> Result<Json, CodecError> {
    let mismatch = || CodecError::TypeMismatch {
        field: field.name.clone(),
        expected: data_type.keyword(),
    };
    Ok(match (data_type, value) {
        (DataType::Uint64, Value::Uint(n)) => Json::String(n.to_string()),
        (DataType::Sint64, Value::Sint(n)) => Json::String(n.to_string()),
        (DataType::Uint32, Value::Uint(n)) => Json::Number(Number::from(*n)),
        (DataType::Sint32, Value::Sint(n)) => Json::Number(Number::from(*n)),
        (DataType::Bytes, Value::Bytes(b)) => Json::String(hex::encode(b)),
        (DataType::String, Value::String(s)) => Json::String(s.clone()),
        (DataType::Boolean, Value::Boolean(b)) => Json::Bool(*b),
        _ => return Err(mismatch()),
    })
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

fn field_from_json(field: &Field, json: &Json) -> Result<Value, CodecError> {
    match &field.kind {
        FieldKind::Scalar(dt) => scalar_from_json(field, *dt, json),
        FieldKind::Object(schema) => Value::from_json(schema, json),
        FieldKind::Array(items) => {
            let json = json_items(field, json)?;
            field.check_item_count(json.len())?;
            json.iter()
                .map(|item| scalar_from_json(field, items.data_type, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        FieldKind::ObjectArray(schema) => json_items(field, json)?
            .iter()
            .map(|item| Value::from_json(schema, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
    }
}

fn json_items<'a>(field: &Field, json: &'a Json) -> Result<&'a Vec<Json>, CodecError> {
    json.as_array().ok_or_else(|| CodecError::TypeMismatch {
        field: field.name.clone(),
        expected: "array",
    })
}

fn field_to_json(field: &Field, value: &Value) -> Result<Json, CodecError> {
    let items = || {
        value.as_array().ok_or_else(|| CodecError::TypeMismatch {
            field: field.name.clone(),
            expected: "array",
        })
    };
    match &field.kind {
        FieldKind::Scalar(dt) => scalar_to_json(field, *dt, value),
        FieldKind::Object(schema) => value.to_json(schema),
        FieldKind::Array(array) => items()?
            .iter()
            .map(|item| scalar_to_json(field, array.data_type, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array),
        FieldKind::ObjectArray(schema) => items()?
            .iter()
            .map(|item| item.to_json(schema))
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array),
    }
}
