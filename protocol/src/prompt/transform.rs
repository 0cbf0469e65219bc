//! Converts raw textual answers into schema-typed values.
//!
//! Everything arrives as a string: scalars verbatim, scalar arrays as
//! `a,b,c`, and each element of a repeated group as its sub-field values
//! joined by commas in sub-field order (`"<address>,100"`). Integers are
//! parsed straight into `u64`/`i64`, never through a float.

use std::collections::BTreeMap;

use crate::codec::{parse_scalar, CodecError, Field, FieldKind, Record, Schema, Value};
use crate::codec::value::check_scalar_length;

/// One collected answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawAnswer {
    Single(String),
    /// One entry per accepted iteration of a repeated group.
    Repeated(Vec<String>),
}

/// Answers keyed by field name.
pub type RawAnswers = BTreeMap<String, RawAnswer>;

/// Transforms collected answers into an object value for `schema`.
pub fn transform_asset(schema: &Schema, answers: &RawAnswers) -> Result<Value, CodecError> {
    let mut record = Record::new();
    for field in schema.fields() {
        let answer = answers
            .get(&field.name)
            .ok_or_else(|| CodecError::MissingField(field.name.clone()))?;
        record.insert(field.name.clone(), transform_field(field, answer)?);
    }
    Ok(Value::Object(record))
}

/// Folds several rounds of answers and transforms the result.
///
/// Repeated-group answers accumulate across rounds in order. Any other
/// field keeps the answer from the last round that supplied it.
pub fn transform_nested(
    schema: &Schema,
    iterations: &[BTreeMap<String, String>],
) -> Result<Value, CodecError> {
    let mut folded = RawAnswers::new();
    for round in iterations {
        for (name, raw) in round {
            let repeated = schema
                .field(name)
                .is_some_and(|f| matches!(f.kind, FieldKind::ObjectArray(_)));
            if !repeated {
                folded.insert(name.clone(), RawAnswer::Single(raw.clone()));
                continue;
            }
            if let Some(RawAnswer::Repeated(items)) = folded.get_mut(name) {
                items.push(raw.clone());
            } else {
                folded.insert(name.clone(), RawAnswer::Repeated(vec![raw.clone()]));
            }
        }
    }
    transform_asset(schema, &folded)
}

fn transform_field(field: &Field, answer: &RawAnswer) -> Result<Value, CodecError> {
    match (&field.kind, answer) {
        (FieldKind::Scalar(dt), RawAnswer::Single(raw)) => {
            let value = parse_scalar(&field.name, *dt, raw)?;
            check_scalar_length(field, &value)?;
            Ok(value)
        }
        (FieldKind::Array(array), RawAnswer::Single(raw)) => {
            let raw_items = split_items(raw);
            field.check_item_count(raw_items.len())?;
            let items = raw_items
                .into_iter()
                .map(|item| {
                    let value = parse_scalar(&field.name, array.data_type, item)?;
                    check_scalar_length(field, &value)?;
                    Ok(value)
                })
                .collect::<Result<Vec<_>, CodecError>>()?;
            Ok(Value::Array(items))
        }
        (FieldKind::Object(nested), RawAnswer::Single(raw)) => transform_group(field, nested, raw),
        (FieldKind::ObjectArray(nested), RawAnswer::Single(raw)) => {
            Ok(Value::Array(vec![transform_group(field, nested, raw)?]))
        }
        (FieldKind::ObjectArray(nested), RawAnswer::Repeated(raws)) => raws
            .iter()
            .map(|raw| transform_group(field, nested, raw))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (_, RawAnswer::Repeated(_)) => Err(CodecError::TypeMismatch {
            field: field.name.clone(),
            expected: "a single answer",
        }),
    }
}

/// Splits a comma-joined answer. Blank input is the empty list.
fn split_items(raw: &str) -> Vec<&str> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::trim).collect()
}

/// Zips one comma-joined group answer with the sub-fields of `nested`.
fn transform_group(field: &Field, nested: &Schema, raw: &str) -> Result<Value, CodecError> {
    let parts = split_items(raw);
    if parts.len() != nested.fields().len() {
        return Err(CodecError::ArityMismatch {
            field: field.name.clone(),
            expected: nested.fields().len(),
            actual: parts.len(),
        });
    }
    let mut record = Record::new();
    for (sub, part) in nested.fields().iter().zip(parts) {
        let FieldKind::Scalar(dt) = sub.kind else {
            return Err(CodecError::TypeMismatch {
                field: sub.name.clone(),
                expected: "scalar sub-field",
            });
        };
        let value = parse_scalar(&sub.name, dt, part)?;
        check_scalar_length(sub, &value)?;
        record.insert(sub.name.clone(), value);
    }
    Ok(Value::Object(record))
}
