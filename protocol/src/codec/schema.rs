//! Schema descriptors for the record codec.
//!
//! A [`Schema`] is an ordered list of [`Field`]s. The order is the ascending
//! `field_number` order and it drives three things at once: the byte layout
//! produced by the encoder, the order in which interactive questions are
//! asked, and the order sub-values are read back from comma-joined input.
//!
//! Schemas are usually built from the JSON-schema dialect a running node
//! publishes (`type`, `dataType`, `fieldNumber`, `properties`, `items`), or
//! from the embedded definitions in [`crate::schema::builtin`].

use serde_json::{json, Map, Value as Json};
use std::fmt;

use super::CodecError;

// ---------------------------------------------------------------------------
// DataType
// ---------------------------------------------------------------------------

/// Scalar data types understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Bytes,
    String,
    Boolean,
}

impl DataType {
    /// Parses the `dataType` keyword used in node-published schemas.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "uint32" => Some(Self::Uint32),
            "uint64" => Some(Self::Uint64),
            "sint32" => Some(Self::Sint32),
            "sint64" => Some(Self::Sint64),
            "bytes" => Some(Self::Bytes),
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
            Self::Bytes => "bytes",
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }

    /// `true` for types carried as a varint on the wire.
    pub fn is_varint(&self) -> bool {
        matches!(
            self,
            Self::Uint32 | Self::Uint64 | Self::Sint32 | Self::Sint64 | Self::Boolean
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// Shape of a single schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// One scalar value.
    Scalar(DataType),
    /// A list of scalars. Varint types are packed on the wire.
    Array(ArrayItems),
    /// A single nested record.
    Object(Schema),
    /// A repeated group: a variable-length list of nested records.
    ObjectArray(Schema),
}

impl FieldKind {
    /// Nested schema for object kinds, `None` for scalars and scalar arrays.
    pub fn nested(&self) -> Option<&Schema> {
        match self {
            Self::Object(schema) | Self::ObjectArray(schema) => Some(schema),
            _ => None,
        }
    }
}

/// Element type and bounds of a scalar array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayItems {
    pub data_type: DataType,
    /// `items.minLength` / `items.maxLength`, applied to every element.
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// `minItems` / `maxItems`.
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

impl ArrayItems {
    pub fn of(data_type: DataType) -> Self {
        Self {
            data_type,
            min_length: None,
            max_length: None,
            min_items: None,
            max_items: None,
        }
    }
}

/// A named, numbered field within a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub field_number: u32,
    pub kind: FieldKind,
    /// Minimum length of a scalar `bytes` (bytes) or `string` (characters)
    /// value. Array elements carry their own bounds in [`ArrayItems`].
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_number: u32, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            field_number,
            kind,
            min_length: None,
            max_length: None,
        }
    }

    pub fn scalar(name: impl Into<String>, field_number: u32, data_type: DataType) -> Self {
        Self::new(name, field_number, FieldKind::Scalar(data_type))
    }

    pub fn array(name: impl Into<String>, field_number: u32, data_type: DataType) -> Self {
        Self::new(name, field_number, FieldKind::Array(ArrayItems::of(data_type)))
    }

    pub fn object(name: impl Into<String>, field_number: u32, schema: Schema) -> Self {
        Self::new(name, field_number, FieldKind::Object(schema))
    }

    pub fn object_array(name: impl Into<String>, field_number: u32, schema: Schema) -> Self {
        Self::new(name, field_number, FieldKind::ObjectArray(schema))
    }

    /// Constrains the field to exactly `len` bytes.
    pub fn fixed_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self.max_length = Some(len);
        self
    }

    /// Constrains every element of a scalar array to exactly `len` bytes.
    /// No effect on other kinds.
    pub fn fixed_item_length(mut self, len: usize) -> Self {
        if let FieldKind::Array(items) = &mut self.kind {
            items.min_length = Some(len);
            items.max_length = Some(len);
        }
        self
    }

    /// Bounds the element count of a scalar array. No effect on other kinds.
    pub fn item_count(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        if let FieldKind::Array(items) = &mut self.kind {
            items.min_items = min;
            items.max_items = max;
        }
        self
    }

    /// Checks the length of a scalar value, or of one array element.
    pub(crate) fn check_length(&self, len: usize) -> Result<(), CodecError> {
        let (min, max) = match &self.kind {
            FieldKind::Array(items) => (items.min_length, items.max_length),
            _ => (self.min_length, self.max_length),
        };
        if out_of_bounds(len, min, max) {
            return Err(CodecError::InvalidLength {
                field: self.name.clone(),
                min,
                max,
                actual: len,
            });
        }
        Ok(())
    }

    /// Checks the element count of a scalar array.
    pub(crate) fn check_item_count(&self, count: usize) -> Result<(), CodecError> {
        let FieldKind::Array(items) = &self.kind else {
            return Ok(());
        };
        if out_of_bounds(count, items.min_items, items.max_items) {
            return Err(CodecError::InvalidItemCount {
                field: self.name.clone(),
                min: items.min_items,
                max: items.max_items,
                actual: count,
            });
        }
        Ok(())
    }
}

fn out_of_bounds(n: usize, min: Option<usize>, max: Option<usize>) -> bool {
    min.is_some_and(|min| n < min) || max.is_some_and(|max| n > max)
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// An ordered record schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub id: String,
    fields: Vec<Field>,
}

impl Schema {
    /// Builds a schema, ordering the fields by field number.
    ///
    /// Fails on duplicate field numbers, duplicate names, or field number 0.
    pub fn new(id: impl Into<String>, mut fields: Vec<Field>) -> Result<Self, CodecError> {
        let id = id.into();
        fields.sort_by_key(|f| f.field_number);
        for (i, field) in fields.iter().enumerate() {
            if field.field_number == 0 {
                return Err(CodecError::InvalidSchema(format!(
                    "{id}: field {} has field number 0",
                    field.name
                )));
            }
            if fields[..i]
                .iter()
                .any(|f| f.field_number == field.field_number || f.name == field.name)
            {
                return Err(CodecError::InvalidSchema(format!(
                    "{id}: duplicate field {} (#{})",
                    field.name, field.field_number
                )));
            }
        }
        Ok(Self { id, fields })
    }

    /// Builds a schema from fields known to be well formed.
    ///
    /// Only sorts; used for the embedded definitions, which are checked
    /// against [`Schema::new`] in tests.
    pub(crate) fn new_unchecked(id: impl Into<String>, mut fields: Vec<Field>) -> Self {
        fields.sort_by_key(|f| f.field_number);
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Fields in encoding order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn field_by_number(&self, field_number: u32) -> Option<&Field> {
        self.fields.iter().find(|f| f.field_number == field_number)
    }

    /// Parses a node-published JSON schema.
    ///
    /// Nested objects without an `$id` inherit `<parent>.<field>`.
    pub fn from_json(json: &Json) -> Result<Self, CodecError> {
        let id = json
            .get("$id")
            .and_then(Json::as_str)
            .unwrap_or("anonymous")
            .to_string();
        Self::parse_object(&id, json)
    }

    fn parse_object(id: &str, json: &Json) -> Result<Self, CodecError> {
        if json.get("type").and_then(Json::as_str) != Some("object") {
            return Err(CodecError::InvalidSchema(format!(
                "{id}: expected type \"object\""
            )));
        }
        let properties = json
            .get("properties")
            .and_then(Json::as_object)
            .ok_or_else(|| CodecError::InvalidSchema(format!("{id}: missing properties")))?;

        let fields = properties
            .iter()
            .map(|(name, property)| Self::parse_field(id, name, property))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(id, fields)
    }

    fn parse_field(parent: &str, name: &str, json: &Json) -> Result<Field, CodecError> {
        let field_number = json
            .get("fieldNumber")
            .and_then(Json::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                CodecError::InvalidSchema(format!("{parent}.{name}: missing fieldNumber"))
            })?;
        let length = |json: &Json, key: &str| json.get(key).and_then(Json::as_u64).map(|n| n as usize);
        let nested_id = |json: &Json| {
            json.get("$id")
                .and_then(Json::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{parent}.{name}"))
        };

        let kind = if let Some(keyword) = json.get("dataType").and_then(Json::as_str) {
            FieldKind::Scalar(Self::parse_data_type(parent, name, keyword)?)
        } else {
            match json.get("type").and_then(Json::as_str) {
                Some("object") => FieldKind::Object(Self::parse_object(&nested_id(json), json)?),
                Some("array") => {
                    let items = json.get("items").ok_or_else(|| {
                        CodecError::InvalidSchema(format!("{parent}.{name}: array without items"))
                    })?;
                    if let Some(keyword) = items.get("dataType").and_then(Json::as_str) {
                        FieldKind::Array(ArrayItems {
                            data_type: Self::parse_data_type(parent, name, keyword)?,
                            min_length: length(items, "minLength"),
                            max_length: length(items, "maxLength"),
                            min_items: length(json, "minItems"),
                            max_items: length(json, "maxItems"),
                        })
                    } else {
                        FieldKind::ObjectArray(Self::parse_object(&nested_id(items), items)?)
                    }
                }
                _ => {
                    return Err(CodecError::InvalidSchema(format!(
                        "{parent}.{name}: field has neither dataType nor a known type"
                    )))
                }
            }
        };

        let scalar = matches!(kind, FieldKind::Scalar(_));
        Ok(Field {
            name: name.to_string(),
            field_number,
            kind,
            min_length: length(json, "minLength").filter(|_| scalar),
            max_length: length(json, "maxLength").filter(|_| scalar),
        })
    }

    fn parse_data_type(parent: &str, name: &str, keyword: &str) -> Result<DataType, CodecError> {
        DataType::from_keyword(keyword).ok_or_else(|| {
            CodecError::InvalidSchema(format!("{parent}.{name}: unknown dataType {keyword}"))
        })
    }

    /// Renders the schema back into the node JSON dialect.
    pub fn to_json(&self) -> Json {
        let mut schema = self.object_json();
        schema["$id"] = json!(self.id);
        schema
    }

    fn object_json(&self) -> Json {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut property = match &field.kind {
                FieldKind::Scalar(dt) => json!({ "dataType": dt.keyword() }),
                FieldKind::Array(items) => {
                    let mut item = json!({ "dataType": items.data_type.keyword() });
                    put_bound(&mut item, "minLength", items.min_length);
                    put_bound(&mut item, "maxLength", items.max_length);
                    let mut array = json!({ "type": "array", "items": item });
                    put_bound(&mut array, "minItems", items.min_items);
                    put_bound(&mut array, "maxItems", items.max_items);
                    array
                }
                FieldKind::Object(schema) => schema.object_json(),
                FieldKind::ObjectArray(schema) => json!({ "type": "array", "items": schema.object_json() }),
            };
            property["fieldNumber"] = json!(field.field_number);
            put_bound(&mut property, "minLength", field.min_length);
            put_bound(&mut property, "maxLength", field.max_length);
            properties.insert(field.name.clone(), property);
        }
        let required: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();
        json!({
            "type": "object",
            "required": required,
            "properties": properties,
        })
    }
}

fn put_bound(json: &mut Json, key: &str, bound: Option<usize>) {
    if let Some(n) = bound {
        json[key] = json!(n);
    }
}
