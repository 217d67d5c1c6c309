//! Records and the declarative field mapper
//!
//! Every data source describes its output shape as a [`RecordSpec`]: an
//! ordered table of `(source key, output key, default)` entries plus the
//! nested child lists it carries (citation lists, synonym lists, ...).
//! [`map_record`] is the single routine that projects a raw JSON object onto
//! such a spec. It never fails: a missing key yields the declared default.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Value used when the source key is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// JSON `null`
    Null,
    /// Empty string
    Empty,
}

impl FieldDefault {
    fn value(self) -> Value {
        match self {
            FieldDefault::Null => Value::Null,
            FieldDefault::Empty => Value::String(String::new()),
        }
    }
}

/// One entry of a field mapping table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub source: &'static str,
    pub dest: &'static str,
    pub default: FieldDefault,
}

impl FieldSpec {
    /// Copy `key` through under the same name, defaulting to null
    pub const fn keep(key: &'static str) -> Self {
        Self {
            source: key,
            dest: key,
            default: FieldDefault::Null,
        }
    }

    /// Copy `source` into `dest`, defaulting to null
    pub const fn rename(source: &'static str, dest: &'static str) -> Self {
        Self {
            source,
            dest,
            default: FieldDefault::Null,
        }
    }

    /// Default to an empty string instead of null
    pub const fn or_empty(self) -> Self {
        Self {
            default: FieldDefault::Empty,
            ..self
        }
    }
}

/// How a nested child appears in the raw payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildShape {
    /// An array of objects, e.g. `"Icodes": [{...}, {...}]`
    List,
    /// A single optional object, e.g. `"cankao": {...}`
    Object,
}

/// A nested child table inside a record
#[derive(Debug, Clone, Copy)]
pub struct ChildSpec {
    pub source: &'static str,
    pub dest: &'static str,
    pub shape: ChildShape,
    pub fields: &'static [FieldSpec],
}

impl ChildSpec {
    pub const fn list(key: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self {
            source: key,
            dest: key,
            shape: ChildShape::List,
            fields,
        }
    }

    pub const fn object(key: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self {
            source: key,
            dest: key,
            shape: ChildShape::Object,
            fields,
        }
    }
}

/// Output shape of one data source
#[derive(Debug, Clone, Copy)]
pub struct RecordSpec {
    pub fields: &'static [FieldSpec],
    pub children: &'static [ChildSpec],
}

impl RecordSpec {
    pub const fn flat(fields: &'static [FieldSpec]) -> Self {
        Self {
            fields,
            children: &[],
        }
    }

    pub const fn nested(fields: &'static [FieldSpec], children: &'static [ChildSpec]) -> Self {
        Self { fields, children }
    }

    /// Output keys in the order they are written
    pub fn output_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .map(|f| f.dest)
            .chain(self.children.iter().map(|c| c.dest))
    }
}

/// Owned list of nested records under one key
#[derive(Debug, Clone, PartialEq)]
pub struct ChildList {
    pub key: String,
    pub shape: ChildShape,
    pub records: Vec<Record>,
}

/// A flat record with explicitly owned child lists.
///
/// Field order is preserved, so a record serializes with its keys in the
/// order of the mapping table it was built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
    children: Vec<ChildList>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion, used while a record is being assembled
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Builder-style child list insertion
    pub fn with_children(mut self, key: impl Into<String>, shape: ChildShape, records: Vec<Record>) -> Self {
        self.children.push(ChildList {
            key: key.into(),
            shape,
            records,
        });
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Field as text: strings as-is, numbers and booleans rendered,
    /// null and missing as `None`
    pub fn text(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(value_text)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn children(&self) -> &[ChildList] {
        &self.children
    }

    /// Records of the child list stored under `key`, empty if absent
    pub fn child(&self, key: &str) -> &[Record] {
        self.children
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.records.as_slice())
            .unwrap_or(&[])
    }

    /// Build a record from an arbitrary JSON object.
    ///
    /// Arrays of objects and nested objects become child lists, everything
    /// else stays a field. Non-object input yields an empty record.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };

        let mut record = Self::default();
        for (key, value) in map {
            match value {
                Value::Array(items) if items.iter().all(Value::is_object) => {
                    let records = items.into_iter().map(Record::from_value).collect();
                    record.children.push(ChildList {
                        key,
                        shape: ChildShape::List,
                        records,
                    });
                },
                Value::Object(_) => {
                    record.children.push(ChildList {
                        key,
                        shape: ChildShape::Object,
                        records: vec![Record::from_value(value)],
                    });
                },
                other => {
                    record.fields.insert(key, other);
                },
            }
        }
        record
    }
}

/// Render a scalar JSON value as text. Null yields `None`.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + self.children.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        for child in &self.children {
            match child.shape {
                ChildShape::List => map.serialize_entry(&child.key, &child.records)?,
                ChildShape::Object => map.serialize_entry(&child.key, &child.records.first())?,
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => Ok(Record::from_value(value)),
            other => Err(de::Error::custom(format!(
                "expected a JSON object for a record, found {}",
                other
            ))),
        }
    }
}

/// Project `raw` onto `spec`. Missing keys take their declared default.
pub fn map_record(raw: &Value, spec: &RecordSpec) -> Record {
    map_record_with(raw, spec, std::iter::empty())
}

/// Like [`map_record`], with extra leading fields that the payload itself
/// does not carry (the seed a request was made for, for instance).
pub fn map_record_with<'a>(
    raw: &Value,
    spec: &RecordSpec,
    leading: impl IntoIterator<Item = (&'a str, Value)>,
) -> Record {
    let mut record = Record::default();
    for (key, value) in leading {
        record.fields.insert(key.to_string(), value);
    }

    map_fields(raw, spec.fields, &mut record.fields);

    for child in spec.children {
        let nested = raw.get(child.source);
        let records = match (child.shape, nested) {
            (ChildShape::List, Some(Value::Array(items))) => {
                items.iter().map(|item| map_flat(item, child.fields)).collect()
            },
            (ChildShape::Object, Some(item @ Value::Object(_))) => vec![map_flat(item, child.fields)],
            _ => Vec::new(),
        };
        record.children.push(ChildList {
            key: child.dest.to_string(),
            shape: child.shape,
            records,
        });
    }

    record
}

fn map_flat(raw: &Value, fields: &[FieldSpec]) -> Record {
    let mut record = Record::default();
    map_fields(raw, fields, &mut record.fields);
    record
}

fn map_fields(raw: &Value, fields: &[FieldSpec], out: &mut Map<String, Value>) {
    for field in fields {
        let value = raw
            .get(field.source)
            .cloned()
            .unwrap_or_else(|| field.default.value());
        out.insert(field.dest.to_string(), value);
    }
}
