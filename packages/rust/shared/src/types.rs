//! Core domain types for tabby records.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Key under which a record carries its JSON-LD context.
pub const CONTEXT_KEY: &str = "@context";

/// A merged JSON-LD context (term → definition).
pub type ContextMap = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// SheetMode
// ---------------------------------------------------------------------------

/// How a sheet's rows map onto records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetMode {
    /// Every row is `key \t values...`; the sheet is one record.
    Single,
    /// First row is a header; every further row is one record.
    Many,
}

// ---------------------------------------------------------------------------
// AssembledObject
// ---------------------------------------------------------------------------

/// A record under construction.
///
/// Every field is an ordered list of values until finalization. Keys keep
/// their insertion order and appear at most once. The `@context` is held
/// apart from the fields so it never takes part in aggregation or
/// compaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledObject {
    fields: IndexMap<String, Vec<Value>>,
    context: Option<ContextMap>,
}

impl AssembledObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value to `key`, creating the field if needed.
    pub fn push(&mut self, key: impl Into<String>, value: Value) {
        self.fields.entry(key.into()).or_default().push(value);
    }

    /// Append several values to `key` in order.
    pub fn extend<I>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.fields.entry(key.into()).or_default().extend(values);
    }

    /// Replace the values of `key` wholesale, keeping its position if present.
    pub fn set(&mut self, key: impl Into<String>, values: Vec<Value>) {
        self.fields.insert(key.into(), values);
    }

    pub fn get(&self, key: &str) -> Option<&[Value]> {
        self.fields.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Value>)> {
        self.fields.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Vec<Value>)> {
        self.fields.iter_mut()
    }

    pub fn context(&self) -> Option<&ContextMap> {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> &mut Option<ContextMap> {
        &mut self.context
    }

    /// Split into fields and context.
    pub fn into_parts(self) -> (IndexMap<String, Vec<Value>>, Option<ContextMap>) {
        (self.fields, self.context)
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<Value>)> for AssembledObject {
    fn from_iter<T: IntoIterator<Item = (K, Vec<Value>)>>(iter: T) -> Self {
        let mut obj = Self::new();
        for (key, values) in iter {
            obj.extend(key, values);
        }
        obj
    }
}

// ---------------------------------------------------------------------------
// FieldValue / Record
// ---------------------------------------------------------------------------

/// A finalized field: a lone value or a list of two or more.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(Value),
    List(Vec<Value>),
}

impl FieldValue {
    pub fn into_json(self) -> Value {
        match self {
            Self::Scalar(v) => v,
            Self::List(vs) => Value::Array(vs),
        }
    }
}

/// A finalized, immutable tabby record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
    context: Option<ContextMap>,
}

impl Record {
    pub fn new(fields: IndexMap<String, FieldValue>, context: Option<ContextMap>) -> Self {
        Self { fields, context }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &IndexMap<String, FieldValue> {
        &self.fields
    }

    pub fn context(&self) -> Option<&ContextMap> {
        self.context.as_ref()
    }

    /// Render as a JSON object, `@context` last.
    pub fn into_json(self) -> Value {
        let mut map = serde_json::Map::with_capacity(self.fields.len() + 1);
        for (key, value) in self.fields {
            map.insert(key, value.into_json());
        }
        if let Some(ctx) = self.context {
            map.insert(CONTEXT_KEY.to_string(), Value::Object(ctx));
        }
        Value::Object(map)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.fields.len() + usize::from(self.context.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        if let Some(ctx) = &self.context {
            map.serialize_entry(CONTEXT_KEY, ctx)?;
        }
        map.end()
    }
}
