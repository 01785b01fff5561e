//! Record: a flat, category-scoped mapping from field name to scalar

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field every scalar-only record is stored under
pub const LABEL_FIELD: &str = "label";

/// One mentionable item. Values are always JSON scalars (string, number, bool).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a payload element.
    ///
    /// Objects keep their scalar fields; nested arrays/objects are stored as
    /// their JSON text and nulls are dropped. A bare scalar becomes
    /// `{ "label": <scalar> }`. Returns `None` for null and arrays.
    pub fn from_value(value: &Value) -> Option<Record> {
        match value {
            Value::Object(map) => Some(Self::from_map(map)),
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                Some(Record::new().with_field(LABEL_FIELD, value.clone()))
            }
            Value::Null | Value::Array(_) => None,
        }
    }

    fn from_map(map: &Map<String, Value>) -> Record {
        let fields = map
            .iter()
            .filter_map(|(k, v)| match v {
                Value::Null => None,
                Value::Array(_) | Value::Object(_) => Some((k.clone(), Value::String(v.to_string()))),
                _ => Some((k.clone(), v.clone())),
            })
            .collect();
        Record { fields }
    }

    /// Rebuild a record from token attributes (all values are strings)
    pub fn from_attributes(attributes: &BTreeMap<String, String>) -> Record {
        let fields = attributes
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Record { fields }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a field. Non-scalar values are stored as JSON text, nulls are ignored.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let value = value.into();
        match value {
            Value::Null => {}
            Value::Array(_) | Value::Object(_) => {
                self.fields.insert(name.into(), Value::String(value.to_string()));
            }
            scalar => {
                self.fields.insert(name.into(), scalar);
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field rendered as text; `None` when absent or blank
    pub fn text(&self, field: &str) -> Option<String> {
        let text = match self.fields.get(field)? {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// String-valued attributes carried by an inserted token
    pub fn to_attributes(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|(k, v)| {
                let text = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), text)
            })
            .collect()
    }
}
