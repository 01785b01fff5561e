//! Record adapters: how a category turns payloads into records and records
//! into labels.
//!
//! Three variants are dispatched by `Parser` / `Labeler`:
//! - default behaviour (payload is a list, conventional label fields)
//! - `FieldMapping`, a declarative mapping usable from JSON config
//! - caller closures (`ParseFn`, `DisplayFn`)

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

use super::record::Record;
use crate::error::ParseFailure;

/// Conventional label fields, highest priority first
pub const DEFAULT_LABEL_FIELDS: [&str; 4] = ["label", "username", "title", "name"];

/// Caller-supplied payload parser. Returns raw elements, normalized afterwards.
pub type ParseFn = Rc<dyn Fn(&Value) -> Result<Vec<Value>, String>>;

/// Caller-supplied label function
pub type DisplayFn = Rc<dyn Fn(&Record) -> String>;

// =============================================================================
// Defaults
// =============================================================================

/// Normalize a list payload element by element
pub fn parse_list(payload: &Value) -> Result<Vec<Record>, ParseFailure> {
    let items = payload.as_array().ok_or(ParseFailure::NotASequence)?;
    normalize(items)
}

fn normalize(items: &[Value]) -> Result<Vec<Record>, ParseFailure> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| Record::from_value(item).ok_or(ParseFailure::InvalidElement { index }))
        .collect()
}

/// First non-blank field from `fields`
pub fn first_text<'a, I>(record: &Record, fields: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    fields.into_iter().find_map(|field| record.text(field))
}

// =============================================================================
// Field Mapping
// =============================================================================

/// Declarative adapter: `{ "id": "uuid", "label": ["title", "name"], "root": "data.items" }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    /// Field copied into `id` when it is named differently
    pub id: Option<String>,
    /// Label fields tried before the conventional ones
    #[serde(deserialize_with = "one_or_many")]
    pub label: Vec<String>,
    /// Dotted path to the record list inside a remote payload
    pub root: Option<String>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(field) => vec![field],
        OneOrMany::Many(fields) => fields,
    })
}

impl FieldMapping {
    pub fn parse(&self, payload: &Value) -> Result<Vec<Record>, ParseFailure> {
        let list = match &self.root {
            Some(path) => resolve_path(payload, path)
                .ok_or_else(|| ParseFailure::MissingPath { path: path.clone() })?,
            None => payload,
        };
        let mut records = parse_list(list)?;

        if let Some(id_field) = self.id.as_deref().filter(|f| *f != "id") {
            for record in &mut records {
                if let Some(id) = record.get(id_field).cloned() {
                    record.insert("id", id);
                }
            }
        }
        Ok(records)
    }

    pub fn display(&self, record: &Record) -> Option<String> {
        first_text(record, self.label.iter().map(String::as_str))
            .or_else(|| first_text(record, DEFAULT_LABEL_FIELDS))
    }
}

fn resolve_path<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(payload, |value, segment| value.get(segment))
}

// =============================================================================
// Dispatch
// =============================================================================

/// How a category parses payloads
#[derive(Clone, Default)]
pub enum Parser {
    #[default]
    Default,
    Fields(FieldMapping),
    Custom(ParseFn),
}

impl Parser {
    pub fn parse(&self, payload: &Value) -> Result<Vec<Record>, ParseFailure> {
        match self {
            Parser::Default => parse_list(payload),
            Parser::Fields(mapping) => mapping.parse(payload),
            Parser::Custom(parse) => {
                let items = parse(payload).map_err(|message| ParseFailure::Adapter { message })?;
                normalize(&items)
            }
        }
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parser::Default => write!(f, "Parser::Default"),
            Parser::Fields(mapping) => write!(f, "Parser::Fields({:?})", mapping),
            Parser::Custom(_) => write!(f, "Parser::Custom(..)"),
        }
    }
}

/// How a category labels records
#[derive(Clone, Default)]
pub enum Labeler {
    #[default]
    Default,
    Fields(FieldMapping),
    Custom(DisplayFn),
}

impl Labeler {
    /// Label for `record`, or `None` if no label field resolved
    pub fn label(&self, record: &Record) -> Option<String> {
        match self {
            Labeler::Default => first_text(record, DEFAULT_LABEL_FIELDS),
            Labeler::Fields(mapping) => mapping.display(record),
            Labeler::Custom(display) => Some(display(record)).filter(|s| !s.trim().is_empty()),
        }
    }
}

impl fmt::Debug for Labeler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Labeler::Default => write!(f, "Labeler::Default"),
            Labeler::Fields(mapping) => write!(f, "Labeler::Fields({:?})", mapping),
            Labeler::Custom(_) => write!(f, "Labeler::Custom(..)"),
        }
    }
}
