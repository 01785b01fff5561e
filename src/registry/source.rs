//! Category specs (what the caller hands in) and descriptors (what the rest of
//! the widget works with).
//!
//! A spec comes in three shapes: a URL, a plain list of records, or a config
//! object. All three normalize to the same `CategoryDescriptor`.

use serde_json::Value;
use std::rc::Rc;

use super::adapter::{DisplayFn, FieldMapping, Labeler, ParseFn, Parser};
use super::record::Record;
use crate::config::{TokenStyle, WidgetConfig};
use crate::error::{ConfigurationError, ParseFailure};

// =============================================================================
// Specs
// =============================================================================

/// Where a category's records come from, as supplied by the caller
#[derive(Debug, Clone)]
pub enum DataSpec {
    Url(String),
    List(Vec<Value>),
}

/// Full per-category configuration
#[derive(Debug, Clone)]
pub struct CategoryConfig {
    pub data: DataSpec,
    pub label: Option<String>,
    pub prefix: Option<String>,
    pub style: Option<TokenStyle>,
    pub fields: Option<FieldMapping>,
    pub parse: Option<ParseFnHandle>,
    pub display: Option<DisplayFnHandle>,
}

/// `ParseFn` with a `Debug` impl so specs stay printable
#[derive(Clone)]
pub struct ParseFnHandle(pub ParseFn);

/// `DisplayFn` with a `Debug` impl so specs stay printable
#[derive(Clone)]
pub struct DisplayFnHandle(pub DisplayFn);

impl std::fmt::Debug for ParseFnHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParseFn(..)")
    }
}

impl std::fmt::Debug for DisplayFnHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DisplayFn(..)")
    }
}

impl CategoryConfig {
    pub fn new(data: DataSpec) -> Self {
        Self {
            data,
            label: None,
            prefix: None,
            style: None,
            fields: None,
            parse: None,
            display: None,
        }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        Self::new(DataSpec::Url(url.into()))
    }

    pub fn list(records: Vec<Value>) -> Self {
        Self::new(DataSpec::List(records))
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn style(mut self, style: TokenStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn fields(mut self, fields: FieldMapping) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn parse_with<F>(mut self, parse: F) -> Self
    where
        F: Fn(&Value) -> Result<Vec<Value>, String> + 'static,
    {
        self.parse = Some(ParseFnHandle(Rc::new(parse)));
        self
    }

    pub fn display_with<F>(mut self, display: F) -> Self
    where
        F: Fn(&Record) -> String + 'static,
    {
        self.display = Some(DisplayFnHandle(Rc::new(display)));
        self
    }
}

/// One category as supplied by the caller
#[derive(Debug, Clone)]
pub enum CategorySpec {
    Url(String),
    List { records: Vec<Value>, display: Option<DisplayFnHandle> },
    Config(CategoryConfig),
}

impl CategorySpec {
    pub fn list(records: Vec<Value>) -> Self {
        CategorySpec::List { records, display: None }
    }

    /// Read a spec from JSON. Functions cannot travel through JSON, so a
    /// config object may use `fields` instead of `parseResponse`/`display`.
    pub fn from_json(key: &str, raw: &Value) -> Result<CategorySpec, ConfigurationError> {
        match raw {
            Value::String(url) => Ok(CategorySpec::Url(url.clone())),
            Value::Array(records) => Ok(CategorySpec::list(records.clone())),
            Value::Object(map) => {
                let data = match map.get("data") {
                    Some(Value::String(url)) => DataSpec::Url(url.clone()),
                    Some(Value::Array(records)) => DataSpec::List(records.clone()),
                    Some(other) => {
                        return Err(ConfigurationError::InvalidData {
                            key: key.to_string(),
                            found: json_kind(other),
                        })
                    }
                    None => {
                        return Err(ConfigurationError::InvalidData {
                            key: key.to_string(),
                            found: "nothing",
                        })
                    }
                };

                let mut config = CategoryConfig::new(data);
                config.label = map.get("label").and_then(Value::as_str).map(str::to_string);
                config.prefix = map.get("prefix").and_then(Value::as_str).map(str::to_string);
                if let Some(style) = map.get("style") {
                    config.style = Some(serde_json::from_value(style.clone()).map_err(|e| {
                        ConfigurationError::InvalidConfig(format!("{}: bad style: {}", key, e))
                    })?);
                }
                if let Some(fields) = map.get("fields").or_else(|| map.get("fieldMapping")) {
                    config.fields = Some(serde_json::from_value(fields.clone()).map_err(|e| {
                        ConfigurationError::InvalidConfig(format!("{}: bad fields: {}", key, e))
                    })?);
                }
                Ok(CategorySpec::Config(config))
            }
            other => Err(ConfigurationError::UnrecognizedShape {
                key: key.to_string(),
                found: json_kind(other),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Descriptor
// =============================================================================

/// Normalized source of a category
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// In-memory payload, parsed on every query
    Static(Value),
    /// URL template the query is appended to (or substituted for `{query}`)
    Remote(String),
}

/// Uniform per-category descriptor
#[derive(Debug, Clone)]
pub struct CategoryDescriptor {
    key: String,
    label: String,
    source: Source,
    prefix: Option<String>,
    style: TokenStyle,
    parser: Parser,
    labeler: Labeler,
    no_name: String,
}

impl CategoryDescriptor {
    /// Build a descriptor, validating the spec eagerly
    pub fn from_spec(
        key: &str,
        spec: CategorySpec,
        config: &WidgetConfig,
    ) -> Result<CategoryDescriptor, ConfigurationError> {
        if key.trim().is_empty() {
            return Err(ConfigurationError::EmptyKey);
        }

        let category = match spec {
            CategorySpec::Url(url) => CategoryConfig::remote(url),
            CategorySpec::List { records, display } => {
                let mut category = CategoryConfig::list(records);
                category.display = display;
                category
            }
            CategorySpec::Config(category) => category,
        };

        let source = match category.data {
            DataSpec::Url(url) => {
                if url.trim().is_empty() {
                    return Err(ConfigurationError::EmptyUrl(key.to_string()));
                }
                Source::Remote(url)
            }
            DataSpec::List(records) => {
                if let Some(index) = records.iter().position(|r| Record::from_value(r).is_none()) {
                    return Err(ConfigurationError::InvalidRecord { key: key.to_string(), index });
                }
                Source::Static(Value::Array(records))
            }
        };

        let parser = match (category.parse, &category.fields) {
            (Some(ParseFnHandle(parse)), _) => Parser::Custom(parse),
            (None, Some(fields)) => Parser::Fields(fields.clone()),
            (None, None) => Parser::Default,
        };
        let labeler = match (category.display, category.fields) {
            (Some(DisplayFnHandle(display)), _) => Labeler::Custom(display),
            (None, Some(fields)) => Labeler::Fields(fields),
            (None, None) => Labeler::Default,
        };

        Ok(CategoryDescriptor {
            key: key.to_string(),
            label: category.label.unwrap_or_else(|| key.to_string()),
            source,
            prefix: category.prefix.filter(|p| !p.is_empty()),
            style: category.style.unwrap_or_else(|| config.default_style.clone()),
            parser,
            labeler,
            no_name: config.no_name_label.clone(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Label shown in the category dropdown
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.source, Source::Remote(_))
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn style(&self) -> &TokenStyle {
        &self.style
    }

    /// Normalize a payload into records
    pub fn parse(&self, payload: &Value) -> Result<Vec<Record>, ParseFailure> {
        self.parser.parse(payload)
    }

    /// Human-readable label for `record`, never empty
    pub fn display(&self, record: &Record) -> String {
        self.labeler
            .label(record)
            .unwrap_or_else(|| self.no_name.clone())
    }

    /// Visible text of an inserted token
    pub fn token_text(&self, record: &Record) -> String {
        format!("{}{}", self.prefix.as_deref().unwrap_or(""), self.display(record))
    }

    /// True if the category key or label contains `query`
    pub fn matches(&self, query: &str) -> bool {
        crate::matching::contains_folded(&self.key, query)
            || crate::matching::contains_folded(&self.label, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> WidgetConfig {
        WidgetConfig::default()
    }

    #[test]
    fn test_three_shapes_normalize() {
        let remote = CategoryDescriptor::from_spec(
            "users",
            CategorySpec::Url("https://api.test/users?q=".into()),
            &config(),
        )
        .unwrap();
        assert!(remote.is_remote());
        assert_eq!(remote.label(), "users");

        let list = CategoryDescriptor::from_spec(
            "colors",
            CategorySpec::list(vec![json!("Red"), json!("Green")]),
            &config(),
        )
        .unwrap();
        assert_eq!(list.source(), &Source::Static(json!(["Red", "Green"])));

        let configured = CategoryDescriptor::from_spec(
            "sales",
            CategorySpec::Config(
                CategoryConfig::list(vec![json!({"id": 1, "label": "Sale #001"})])
                    .label("Sales")
                    .prefix("#"),
            ),
            &config(),
        )
        .unwrap();
        assert_eq!(configured.label(), "Sales");
        let record = Record::new().with_field("label", "Sale #001");
        assert_eq!(configured.token_text(&record), "#Sale #001");
    }

    #[test]
    fn test_display_falls_back_to_no_name() {
        let d = CategoryDescriptor::from_spec("x", CategorySpec::list(vec![]), &config()).unwrap();
        assert_eq!(d.display(&Record::new().with_field("id", 9)), "no name");
    }

    #[test]
    fn test_list_display_override() {
        let spec = CategorySpec::List {
            records: vec![json!({"first": "Ada", "last": "Lovelace"})],
            display: Some(DisplayFnHandle(Rc::new(|r: &Record| {
                format!(
                    "{} {}",
                    r.text("first").unwrap_or_default(),
                    r.text("last").unwrap_or_default()
                )
            }))),
        };
        let d = CategoryDescriptor::from_spec("people", spec, &config()).unwrap();
        let records = d.parse(&json!([{"first": "Ada", "last": "Lovelace"}])).unwrap();
        assert_eq!(d.display(&records[0]), "Ada Lovelace");
    }

    #[test]
    fn test_custom_parse_wins_over_fields() {
        let spec = CategoryConfig::remote("https://x.test/?q=")
            .fields(FieldMapping { root: Some("items".into()), ..FieldMapping::default() })
            .parse_with(|payload| {
                Ok(payload["users"]
                    .as_array()
                    .cloned()
                    .unwrap_or_default())
            });
        let d = CategoryDescriptor::from_spec("u", CategorySpec::Config(spec), &config()).unwrap();
        let records = d.parse(&json!({"users": [{"username": "ana"}]})).unwrap();
        assert_eq!(d.display(&records[0]), "ana");
    }

    #[test]
    fn test_from_json_shapes() {
        assert!(matches!(
            CategorySpec::from_json("a", &json!("https://x")),
            Ok(CategorySpec::Url(_))
        ));
        assert!(matches!(
            CategorySpec::from_json("a", &json!([1, 2])),
            Ok(CategorySpec::List { .. })
        ));
        assert!(matches!(
            CategorySpec::from_json("a", &json!({"data": "https://x", "label": "A"})),
            Ok(CategorySpec::Config(_))
        ));
        assert_eq!(
            CategorySpec::from_json("a", &json!(12)).unwrap_err(),
            ConfigurationError::UnrecognizedShape { key: "a".into(), found: "number" }
        );
        assert_eq!(
            CategorySpec::from_json("a", &json!({"label": "A"})).unwrap_err(),
            ConfigurationError::InvalidData { key: "a".into(), found: "nothing" }
        );
        assert_eq!(
            CategorySpec::from_json("a", &json!({"data": true})).unwrap_err(),
            ConfigurationError::InvalidData { key: "a".into(), found: "boolean" }
        );
    }

    #[test]
    fn test_validation_fails_fast() {
        assert_eq!(
            CategoryDescriptor::from_spec(" ", CategorySpec::list(vec![]), &config()).unwrap_err(),
            ConfigurationError::EmptyKey
        );
        assert_eq!(
            CategoryDescriptor::from_spec("u", CategorySpec::Url(String::new()), &config())
                .unwrap_err(),
            ConfigurationError::EmptyUrl("u".into())
        );
        assert_eq!(
            CategoryDescriptor::from_spec("l", CategorySpec::list(vec![json!("ok"), Value::Null]), &config())
                .unwrap_err(),
            ConfigurationError::InvalidRecord { key: "l".into(), index: 1 }
        );
    }
}
