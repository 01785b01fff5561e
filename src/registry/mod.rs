//! Source Registry: category specs -> uniform descriptors
//!
//! # Architecture
//! - `record.rs` - Record, the flat field map every category yields
//! - `adapter.rs` - parse/display dispatch (default, field mapping, closures)
//! - `source.rs` - CategorySpec shapes and the CategoryDescriptor they become

pub mod adapter;
pub mod record;
pub mod source;

pub use adapter::*;
pub use record::*;
pub use source::*;

use serde_json::Value;
use std::collections::HashMap;

use crate::config::WidgetConfig;
use crate::error::ConfigurationError;

/// All categories of one widget, in registration order with O(1) key lookup
#[derive(Debug, Clone, Default)]
pub struct Registry {
    descriptors: Vec<CategoryDescriptor>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Register every category. Fails on the first bad spec.
    pub fn register<K>(
        categories: Vec<(K, CategorySpec)>,
        config: &WidgetConfig,
    ) -> Result<Registry, ConfigurationError>
    where
        K: Into<String>,
    {
        let mut registry = Registry::default();
        for (key, spec) in categories {
            let key = key.into();
            if registry.index.contains_key(&key) {
                return Err(ConfigurationError::DuplicateKey(key));
            }
            let descriptor = CategoryDescriptor::from_spec(&key, spec, config)?;
            registry.index.insert(key, registry.descriptors.len());
            registry.descriptors.push(descriptor);
        }
        Ok(registry)
    }

    /// Register from a JSON object `{ key: spec, ... }`
    pub fn from_json(categories: &Value, config: &WidgetConfig) -> Result<Registry, ConfigurationError> {
        let map = categories.as_object().ok_or_else(|| {
            ConfigurationError::InvalidConfig("categories must be an object".to_string())
        })?;
        let specs = map
            .iter()
            .map(|(key, raw)| CategorySpec::from_json(key, raw).map(|spec| (key.clone(), spec)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::register(specs, config)
    }

    pub fn get(&self, key: &str) -> Option<&CategoryDescriptor> {
        self.index.get(key).map(|&i| &self.descriptors[i])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(CategoryDescriptor::key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Categories whose key or label contains `query`, in registration order
    pub fn filter(&self, query: &str) -> Vec<&CategoryDescriptor> {
        self.descriptors.iter().filter(|d| d.matches(query)).collect()
    }
}
