//! Record Fetcher: category + query -> records
//!
//! Static categories are filtered in memory. Remote categories are planned
//! as a `FetchRequest` that the host executes; the payload comes back
//! through `complete`. Only whole-category (empty query) remote results are
//! cached.
//!
//! - `debounce.rs` - Debouncer used to delay remote queries while typing

pub mod debounce;

pub use debounce::*;

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{FetchFailure, TransportFailure};
use crate::matching::{contains_folded, sanitize_query};
use crate::registry::{CategoryDescriptor, Record, Source};

/// Placeholder in URL templates replaced by the sanitized query
pub const QUERY_PLACEHOLDER: &str = "{query}";

// =============================================================================
// Types
// =============================================================================

/// A remote fetch the host must perform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchRequest {
    pub ticket: u64,
    pub category: String,
    /// Live query as typed (used for staleness checks)
    pub query: String,
    pub url: String,
}

/// Records produced by a fetch. `failure` explains an empty result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub records: Vec<Record>,
    pub failure: Option<FetchFailure>,
}

impl FetchOutcome {
    pub fn ok(records: Vec<Record>) -> Self {
        Self { records, failure: None }
    }

    pub fn failed(failure: impl Into<FetchFailure>) -> Self {
        Self {
            records: Vec::new(),
            failure: Some(failure.into()),
        }
    }
}

/// What answering a query takes
#[derive(Debug, Clone, PartialEq)]
pub enum FetchPlan {
    /// Answer available now (static source or cache hit)
    Ready(FetchOutcome),
    /// Remote round trip needed
    Remote { url: String },
}

// =============================================================================
// RecordFetcher
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct RecordFetcher {
    cache: HashMap<String, Vec<Record>>,
}

impl RecordFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide how to answer `query` for `descriptor`
    pub fn plan(&self, descriptor: &CategoryDescriptor, query: &str) -> FetchPlan {
        match descriptor.source() {
            Source::Static(payload) => {
                let outcome = match descriptor.parse(payload) {
                    Ok(records) => FetchOutcome::ok(
                        records
                            .into_iter()
                            .filter(|record| contains_folded(&descriptor.display(record), query))
                            .collect(),
                    ),
                    Err(failure) => {
                        log::warn!("[RecordFetcher] {}: {}", descriptor.key(), failure);
                        FetchOutcome::failed(failure)
                    }
                };
                FetchPlan::Ready(outcome)
            }
            Source::Remote(template) => {
                if query.is_empty() {
                    if let Some(records) = self.cache.get(descriptor.key()) {
                        return FetchPlan::Ready(FetchOutcome::ok(records.clone()));
                    }
                }
                FetchPlan::Remote {
                    url: build_url(template, query),
                }
            }
        }
    }

    /// Turn the host's answer for a remote plan into records
    pub fn complete(
        &mut self,
        descriptor: &CategoryDescriptor,
        query: &str,
        result: Result<Value, TransportFailure>,
    ) -> FetchOutcome {
        let payload = match result {
            Ok(payload) => payload,
            Err(failure) => {
                log::warn!("[RecordFetcher] {}: {}", descriptor.key(), failure);
                return FetchOutcome::failed(failure);
            }
        };

        match descriptor.parse(&payload) {
            Ok(records) => {
                if query.is_empty() {
                    self.cache.insert(descriptor.key().to_string(), records.clone());
                }
                FetchOutcome::ok(records)
            }
            Err(failure) => {
                log::warn!("[RecordFetcher] {}: {}", descriptor.key(), failure);
                FetchOutcome::failed(failure)
            }
        }
    }

    /// Cached whole-category result
    pub fn cached(&self, key: &str) -> Option<&[Record]> {
        self.cache.get(key).map(Vec::as_slice)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

/// Substitute or append the sanitized, percent-encoded query
pub fn build_url(template: &str, query: &str) -> String {
    let encoded = urlencoding::encode(&sanitize_query(query)).into_owned();
    if template.contains(QUERY_PLACEHOLDER) {
        template.replace(QUERY_PLACEHOLDER, &encoded)
    } else {
        format!("{}{}", template, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;
    use crate::error::ParseFailure;
    use crate::registry::{CategoryConfig, CategorySpec, FieldMapping};
    use serde_json::json;

    fn descriptor(key: &str, spec: CategorySpec) -> CategoryDescriptor {
        CategoryDescriptor::from_spec(key, spec, &WidgetConfig::default()).unwrap()
    }

    fn labels(outcome: &FetchOutcome) -> Vec<String> {
        outcome
            .records
            .iter()
            .map(|r| r.text("label").unwrap_or_default())
            .collect()
    }

    // -------------------------------------------------------------------------
    // Requirement 1: Static sources filter by display label, ignoring accents
    // -------------------------------------------------------------------------
    #[test]
    fn test_static_filter() {
        let d = descriptor(
            "cities",
            CategorySpec::list(vec![json!("São Paulo"), json!("Salvador"), json!("Recife")]),
        );

        match RecordFetcher::new().plan(&d, "SAO") {
            FetchPlan::Ready(outcome) => assert_eq!(labels(&outcome), vec!["São Paulo"]),
            other => panic!("expected ready plan, got {:?}", other),
        }
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Empty query returns everything in order
    // -------------------------------------------------------------------------
    #[test]
    fn test_static_empty_query_returns_all() {
        let d = descriptor("n", CategorySpec::list(vec![json!("Two"), json!("One")]));
        match RecordFetcher::new().plan(&d, "") {
            FetchPlan::Ready(outcome) => assert_eq!(labels(&outcome), vec!["Two", "One"]),
            other => panic!("expected ready plan, got {:?}", other),
        }
    }

    // -------------------------------------------------------------------------
    // Requirement 3: Remote queries become sanitized URLs
    // -------------------------------------------------------------------------
    #[test]
    fn test_remote_plan_builds_url() {
        let d = descriptor("u", CategorySpec::Url("https://api.test/users?q=".into()));
        assert_eq!(
            RecordFetcher::new().plan(&d, "José, Ana!"),
            FetchPlan::Remote { url: "https://api.test/users?q=Jose%20Ana".into() }
        );
    }

    #[test]
    fn test_url_placeholder() {
        assert_eq!(
            build_url("https://x.test/search/{query}?limit=5", "a&b"),
            "https://x.test/search/ab?limit=5"
        );
    }

    // -------------------------------------------------------------------------
    // Requirement 4: Only whole-category results are cached
    // -------------------------------------------------------------------------
    #[test]
    fn test_cache_whole_category_only() {
        let d = descriptor("u", CategorySpec::Url("https://api.test/u?q=".into()));
        let mut fetcher = RecordFetcher::new();

        fetcher.complete(&d, "an", Ok(json!([{"username": "ana"}])));
        assert!(fetcher.cached("u").is_none());

        let outcome = fetcher.complete(&d, "", Ok(json!([{"username": "ana"}, {"username": "bo"}])));
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(fetcher.cached("u").unwrap().len(), 2);

        match fetcher.plan(&d, "") {
            FetchPlan::Ready(outcome) => assert_eq!(outcome.records.len(), 2),
            other => panic!("expected cache hit, got {:?}", other),
        }
        assert!(matches!(fetcher.plan(&d, "a"), FetchPlan::Remote { .. }));

        fetcher.clear();
        assert!(fetcher.cached("u").is_none());
    }

    // -------------------------------------------------------------------------
    // Requirement 5: Failures yield empty results with an observable reason
    // -------------------------------------------------------------------------
    #[test]
    fn test_transport_failure_is_empty() {
        let d = descriptor("u", CategorySpec::Url("https://api.test/u?q=".into()));
        let outcome = RecordFetcher::new().complete(&d, "", Err(TransportFailure::Status { code: 500 }));
        assert!(outcome.records.is_empty());
        assert_eq!(
            outcome.failure,
            Some(FetchFailure::Transport(TransportFailure::Status { code: 500 }))
        );
    }

    #[test]
    fn test_parse_failure_is_empty_and_not_cached() {
        let d = descriptor("u", CategorySpec::Url("https://api.test/u?q=".into()));
        let mut fetcher = RecordFetcher::new();
        let outcome = fetcher.complete(&d, "", Ok(json!({"users": []})));
        assert_eq!(outcome.failure, Some(FetchFailure::Parse(ParseFailure::NotASequence)));
        assert!(fetcher.cached("u").is_none());
    }

    #[test]
    fn test_field_mapping_unwraps_payload() {
        let d = descriptor(
            "products",
            CategorySpec::Config(
                CategoryConfig::remote("https://dummy.test/products/search?q=").fields(FieldMapping {
                    root: Some("products".into()),
                    label: vec!["title".into()],
                    ..FieldMapping::default()
                }),
            ),
        );
        let outcome = RecordFetcher::new().complete(
            &d,
            "pho",
            Ok(json!({"products": [{"id": 1, "title": "Phone"}], "total": 1})),
        );
        assert_eq!(d.display(&outcome.records[0]), "Phone");
    }
}
