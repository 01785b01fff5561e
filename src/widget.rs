//! MentionWidget: wires detector, fetcher, controller and splice engine
//!
//! # Flow
//! host edit → `handle_input` → session update → options (now or after a fetch)
//! → `handle_key`/`select` → splice → session reset
//!
//! The widget never sleeps or performs I/O. Remote fetches are handed out by
//! `poll_fetch` once their debounce window has elapsed and come back through
//! `resolve_fetch`; `next_deadline` tells the host when to poll next.

use instant::Instant;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::autocomplete::{DropdownView, ListRenderer, MentionOption, OptionList};
use crate::config::WidgetConfig;
use crate::detector::TriggerDetector;
use crate::error::{ConfigurationError, FetchFailure, TransportFailure};
use crate::fetcher::{Debouncer, FetchOutcome, FetchPlan, FetchRequest, RecordFetcher};
use crate::matching::contains_folded;
use crate::output::{OutputFormatter, TokenEntry};
use crate::registry::{CategoryDescriptor, CategorySpec, Record, Registry};
use crate::session::{Anchor, Session};
use crate::splice::SpliceEngine;
use crate::surface::markup::category_rule;
use crate::surface::{Document, TextSurface};

// =============================================================================
// Types
// =============================================================================

/// Keys the dropdown reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_name(name: &str) -> Key {
        match name {
            "ArrowDown" | "Down" => Key::ArrowDown,
            "ArrowUp" | "Up" => Key::ArrowUp,
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            _ => Key::Other,
        }
    }
}

/// Whether the host should suppress the key's default action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
}

impl KeyOutcome {
    pub fn is_handled(self) -> bool {
        self == KeyOutcome::Handled
    }
}

/// What became of a resolved fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchResolution {
    /// Options replaced with `records` entries
    Applied { records: usize },
    /// Session moved on; result dropped
    Stale,
    /// Ticket not in flight (already resolved, or widget destroyed)
    Unknown,
}

/// Remote fetch waiting out its debounce window
#[derive(Debug, Clone)]
struct PendingFetch {
    category: String,
    query: String,
    url: String,
}

// =============================================================================
// MentionWidget
// =============================================================================

pub struct MentionWidget<S: TextSurface = Document> {
    surface: S,
    registry: Registry,
    config: WidgetConfig,
    detector: TriggerDetector,
    splicer: SpliceEngine,
    fetcher: RecordFetcher,
    debouncer: Debouncer<PendingFetch>,
    session: Session,
    options: OptionList,
    /// Last record list delivered for the live category, unfiltered
    fetched: Vec<MentionOption>,
    renderer: Option<Box<dyn ListRenderer>>,
    /// Trigger closed with Escape; not reopened while the caret stays on it
    dismissed: Option<Anchor>,
    in_flight: HashMap<u64, FetchRequest>,
    next_ticket: u64,
    last_failure: Option<FetchFailure>,
    destroyed: bool,
}

impl<S: TextSurface> MentionWidget<S> {
    /// Validate `config`, register `categories` and attach to `surface`.
    /// Construction is the only place an error can escape.
    pub fn new<K>(
        surface: S,
        categories: Vec<(K, CategorySpec)>,
        config: WidgetConfig,
    ) -> Result<Self, ConfigurationError>
    where
        K: Into<String>,
    {
        config.validate()?;
        let registry = Registry::register(categories, &config)?;
        Ok(Self::from_registry(surface, registry, config))
    }

    /// Same as `new`, with categories given as a JSON object
    pub fn from_json(
        surface: S,
        categories: &Value,
        config: WidgetConfig,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let registry = Registry::from_json(categories, &config)?;
        Ok(Self::from_registry(surface, registry, config))
    }

    pub fn from_registry(surface: S, registry: Registry, config: WidgetConfig) -> Self {
        Self {
            surface,
            detector: TriggerDetector::new(config.trigger),
            splicer: SpliceEngine::new(config.trigger, config.separator),
            fetcher: RecordFetcher::new(),
            debouncer: Debouncer::new(config.debounce()),
            session: Session::Idle,
            options: OptionList::new(),
            fetched: Vec::new(),
            renderer: None,
            dismissed: None,
            in_flight: HashMap::new(),
            next_ticket: 1,
            last_failure: None,
            destroyed: false,
            registry,
            config,
        }
    }

    pub fn with_renderer(mut self, renderer: impl ListRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn set_renderer(&mut self, renderer: Option<Box<dyn ListRenderer>>) {
        self.renderer = renderer;
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Host-side editing. Call `handle_input` after every edit.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Why the most recent fetch came back empty, if it failed
    pub fn last_failure(&self) -> Option<&FetchFailure> {
        self.last_failure.as_ref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn dropdown(&self) -> DropdownView {
        self.options
            .view(&self.config.no_results_label, &self.config.loading_label)
    }

    /// When the pending remote fetch becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Re-read the surface after an edit or caret move
    pub fn handle_input(&mut self, now: Instant) {
        if self.destroyed {
            return;
        }

        let mut detection = self.detector.detect(&self.surface);
        if let Some(dismissed) = self.dismissed {
            match &detection {
                Some(d) if d.anchor.same_trigger(&dismissed) => detection = None,
                _ => self.dismissed = None,
            }
        }

        let next = self.session.advance(detection.as_ref());
        let changed = next.phase() != self.session.phase()
            || next.category() != self.session.category()
            || next.query() != self.session.query();
        if next.phase() != self.session.phase() {
            log::debug!(
                "[MentionWidget] {} -> {}",
                self.session.phase_name(),
                next.phase_name()
            );
        }
        self.session = next;
        if !changed {
            return;
        }

        match self.session.clone() {
            Session::Idle => self.close(),
            Session::ChoosingCategory { query, .. } => {
                self.debouncer.cancel();
                let options = self
                    .registry
                    .filter(&query)
                    .into_iter()
                    .map(|d| MentionOption::Category {
                        key: d.key().to_string(),
                        label: d.label().to_string(),
                    })
                    .collect();
                self.options.replace(options);
                self.render();
            }
            Session::ChoosingRecord { category, query, .. } => {
                self.request_records(&category, &query, now, false);
            }
        }
    }

    pub fn handle_key(&mut self, key: Key, now: Instant) -> KeyOutcome {
        if self.destroyed || !self.options.is_open() {
            return KeyOutcome::Ignored;
        }

        match key {
            Key::ArrowDown | Key::ArrowUp => {
                self.options.navigate(if key == Key::ArrowDown { 1 } else { -1 });
                self.render();
                KeyOutcome::Handled
            }
            Key::Enter => match self.options.highlighted() {
                Some(index) => {
                    self.select(index, now);
                    KeyOutcome::Handled
                }
                None => KeyOutcome::Ignored,
            },
            Key::Escape => {
                self.dismissed = self.session.anchor().copied();
                self.session = Session::Idle;
                self.close();
                KeyOutcome::Handled
            }
            Key::Other => KeyOutcome::Ignored,
        }
    }

    /// Choose option `index` (click or Enter). Returns false if there is none.
    pub fn select(&mut self, index: usize, now: Instant) -> bool {
        if self.destroyed {
            return false;
        }
        match self.options.option(index).cloned() {
            Some(MentionOption::Category { key, .. }) => {
                self.choose_category(&key, now);
                true
            }
            Some(MentionOption::Record { record, .. }) => {
                self.choose_record(&record);
                true
            }
            None => false,
        }
    }

    /// Highlight option `index` (mouse over)
    pub fn hover(&mut self, index: usize) -> bool {
        if self.destroyed || !self.options.hover(index) {
            return false;
        }
        self.render();
        true
    }

    // -------------------------------------------------------------------------
    // Fetching
    // -------------------------------------------------------------------------

    /// Hand out the remote fetch whose debounce window has elapsed
    pub fn poll_fetch(&mut self, now: Instant) -> Option<FetchRequest> {
        if self.destroyed {
            return None;
        }
        let pending = self.debouncer.poll(now)?;
        let request = FetchRequest {
            ticket: self.next_ticket,
            category: pending.category,
            query: pending.query,
            url: pending.url,
        };
        self.next_ticket += 1;
        log::debug!("[MentionWidget] Fetch #{} {}", request.ticket, request.url);
        self.in_flight.insert(request.ticket, request.clone());
        Some(request)
    }

    /// Deliver the host's answer to request `ticket`
    pub fn resolve_fetch(
        &mut self,
        ticket: u64,
        result: Result<Value, TransportFailure>,
    ) -> FetchResolution {
        let Some(request) = self.in_flight.remove(&ticket) else {
            return FetchResolution::Unknown;
        };
        let Some(descriptor) = self.registry.get(&request.category) else {
            return FetchResolution::Unknown;
        };

        let outcome = self.fetcher.complete(descriptor, &request.query, result);
        self.last_failure = outcome.failure.clone();

        let live = matches!(
            &self.session,
            Session::ChoosingRecord { category, query, .. }
                if *category == request.category && *query == request.query
        );
        if !live {
            log::debug!(
                "[MentionWidget] Dropping stale result #{} for '{}'",
                ticket,
                request.query
            );
            return FetchResolution::Stale;
        }

        let records = outcome.records.len();
        let options = record_options(descriptor, outcome.records);
        self.fetched = options.clone();
        self.options.replace(options);
        self.render();
        FetchResolution::Applied { records }
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    pub fn get_markup(&self) -> String {
        self.formatter().to_markup(self.surface.nodes())
    }

    pub fn get_tokens(&self) -> Vec<TokenEntry> {
        self.formatter().to_token_list(self.surface.nodes())
    }

    pub fn get_plain_text_with_data(&self) -> String {
        self.formatter().to_plain_text_with_data(self.surface.nodes())
    }

    pub fn get_plain_text_with_display(&self) -> String {
        self.formatter().to_plain_text_with_display(self.surface.nodes())
    }

    /// One CSS rule per category
    pub fn stylesheet(&self) -> String {
        self.registry
            .iter()
            .map(|d| category_rule(&self.config.class_prefix, d.key(), d.style()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drop timers, in-flight tickets, cache and dropdown. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.session = Session::Idle;
        self.close();
        self.in_flight.clear();
        self.fetcher.clear();
        self.renderer = None;
        self.destroyed = true;
        log::debug!("[MentionWidget] Destroyed");
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn formatter(&self) -> OutputFormatter<'_> {
        OutputFormatter::new(&self.registry, &self.config)
    }

    fn choose_category(&mut self, key: &str, now: Instant) {
        let Session::ChoosingCategory { anchor, query } = &self.session else {
            return;
        };
        match self.splicer.apply_category_choice(&mut self.surface, anchor, query) {
            Ok(anchor) => {
                self.session = Session::ChoosingRecord {
                    anchor,
                    category: key.to_string(),
                    query: String::new(),
                };
                self.request_records(key, "", now, true);
            }
            Err(e) => {
                log::debug!("[MentionWidget] Category choice refused: {}", e);
                self.session = Session::Idle;
                self.close();
            }
        }
    }

    fn choose_record(&mut self, record: &Record) {
        let Session::ChoosingRecord { anchor, category, query } = &self.session else {
            return;
        };
        let result = match self.registry.get(category) {
            Some(descriptor) => {
                let token = SpliceEngine::token_for(descriptor, record);
                self.splicer
                    .apply_record_choice(&mut self.surface, anchor, query, token)
                    .map(|_| ())
            }
            None => Ok(()),
        };
        if let Err(e) = result {
            log::debug!("[MentionWidget] Record choice refused: {}", e);
        }
        self.session = Session::Idle;
        self.close();
    }

    /// Show records for the live record session. `immediate` skips the
    /// debounce window (category just chosen).
    fn request_records(&mut self, category: &str, query: &str, now: Instant, immediate: bool) {
        let Some(descriptor) = self.registry.get(category) else {
            self.session = Session::Idle;
            self.close();
            return;
        };

        match self.fetcher.plan(descriptor, query) {
            FetchPlan::Ready(FetchOutcome { records, failure }) => {
                self.debouncer.cancel();
                self.last_failure = failure;
                let options = record_options(descriptor, records);
                self.fetched = options.clone();
                self.options.replace(options);
            }
            FetchPlan::Remote { url } => {
                let pending = PendingFetch {
                    category: category.to_string(),
                    query: query.to_string(),
                    url,
                };
                if immediate {
                    self.fetched.clear();
                    self.options.begin_loading();
                    self.debouncer.schedule_now(now, pending);
                } else {
                    self.debouncer.schedule(now, pending);
                    // Until the fetch lands, narrow the last result to the live query
                    if !self.options.is_loading() {
                        let narrowed = self
                            .fetched
                            .iter()
                            .filter(|option| contains_folded(option.label(), query))
                            .cloned()
                            .collect();
                        self.options.replace(narrowed);
                    }
                }
            }
        }
        self.render();
    }

    fn close(&mut self) {
        self.debouncer.cancel();
        self.options.close();
        self.fetched.clear();
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.hide();
        }
    }

    fn render(&mut self) {
        let view = self.dropdown();
        if let Some(renderer) = self.renderer.as_mut() {
            if view.visible {
                renderer.render(&view);
            } else {
                renderer.hide();
            }
        }
    }
}

fn record_options(descriptor: &CategoryDescriptor, records: Vec<Record>) -> Vec<MentionOption> {
    records
        .into_iter()
        .map(|record| MentionOption::Record {
            label: descriptor.display(&record),
            record,
        })
        .collect()
}
