//! Session: the single in-progress mention of a widget
//!
//! # State machine
//! Idle → ChoosingCategory → ChoosingRecord → Idle
//!
//! "Choosing record" always carries its category, so the combination
//! "choosing record with no category" cannot be expressed.

use serde::Serialize;

use crate::detector::Detection;
use crate::surface::RunId;

/// Where a session's trigger character lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Anchor {
    pub run: RunId,
    /// Character offset of the trigger inside the run
    pub trigger_offset: usize,
    /// Run revision observed when the anchor was captured
    pub revision: u64,
}

impl Anchor {
    /// Same trigger character, regardless of later edits to the run
    pub fn same_trigger(&self, other: &Anchor) -> bool {
        self.run == other.run && self.trigger_offset == other.trigger_offset
    }

    /// Character offset just past `query`
    pub fn query_end(&self, query: &str) -> usize {
        self.trigger_offset + 1 + query.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    ChoosingCategory,
    ChoosingRecord,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    #[default]
    Idle,
    ChoosingCategory {
        anchor: Anchor,
        query: String,
    },
    ChoosingRecord {
        anchor: Anchor,
        category: String,
        query: String,
    },
}

impl Session {
    pub fn phase(&self) -> Phase {
        match self {
            Session::Idle => Phase::Idle,
            Session::ChoosingCategory { .. } => Phase::ChoosingCategory,
            Session::ChoosingRecord { .. } => Phase::ChoosingRecord,
        }
    }

    /// Current state name (for debugging)
    pub fn phase_name(&self) -> &'static str {
        match self.phase() {
            Phase::Idle => "idle",
            Phase::ChoosingCategory => "choosing_category",
            Phase::ChoosingRecord => "choosing_record",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Session::Idle)
    }

    pub fn anchor(&self) -> Option<&Anchor> {
        match self {
            Session::Idle => None,
            Session::ChoosingCategory { anchor, .. } | Session::ChoosingRecord { anchor, .. } => {
                Some(anchor)
            }
        }
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            Session::Idle => None,
            Session::ChoosingCategory { query, .. } | Session::ChoosingRecord { query, .. } => {
                Some(query)
            }
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            Session::ChoosingRecord { category, .. } => Some(category),
            _ => None,
        }
    }

    /// Next session after observing the surface.
    ///
    /// No detection collapses to `Idle`. A detection on the trigger this
    /// record session is anchored to keeps the category; any other trigger
    /// starts over with category selection.
    pub fn advance(&self, detection: Option<&Detection>) -> Session {
        let Some(detection) = detection else {
            return Session::Idle;
        };

        match self {
            Session::ChoosingRecord { anchor, category, .. }
                if anchor.same_trigger(&detection.anchor) =>
            {
                Session::ChoosingRecord {
                    anchor: detection.anchor,
                    category: category.clone(),
                    query: detection.query.clone(),
                }
            }
            _ => Session::ChoosingCategory {
                anchor: detection.anchor,
                query: detection.query.clone(),
            },
        }
    }
}
