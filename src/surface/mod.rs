//! Text surface abstraction
//!
//! The widget never touches a rendering API directly. It sees an ordered
//! sequence of inline nodes (text runs and opaque tokens), a caret that sits
//! inside a text run, and one mutation primitive: `replace_range`.
//!
//! - `document.rs` - `Document`, the in-memory surface used by the WASM layer and tests
//! - `markup.rs` - escaping and token markup helpers

pub mod document;
pub mod markup;

pub use document::*;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::SpliceError;

// =============================================================================
// Types
// =============================================================================

/// Stable identity of a text run. Never reused within one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RunId(pub u64);

/// Caret position: a character offset inside a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Caret {
    pub run: RunId,
    pub offset: usize,
}

impl Caret {
    pub fn new(run: RunId, offset: usize) -> Self {
        Self { run, offset }
    }
}

/// A contiguous, editable run of plain text
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub id: RunId,
    pub text: String,
    /// Bumped on every mutation of this run
    pub revision: u64,
}

impl TextRun {
    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// An inserted mention. Opaque to editing: it is removed whole or not at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub category: String,
    /// Visible text (`prefix + display(record)`)
    pub text: String,
    /// Record fields as string attributes
    pub attributes: BTreeMap<String, String>,
}

/// Node of the surface content
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(TextRun),
    Token(Token),
}

/// Content handed to `replace_range`
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Token(Token),
}

// =============================================================================
// Trait
// =============================================================================

/// What the widget needs from the hosting text surface
pub trait TextSurface {
    /// Current caret, `None` when the surface has no focus/selection
    fn caret(&self) -> Option<Caret>;

    fn set_caret(&mut self, caret: Caret) -> Result<(), SpliceError>;

    fn run(&self, id: RunId) -> Option<&TextRun>;

    /// Replace characters `start..end` of `run` with `replacement`.
    ///
    /// Leading text items extend the run itself; tokens and any later text
    /// become new sibling nodes, and the untouched tail of the run becomes a
    /// fresh sibling run. Returns (and places) the caret at the end of the
    /// replacement.
    fn replace_range(
        &mut self,
        run: RunId,
        start: usize,
        end: usize,
        replacement: Vec<Inline>,
    ) -> Result<Caret, SpliceError>;

    /// All nodes in document order
    fn nodes(&self) -> &[Node];
}

/// Byte index of the `offset`-th character (or `text.len()` past the end)
pub(crate) fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}
