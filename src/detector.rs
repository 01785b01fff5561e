//! TriggerDetector: finds the live trigger before the caret
//!
//! Only the text run holding the caret is scanned. Tokens are separate nodes,
//! so a session can never anchor inside one, and moving the caret to another
//! run drops whatever trigger the previous run had.

use serde::Serialize;

use crate::session::Anchor;
use crate::surface::TextSurface;

/// A trigger with the query typed after it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub anchor: Anchor,
    /// Text between the trigger and the caret
    pub query: String,
}

#[derive(Debug, Clone, Copy)]
pub struct TriggerDetector {
    trigger: char,
}

impl TriggerDetector {
    pub fn new(trigger: char) -> Self {
        Self { trigger }
    }

    pub fn trigger(&self) -> char {
        self.trigger
    }

    /// Nearest trigger before the caret in the caret's run, if any
    pub fn detect<S: TextSurface + ?Sized>(&self, surface: &S) -> Option<Detection> {
        let caret = surface.caret()?;
        let run = surface.run(caret.run)?;

        let before: Vec<char> = run.text.chars().take(caret.offset).collect();
        let trigger_offset = before.iter().rposition(|&c| c == self.trigger)?;
        let query: String = before[trigger_offset + 1..].iter().collect();

        Some(Detection {
            anchor: Anchor {
                run: run.id,
                trigger_offset,
                revision: run.revision,
            },
            query,
        })
    }
}
