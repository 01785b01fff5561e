//! Autocomplete Controller: dropdown state and keyboard navigation
//!
//! # Architecture
//! - `render.rs` - DropdownView + ListRenderer sink
//! - `placement.rs` - below/above/clamped popup placement
//!
//! `OptionList` owns the options and the highlight. Placeholder rows are
//! never part of `options`, so navigation and confirmation skip them for free.

pub mod placement;
pub mod render;

pub use placement::*;
pub use render::*;

use crate::registry::Record;

/// A selectable dropdown entry
#[derive(Debug, Clone, PartialEq)]
pub enum MentionOption {
    Category { key: String, label: String },
    Record { label: String, record: Record },
}

impl MentionOption {
    pub fn label(&self) -> &str {
        match self {
            MentionOption::Category { label, .. } | MentionOption::Record { label, .. } => label,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OptionList {
    options: Vec<MentionOption>,
    highlighted: Option<usize>,
    open: bool,
    loading: bool,
}

impl OptionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `options`, highlighting the first one
    pub fn replace(&mut self, options: Vec<MentionOption>) {
        self.highlighted = if options.is_empty() { None } else { Some(0) };
        self.options = options;
        self.open = true;
        self.loading = false;
    }

    /// Open with no options while records are on their way
    pub fn begin_loading(&mut self) {
        self.options.clear();
        self.highlighted = None;
        self.open = true;
        self.loading = true;
    }

    pub fn close(&mut self) {
        self.options.clear();
        self.highlighted = None;
        self.open = false;
        self.loading = false;
    }

    /// Move the highlight by `delta`, wrapping around. No-op when empty.
    pub fn navigate(&mut self, delta: isize) {
        let len = self.options.len();
        if len == 0 {
            return;
        }
        let next = match self.highlighted {
            Some(current) => (current as isize + delta).rem_euclid(len as isize) as usize,
            None if delta < 0 => len - 1,
            None => 0,
        };
        self.highlighted = Some(next);
    }

    /// Highlight `index` (mouse over). Returns false for an out-of-range index.
    pub fn hover(&mut self, index: usize) -> bool {
        if index >= self.options.len() {
            return false;
        }
        self.highlighted = Some(index);
        true
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlighted_option(&self) -> Option<&MentionOption> {
        self.highlighted.and_then(|i| self.options.get(i))
    }

    pub fn option(&self, index: usize) -> Option<&MentionOption> {
        self.options.get(index)
    }

    pub fn options(&self) -> &[MentionOption] {
        &self.options
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Current view. An open, empty list shows exactly one placeholder row.
    pub fn view(&self, no_results: &str, loading: &str) -> DropdownView {
        if !self.open {
            return DropdownView::hidden();
        }

        let entries = if self.options.is_empty() {
            let label = if self.loading { loading } else { no_results };
            vec![DropdownEntry::Placeholder { label: label.to_string() }]
        } else {
            self.options
                .iter()
                .enumerate()
                .map(|(index, option)| DropdownEntry::Option {
                    index,
                    label: option.label().to_string(),
                    highlighted: self.highlighted == Some(index),
                })
                .collect()
        };

        DropdownView { visible: true, entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(keys: &[&str]) -> Vec<MentionOption> {
        keys.iter()
            .map(|k| MentionOption::Category { key: k.to_string(), label: k.to_string() })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Requirement 1: Navigation wraps circularly
    // -------------------------------------------------------------------------
    #[test]
    fn test_navigate_wraps() {
        let mut list = OptionList::new();
        list.replace(categories(&["a", "b", "c"]));
        assert_eq!(list.highlighted(), Some(0));

        list.navigate(-1);
        assert_eq!(list.highlighted(), Some(2));
        list.navigate(1);
        assert_eq!(list.highlighted(), Some(0));
        list.navigate(1);
        list.navigate(1);
        assert_eq!(list.highlighted_option().map(MentionOption::label), Some("c"));
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Empty list is a no-op with one placeholder row
    // -------------------------------------------------------------------------
    #[test]
    fn test_empty_list_shows_placeholder() {
        let mut list = OptionList::new();
        list.replace(Vec::new());
        list.navigate(1);

        assert_eq!(list.highlighted(), None);
        let view = list.view("No results", "Loading...");
        assert!(view.visible);
        assert_eq!(view.entries, vec![DropdownEntry::Placeholder { label: "No results".into() }]);
        assert!(view.option_labels().is_empty());
    }

    #[test]
    fn test_loading_placeholder() {
        let mut list = OptionList::new();
        list.begin_loading();
        assert_eq!(list.view("No results", "Loading...").placeholder(), Some("Loading..."));

        list.replace(categories(&["x"]));
        assert!(!list.is_loading());
        assert_eq!(list.view("No results", "Loading...").option_labels(), vec!["x"]);
    }

    // -------------------------------------------------------------------------
    // Requirement 3: Hover moves the highlight, close hides everything
    // -------------------------------------------------------------------------
    #[test]
    fn test_hover_and_close() {
        let mut list = OptionList::new();
        list.replace(categories(&["a", "b"]));

        assert!(list.hover(1));
        assert!(!list.hover(5));
        assert_eq!(list.view("", "").highlighted(), Some(1));

        list.close();
        assert!(!list.is_open());
        assert_eq!(list.view("No results", ""), DropdownView::hidden());
    }
}
