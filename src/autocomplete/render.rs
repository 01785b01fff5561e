//! Dropdown view model and the renderer sink it is handed to

use serde::Serialize;

/// One visible row of the dropdown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropdownEntry {
    /// Selectable option; `index` is what `select`/`hover` take
    Option {
        index: usize,
        label: String,
        highlighted: bool,
    },
    /// Non-selectable row ("No results", "Loading...")
    Placeholder { label: String },
}

/// Everything a renderer needs to draw the dropdown
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DropdownView {
    pub visible: bool,
    pub entries: Vec<DropdownEntry>,
}

impl DropdownView {
    pub fn hidden() -> Self {
        Self::default()
    }

    /// Labels of selectable entries, in order
    pub fn option_labels(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                DropdownEntry::Option { label, .. } => Some(label.as_str()),
                DropdownEntry::Placeholder { .. } => None,
            })
            .collect()
    }

    /// Label of the placeholder row, if that is what is shown
    pub fn placeholder(&self) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            DropdownEntry::Placeholder { label } => Some(label.as_str()),
            DropdownEntry::Option { .. } => None,
        })
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.entries.iter().find_map(|entry| match entry {
            DropdownEntry::Option { index, highlighted: true, .. } => Some(*index),
            _ => None,
        })
    }
}

/// Sink that draws the dropdown. Positioning is up to the implementor
/// (see `place_dropdown`).
pub trait ListRenderer {
    fn render(&mut self, view: &DropdownView);

    fn hide(&mut self);
}
