//! End-to-end scenarios driving `MentionWidget` over a `Document`


use instant::Instant;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::autocomplete::{DropdownView, ListRenderer};
use crate::config::WidgetConfig;
use crate::registry::{CategoryConfig, CategorySpec};
use crate::surface::Document;
use crate::widget::MentionWidget;

pub(crate) const USERS_URL: &str = "https://api.test/users?q=";

/// `{ colors: ["Red", "Green"], numbers: ["One", "Two"] }`
pub(crate) fn colors_and_numbers() -> MentionWidget {
    MentionWidget::new(
        Document::new(),
        vec![
            ("colors", CategorySpec::list(vec![json!("Red"), json!("Green")])),
            ("numbers", CategorySpec::list(vec![json!("One"), json!("Two")])),
        ],
        WidgetConfig::default(),
    )
    .unwrap()
}

/// Remote `users` next to static `colors`
pub(crate) fn users_and_colors() -> MentionWidget {
    MentionWidget::new(
        Document::new(),
        vec![
            (
                "users",
                CategorySpec::Config(CategoryConfig::remote(USERS_URL).label("Users").prefix("@")),
            ),
            ("colors", CategorySpec::list(vec![json!("Red"), json!("Green")])),
        ],
        WidgetConfig::default(),
    )
    .unwrap()
}

/// Type `text` one character at a time, all at `now`
pub(crate) fn type_text(widget: &mut MentionWidget, text: &str, now: Instant) {
    for c in text.chars() {
        widget.surface_mut().insert_text(&c.to_string()).unwrap();
        widget.handle_input(now);
    }
}

pub(crate) fn backspace(widget: &mut MentionWidget, now: Instant) {
    widget.surface_mut().delete_backward().unwrap();
    widget.handle_input(now);
}

pub(crate) fn ms(start: Instant, millis: u64) -> Instant {
    start + Duration::from_millis(millis)
}

pub(crate) fn labels(widget: &MentionWidget) -> Vec<String> {
    widget
        .dropdown()
        .option_labels()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Drawn {
    Shown(DropdownView),
    Hidden,
}

/// Renderer that remembers every call
#[derive(Clone, Default)]
pub(crate) struct RecordingRenderer {
    pub calls: Rc<RefCell<Vec<Drawn>>>,
}

impl RecordingRenderer {
    pub fn last(&self) -> Option<Drawn> {
        self.calls.borrow().last().cloned()
    }
}

impl ListRenderer for RecordingRenderer {
    fn render(&mut self, view: &DropdownView) {
        self.calls.borrow_mut().push(Drawn::Shown(view.clone()));
    }

    fn hide(&mut self) {
        self.calls.borrow_mut().push(Drawn::Hidden);
    }
}
