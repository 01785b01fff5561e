//! SpliceEngine: writes a session's outcome into the surface
//!
//! Both operations work from the anchor captured at detection time and
//! refuse to touch the surface when the run has changed since then.

use crate::error::SpliceError;
use crate::registry::{CategoryDescriptor, Record};
use crate::session::Anchor;
use crate::surface::{Caret, Inline, TextSurface, Token};

#[derive(Debug, Clone, Copy)]
pub struct SpliceEngine {
    trigger: char,
    separator: char,
}

impl SpliceEngine {
    pub fn new(trigger: char, separator: char) -> Self {
        Self { trigger, separator }
    }

    /// Build the token for `record` in `descriptor`'s category
    pub fn token_for(descriptor: &CategoryDescriptor, record: &Record) -> Token {
        let mut attributes = record.to_attributes();
        attributes.remove("category");
        Token {
            category: descriptor.key().to_string(),
            text: descriptor.token_text(record),
            attributes,
        }
    }

    fn check<S: TextSurface + ?Sized>(
        &self,
        surface: &S,
        anchor: &Anchor,
        query: &str,
    ) -> Result<usize, SpliceError> {
        let run = surface.run(anchor.run).ok_or(SpliceError::UnknownRun)?;
        if run.revision != anchor.revision {
            return Err(SpliceError::StaleAnchor);
        }
        if run.text.chars().nth(anchor.trigger_offset) != Some(self.trigger) {
            return Err(SpliceError::MissingTrigger);
        }
        let end = anchor.query_end(query);
        if end > run.len() {
            return Err(SpliceError::OutOfBounds);
        }
        Ok(end)
    }

    /// Collapse `trigger + query` to the bare trigger and put the caret after it.
    /// Returns the refreshed anchor for the record phase.
    pub fn apply_category_choice<S: TextSurface + ?Sized>(
        &self,
        surface: &mut S,
        anchor: &Anchor,
        query: &str,
    ) -> Result<Anchor, SpliceError> {
        let end = self.check(surface, anchor, query)?;
        surface.replace_range(
            anchor.run,
            anchor.trigger_offset,
            end,
            vec![Inline::Text(self.trigger.to_string())],
        )?;

        let run = surface.run(anchor.run).ok_or(SpliceError::UnknownRun)?;
        Ok(Anchor {
            run: anchor.run,
            trigger_offset: anchor.trigger_offset,
            revision: run.revision,
        })
    }

    /// Replace `trigger + query` with `token` followed by one separator.
    /// A separator already following the query is absorbed, so the token is
    /// never followed by two. The caret ends up right after the separator.
    pub fn apply_record_choice<S: TextSurface + ?Sized>(
        &self,
        surface: &mut S,
        anchor: &Anchor,
        query: &str,
        token: Token,
    ) -> Result<Caret, SpliceError> {
        let mut end = self.check(surface, anchor, query)?;
        let run = surface.run(anchor.run).ok_or(SpliceError::UnknownRun)?;
        if run.text.chars().nth(end) == Some(self.separator) {
            end += 1;
        }
        surface.replace_range(
            anchor.run,
            anchor.trigger_offset,
            end,
            vec![Inline::Token(token), Inline::Text(self.separator.to_string())],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;
    use crate::detector::TriggerDetector;
    use crate::registry::CategorySpec;
    use crate::surface::{Document, Node};
    use serde_json::json;

    fn engine() -> SpliceEngine {
        SpliceEngine::new('@', ' ')
    }

    fn colors() -> CategoryDescriptor {
        CategoryDescriptor::from_spec(
            "colors",
            CategorySpec::list(vec![json!("Red")]),
            &WidgetConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_category_choice_strips_query() {
        let mut doc = Document::from_text("hi @col");
        let detection = TriggerDetector::new('@').detect(&doc).unwrap();

        let anchor = engine()
            .apply_category_choice(&mut doc, &detection.anchor, &detection.query)
            .unwrap();

        assert_eq!(doc.plain_text(), "hi @");
        assert_eq!(doc.caret(), Some(Caret::new(anchor.run, 4)));
        assert_ne!(anchor.revision, detection.anchor.revision);
    }

    #[test]
    fn test_category_choice_preserves_trailing_text() {
        let mut doc = Document::from_text("hi @col and more");
        let run = doc.caret().unwrap().run;
        doc.set_caret(Caret::new(run, 7)).unwrap();
        let detection = TriggerDetector::new('@').detect(&doc).unwrap();

        engine()
            .apply_category_choice(&mut doc, &detection.anchor, &detection.query)
            .unwrap();

        assert_eq!(doc.plain_text(), "hi @ and more");
        assert_eq!(doc.run(run).unwrap().text, "hi @");
        assert_eq!(doc.run_ids().len(), 2);
    }

    #[test]
    fn test_record_choice_inserts_token_and_separator() {
        let mut doc = Document::from_text("see @Re");
        let detection = TriggerDetector::new('@').detect(&doc).unwrap();
        let record = Record::new().with_field("label", "Red");
        let token = SpliceEngine::token_for(&colors(), &record);

        let caret = engine()
            .apply_record_choice(&mut doc, &detection.anchor, &detection.query, token)
            .unwrap();

        assert_eq!(doc.plain_text(), "see Red ");
        assert_eq!(caret.offset, 1);
        assert_eq!(doc.run(caret.run).unwrap().text, " ");
        match &doc.nodes()[1] {
            Node::Token(token) => {
                assert_eq!(token.category, "colors");
                assert_eq!(token.attributes["label"], "Red");
            }
            other => panic!("expected token, got {:?}", other),
        }
    }

    #[test]
    fn test_record_choice_absorbs_following_separator() {
        let mut doc = Document::from_text("see @ later");
        let run = doc.caret().unwrap().run;
        doc.set_caret(Caret::new(run, 5)).unwrap();
        let detection = TriggerDetector::new('@').detect(&doc).unwrap();
        let record = Record::new().with_field("label", "Red");
        let token = SpliceEngine::token_for(&colors(), &record);

        let caret = engine()
            .apply_record_choice(&mut doc, &detection.anchor, &detection.query, token)
            .unwrap();

        assert_eq!(doc.plain_text(), "see Red later");
        assert_eq!(doc.run(caret.run).unwrap().text, " ");
        assert_eq!(caret.offset, 1);
    }

    #[test]
    fn test_stale_anchor_is_refused() {
        let mut doc = Document::from_text("@Re");
        let detection = TriggerDetector::new('@').detect(&doc).unwrap();
        doc.insert_text("d").unwrap();

        let record = Record::new().with_field("label", "Red");
        let result = engine().apply_record_choice(
            &mut doc,
            &detection.anchor,
            &detection.query,
            SpliceEngine::token_for(&colors(), &record),
        );

        assert_eq!(result, Err(SpliceError::StaleAnchor));
        assert_eq!(doc.plain_text(), "@Red");
        assert_eq!(doc.tokens().count(), 0);
    }

    #[test]
    fn test_token_drops_category_field() {
        let record = Record::new().with_field("label", "Red").with_field("category", "x");
        let token = SpliceEngine::token_for(&colors(), &record);
        assert!(!token.attributes.contains_key("category"));
    }
}
