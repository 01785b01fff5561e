//! Output Formatter: read-only projections of surface content
//!
//! Every projection is recomputed from the nodes on each call; nothing is
//! cached, so two calls without an edit in between always agree.

use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Range;

use crate::config::{TokenStyle, WidgetConfig};
use crate::registry::{Record, Registry};
use crate::surface::markup::{escape_text, render_token};
use crate::surface::{Node, Token};

/// One inserted mention as seen by the host application
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenEntry {
    pub category: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl From<&Token> for TokenEntry {
    fn from(token: &Token) -> Self {
        Self {
            category: token.category.clone(),
            fields: token.attributes.clone(),
        }
    }
}

pub struct OutputFormatter<'a> {
    registry: &'a Registry,
    config: &'a WidgetConfig,
}

impl<'a> OutputFormatter<'a> {
    pub fn new(registry: &'a Registry, config: &'a WidgetConfig) -> Self {
        Self { registry, config }
    }

    fn style_for(&self, category: &str) -> &TokenStyle {
        self.registry
            .get(category)
            .map(|d| d.style())
            .unwrap_or(&self.config.default_style)
    }

    /// Serialized surface content: escaped text with one `<span>` per token
    pub fn to_markup(&self, nodes: &[Node]) -> String {
        nodes
            .iter()
            .map(|node| match node {
                Node::Text(run) => escape_text(&run.text),
                Node::Token(token) => {
                    render_token(token, self.style_for(&token.category), &self.config.class_prefix)
                }
            })
            .collect()
    }

    /// Tokens in document order
    pub fn to_token_list(&self, nodes: &[Node]) -> Vec<TokenEntry> {
        nodes
            .iter()
            .filter_map(|node| match node {
                Node::Token(token) => Some(TokenEntry::from(token)),
                Node::Text(_) => None,
            })
            .collect()
    }

    /// Plain text with each token's text replaced by its data as JSON
    pub fn to_plain_text_with_data(&self, nodes: &[Node]) -> String {
        substitute_tokens(nodes, |token| {
            serde_json::to_string(&TokenEntry::from(token)).unwrap_or_else(|e| {
                log::warn!("[OutputFormatter] Failed to serialize token: {}", e);
                token.text.clone()
            })
        })
    }

    /// Plain text with each token's text re-derived from its stored attributes
    pub fn to_plain_text_with_display(&self, nodes: &[Node]) -> String {
        substitute_tokens(nodes, |token| match self.registry.get(&token.category) {
            Some(descriptor) => descriptor.display(&Record::from_attributes(&token.attributes)),
            None => token.text.clone(),
        })
    }
}

/// Render plain text, then splice replacements in from the last token to the
/// first so earlier byte spans stay valid.
fn substitute_tokens<F>(nodes: &[Node], mut replacement: F) -> String
where
    F: FnMut(&Token) -> String,
{
    let mut text = String::new();
    let mut spans: Vec<(Range<usize>, &Token)> = Vec::new();
    for node in nodes {
        match node {
            Node::Text(run) => text.push_str(&run.text),
            Node::Token(token) => {
                let start = text.len();
                text.push_str(&token.text);
                spans.push((start..text.len(), token));
            }
        }
    }

    for (span, token) in spans.into_iter().rev() {
        text.replace_range(span, &replacement(token));
    }
    text
}
