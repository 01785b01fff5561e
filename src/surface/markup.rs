//! HTML serialization helpers for surface content

use std::collections::HashSet;

use super::Token;
use crate::config::TokenStyle;

/// Escape text content
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value
pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// `data-*` attribute name for a record field: lowercase, `[a-z0-9-]` only
pub fn data_attribute(field: &str) -> String {
    let name: String = field
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("data-{}", name)
}

/// CSS class of tokens in `category`
pub fn category_class(class_prefix: &str, category: &str) -> String {
    let slug: String = category
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("{}-{}", class_prefix, slug)
}

/// `<span>` element for a token. Fields whose attribute name is already
/// taken (by `data-category` or an earlier field) are left out.
pub fn render_token(token: &Token, style: &TokenStyle, class_prefix: &str) -> String {
    let mut html = format!(
        "<span class=\"{} {}\" contenteditable=\"false\" data-category=\"{}\"",
        class_prefix,
        category_class(class_prefix, &token.category),
        escape_attr(&token.category)
    );
    let mut taken: HashSet<String> = HashSet::from(["data-category".to_string()]);
    for (field, value) in &token.attributes {
        let name = data_attribute(field);
        if !taken.insert(name.clone()) {
            continue;
        }
        html.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
    }
    html.push_str(&format!(
        " style=\"{}\">{}</span>",
        escape_attr(&style.to_css()),
        escape_text(&token.text)
    ));
    html
}

/// One CSS rule for a category's tokens
pub fn category_rule(class_prefix: &str, category: &str, style: &TokenStyle) -> String {
    format!(".{} {{ {} }}", category_class(class_prefix, category), style.to_css())
}
