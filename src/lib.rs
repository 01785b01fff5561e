//! MentionCore: trigger-driven @mention autocomplete for rich-text surfaces
//!
//! A Rust/WASM implementation of the KittClouds mention widget core.
//!
//! # Architecture
//!
//! ## Data
//! - `registry/` - Source Registry: category specs -> `CategoryDescriptor`s
//! - `fetcher/` - Record Fetcher: static filtering, remote planning, cache, debounce
//! - `matching.rs` - Diacritic/case-insensitive matching and query sanitizing
//!
//! ## Editing
//! - `surface/` - `TextSurface` contract, in-memory `Document`, token markup
//! - `detector.rs` - TriggerDetector: nearest trigger before the caret
//! - `session.rs` - Session state machine (Idle / ChoosingCategory / ChoosingRecord)
//! - `splice.rs` - SpliceEngine: category and record choices written into the surface
//!
//! ## Presentation
//! - `autocomplete/` - OptionList controller, dropdown view model, placement
//! - `output.rs` - OutputFormatter: markup, token list, plain-text projections
//! - `widget.rs` - MentionWidget: everything above wired together
//!
//! ## Host
//! - `wasm.rs` - `MentionEditor` bindings
//! - `console.rs` - `log` -> browser console
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { MentionEditor } from 'mentioncore';
//!
//! await init();
//!
//! const editor = new MentionEditor({
//!   colors: ['Red', 'Green'],
//!   users: { data: 'https://api.example.com/users?q=', label: 'Users', prefix: '@' },
//! }, { debounce_ms: 300 });
//!
//! editor.insertText('Hi @col');
//! editor.dropdown();          // { visible: true, entries: [{ kind: 'option', label: 'colors', ... }] }
//! editor.handleKey('Enter');  // category chosen, records listed
//! editor.handleKey('Enter');  // token inserted
//!
//! editor.getTokens();         // [{ category: 'colors', label: 'Red' }]
//! await editor.runFetch(url => fetch(url).then(r => r.ok ? r.json() : Promise.reject(r)));
//! ```

pub mod autocomplete;
pub mod config;
pub mod console;
pub mod detector;
pub mod error;
pub mod fetcher;
pub mod matching;
pub mod output;
pub mod registry;
pub mod session;
pub mod splice;
pub mod surface;
pub mod wasm;
pub mod widget;

#[cfg(test)]
mod tests;

pub use autocomplete::*;
pub use config::*;
pub use detector::*;
pub use error::*;
pub use fetcher::*;
pub use output::*;
pub use registry::*;
pub use session::*;
pub use splice::*;
pub use surface::*;
pub use wasm::*;
pub use widget::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Install the panic hook and the console logger
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    console::init(log::LevelFilter::Warn);
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("mentioncore v{}", env!("CARGO_PKG_VERSION"))
}
