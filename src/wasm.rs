//! WASM bindings: `MentionEditor`
//!
//! Wraps a `MentionWidget<Document>`. The host mirrors its contenteditable
//! edits and caret moves into the editor (`insertText`, `deleteBackward`,
//! `setCaret`), reads the dropdown
//! view back, and either drives fetches itself (`pollFetch` + `resolveFetch`)
//! or hands over a fetch function (`runFetch`).

use instant::Instant;
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::autocomplete::{place_dropdown, CaretRect, Size};
use crate::config::WidgetConfig;
use crate::error::TransportFailure;
use crate::registry::{CategorySpec, DisplayFnHandle, ParseFnHandle, Record};
use crate::surface::{Caret, Document, RunId, TextSurface};
use crate::widget::{Key, MentionWidget};

const PARSE_KEY: &str = "parseResponse";
const DISPLAY_KEY: &str = "display";

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn js_message(error: &JsValue) -> String {
    if let Some(e) = error.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    error.as_string().unwrap_or_else(|| format!("{:?}", error))
}

/// Rejections carrying a numeric `status` are treated as HTTP failures
fn transport_failure(error: &JsValue) -> TransportFailure {
    let status = js_sys::Reflect::get(error, &JsValue::from_str("status"))
        .ok()
        .and_then(|v| v.as_f64());
    match status {
        Some(code) => TransportFailure::Status { code: code as u16 },
        None => TransportFailure::Network { message: js_message(error) },
    }
}

fn payload_from_js(payload: JsValue) -> Result<Value, TransportFailure> {
    serde_wasm_bindgen::from_value(payload)
        .map_err(|e| TransportFailure::InvalidJson { message: e.to_string() })
}

fn function_field(object: &JsValue, key: &str) -> Option<js_sys::Function> {
    js_sys::Reflect::get(object, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
}

fn parse_handle(function: js_sys::Function) -> ParseFnHandle {
    ParseFnHandle(Rc::new(move |payload: &Value| -> Result<Vec<Value>, String> {
        let arg = to_js(payload).map_err(|e| js_message(&e))?;
        let result = function
            .call1(&JsValue::NULL, &arg)
            .map_err(|e| js_message(&e))?;
        serde_wasm_bindgen::from_value(result).map_err(|e| e.to_string())
    }))
}

fn display_handle(function: js_sys::Function) -> DisplayFnHandle {
    DisplayFnHandle(Rc::new(move |record: &Record| -> String {
        let result = to_js(record).and_then(|arg| function.call1(&JsValue::NULL, &arg));
        match result {
            Ok(label) => label.as_string().unwrap_or_default(),
            Err(e) => {
                log::warn!("[MentionEditor] display() failed: {}", js_message(&e));
                String::new()
            }
        }
    }))
}

/// Read one category. Closures are split off before the data part is
/// converted, since functions have no JSON form.
fn category_from_js(key: &str, raw: &JsValue) -> Result<CategorySpec, JsValue> {
    let is_config = raw.is_object() && !js_sys::Array::is_array(raw);
    let (parse, display, data) = if is_config {
        let copy = js_sys::Object::assign(&js_sys::Object::new(), raw.unchecked_ref());
        let parse = function_field(raw, PARSE_KEY);
        let display = function_field(raw, DISPLAY_KEY);
        for name in [PARSE_KEY, DISPLAY_KEY] {
            js_sys::Reflect::delete_property(&copy, &JsValue::from_str(name))?;
        }
        (parse, display, JsValue::from(copy))
    } else {
        (None, None, raw.clone())
    };

    let value: Value = serde_wasm_bindgen::from_value(data)
        .map_err(|e| JsValue::from_str(&format!("Category '{}': {}", key, e)))?;
    let spec = CategorySpec::from_json(key, &value).map_err(|e| JsValue::from_str(&e.to_string()))?;

    Ok(match spec {
        CategorySpec::Config(mut config) => {
            config.parse = parse.map(parse_handle);
            config.display = display.map(display_handle);
            CategorySpec::Config(config)
        }
        other => other,
    })
}

#[wasm_bindgen]
pub struct MentionEditor {
    inner: Rc<RefCell<MentionWidget<Document>>>,
}

#[wasm_bindgen]
impl MentionEditor {
    /// `categories`: `{ key: url | list | { data, label?, prefix?, style?, fields?, display?, parseResponse? } }`
    /// `config`: partial `WidgetConfig`, or undefined
    #[wasm_bindgen(constructor)]
    pub fn new(categories: JsValue, config: JsValue) -> Result<MentionEditor, JsValue> {
        let config: WidgetConfig = if config.is_undefined() || config.is_null() {
            WidgetConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };

        let object = categories
            .dyn_ref::<js_sys::Object>()
            .ok_or_else(|| JsValue::from_str("categories must be an object"))?;
        let mut specs = Vec::new();
        for key in js_sys::Object::keys(object).iter() {
            let key = key
                .as_string()
                .ok_or_else(|| JsValue::from_str("category keys must be strings"))?;
            let raw = js_sys::Reflect::get(object, &JsValue::from_str(&key))?;
            let spec = category_from_js(&key, &raw)?;
            specs.push((key, spec));
        }

        let widget = MentionWidget::new(Document::new(), specs, config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(MentionEditor {
            inner: Rc::new(RefCell::new(widget)),
        })
    }

    // ========================================================================
    // Editing
    // ========================================================================

    #[wasm_bindgen(js_name = insertText)]
    pub fn insert_text(&self, text: &str) -> Result<(), JsValue> {
        let mut widget = self.inner.borrow_mut();
        widget
            .surface_mut()
            .insert_text(text)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        widget.handle_input(Instant::now());
        Ok(())
    }

    /// Backspace. Returns false at the start of the document.
    #[wasm_bindgen(js_name = deleteBackward)]
    pub fn delete_backward(&self) -> Result<bool, JsValue> {
        let mut widget = self.inner.borrow_mut();
        let deleted = widget
            .surface_mut()
            .delete_backward()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        widget.handle_input(Instant::now());
        Ok(deleted)
    }

    /// Mirror a host caret move (click, arrow keys). `run` comes from
    /// `caret()` or `runIds()`; `offset` counts characters.
    #[wasm_bindgen(js_name = setCaret)]
    pub fn set_caret(&self, run: u32, offset: usize) -> Result<(), JsValue> {
        let mut widget = self.inner.borrow_mut();
        widget
            .surface_mut()
            .set_caret(Caret::new(RunId(u64::from(run)), offset))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        widget.handle_input(Instant::now());
        Ok(())
    }

    /// `{ run, offset }`, or `null` without focus
    #[wasm_bindgen]
    pub fn caret(&self) -> Result<JsValue, JsValue> {
        match self.inner.borrow().surface().caret() {
            Some(caret) => to_js(&caret),
            None => Ok(JsValue::NULL),
        }
    }

    /// Text run ids in document order
    #[wasm_bindgen(js_name = runIds)]
    pub fn run_ids(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.borrow().surface().run_ids())
    }

    #[wasm_bindgen(js_name = moveToEnd)]
    pub fn move_to_end(&self) {
        let mut widget = self.inner.borrow_mut();
        widget.surface_mut().move_to_end();
        widget.handle_input(Instant::now());
    }

    #[wasm_bindgen]
    pub fn blur(&self) {
        let mut widget = self.inner.borrow_mut();
        widget.surface_mut().blur();
        widget.handle_input(Instant::now());
    }

    #[wasm_bindgen(js_name = plainText)]
    pub fn plain_text(&self) -> String {
        self.inner.borrow().surface().plain_text()
    }

    // ========================================================================
    // Dropdown
    // ========================================================================

    #[wasm_bindgen(js_name = handleInput)]
    pub fn handle_input(&self) {
        self.inner.borrow_mut().handle_input(Instant::now());
    }

    /// Returns true when the host should `preventDefault()`
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&self, key: &str) -> bool {
        self.inner
            .borrow_mut()
            .handle_key(Key::from_name(key), Instant::now())
            .is_handled()
    }

    #[wasm_bindgen]
    pub fn select(&self, index: usize) -> bool {
        self.inner.borrow_mut().select(index, Instant::now())
    }

    #[wasm_bindgen]
    pub fn hover(&self, index: usize) -> bool {
        self.inner.borrow_mut().hover(index)
    }

    /// `{ visible, entries: [{ kind: "option", index, label, highlighted } | { kind: "placeholder", label }] }`
    #[wasm_bindgen]
    pub fn dropdown(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.borrow().dropdown())
    }

    #[wasm_bindgen]
    pub fn phase(&self) -> String {
        self.inner.borrow().session().phase_name().to_string()
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// Due fetch request `{ ticket, category, query, url }`, or null
    #[wasm_bindgen(js_name = pollFetch)]
    pub fn poll_fetch(&self) -> Result<JsValue, JsValue> {
        match self.inner.borrow_mut().poll_fetch(Instant::now()) {
            Some(request) => to_js(&request),
            None => Ok(JsValue::NULL),
        }
    }

    /// Milliseconds until `pollFetch` has something, or undefined
    #[wasm_bindgen(js_name = nextFetchDelayMs)]
    pub fn next_fetch_delay_ms(&self) -> Option<f64> {
        let deadline = self.inner.borrow().next_deadline()?;
        let now = Instant::now();
        let delay = if deadline > now { deadline - now } else { Duration::ZERO };
        Some(delay.as_millis() as f64)
    }

    #[wasm_bindgen(js_name = resolveFetch)]
    pub fn resolve_fetch(&self, ticket: u32, payload: JsValue) -> Result<JsValue, JsValue> {
        let result = payload_from_js(payload);
        let resolution = self.inner.borrow_mut().resolve_fetch(ticket as u64, result);
        to_js(&resolution)
    }

    /// Report a failed fetch: an HTTP status, or a network error message
    #[wasm_bindgen(js_name = failFetch)]
    pub fn fail_fetch(&self, ticket: u32, status: Option<u16>, message: Option<String>) -> Result<JsValue, JsValue> {
        let failure = match status {
            Some(code) => TransportFailure::Status { code },
            None => TransportFailure::Network {
                message: message.unwrap_or_default(),
            },
        };
        let resolution = self.inner.borrow_mut().resolve_fetch(ticket as u64, Err(failure));
        to_js(&resolution)
    }

    /// Run the due fetch (if any) through `fetchFn(url) -> Promise<json>`.
    /// Resolves with the fetch resolution, or null when nothing was due.
    #[wasm_bindgen(js_name = runFetch)]
    pub fn run_fetch(&self, fetch_fn: js_sys::Function) -> js_sys::Promise {
        let widget = Rc::clone(&self.inner);
        future_to_promise(async move {
            let request = widget.borrow_mut().poll_fetch(Instant::now());
            let Some(request) = request else {
                return Ok(JsValue::NULL);
            };

            let result = match fetch_fn.call1(&JsValue::NULL, &JsValue::from_str(&request.url)) {
                Ok(value) => match JsFuture::from(js_sys::Promise::resolve(&value)).await {
                    Ok(payload) => payload_from_js(payload),
                    Err(e) => Err(transport_failure(&e)),
                },
                Err(e) => Err(transport_failure(&e)),
            };

            let resolution = widget.borrow_mut().resolve_fetch(request.ticket, result);
            to_js(&resolution)
        })
    }

    #[wasm_bindgen(js_name = lastFailure)]
    pub fn last_failure(&self) -> Result<JsValue, JsValue> {
        match self.inner.borrow().last_failure() {
            Some(failure) => to_js(failure),
            None => Ok(JsValue::NULL),
        }
    }

    // ========================================================================
    // Output
    // ========================================================================

    #[wasm_bindgen(js_name = getMarkup)]
    pub fn get_markup(&self) -> String {
        self.inner.borrow().get_markup()
    }

    #[wasm_bindgen(js_name = getTokens)]
    pub fn get_tokens(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.borrow().get_tokens())
    }

    #[wasm_bindgen(js_name = getPlainTextWithData)]
    pub fn get_plain_text_with_data(&self) -> String {
        self.inner.borrow().get_plain_text_with_data()
    }

    #[wasm_bindgen(js_name = getPlainTextWithDisplay)]
    pub fn get_plain_text_with_display(&self) -> String {
        self.inner.borrow().get_plain_text_with_display()
    }

    /// CSS rules for every category's tokens
    #[wasm_bindgen]
    pub fn stylesheet(&self) -> String {
        self.inner.borrow().stylesheet()
    }

    #[wasm_bindgen]
    pub fn destroy(&self) {
        self.inner.borrow_mut().destroy();
    }
}

/// Popup position for the given caret rect, popup size and viewport size
#[wasm_bindgen(js_name = placeDropdown)]
pub fn place_dropdown_js(caret: JsValue, popup: JsValue, viewport: JsValue) -> Result<JsValue, JsValue> {
    let caret: CaretRect = serde_wasm_bindgen::from_value(caret)?;
    let popup: Size = serde_wasm_bindgen::from_value(popup)?;
    let viewport: Size = serde_wasm_bindgen::from_value(viewport)?;
    to_js(&place_dropdown(caret, popup, viewport))
}

/// Change the console log level ("error", "warn", "info", "debug", "trace", "off")
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let level: log::LevelFilter = level
        .parse()
        .map_err(|_| JsValue::from_str(&format!("Unknown log level '{}'", level)))?;
    crate::console::init(level);
    Ok(())
}
