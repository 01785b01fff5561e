//! Browser smoke tests for the `MentionEditor` binding
//!
//! Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use js_sys::{Array, Object, Reflect};
use mentioncore::MentionEditor;
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn categories() -> JsValue {
    let categories = Object::new();
    let colors = Array::of2(&JsValue::from_str("Red"), &JsValue::from_str("Green"));
    Reflect::set(&categories, &JsValue::from_str("colors"), &colors).unwrap();
    categories.into()
}

#[wasm_bindgen_test]
fn test_insert_token_through_binding() {
    let editor = MentionEditor::new(categories(), JsValue::UNDEFINED).unwrap();

    editor.insert_text("@col").unwrap();
    assert!(editor.handle_key("Enter"));
    assert!(editor.handle_key("Enter"));

    assert_eq!(editor.plain_text(), "Red ");
    let tokens: Array = editor.get_tokens().unwrap().dyn_into().unwrap();
    assert_eq!(tokens.length(), 1);
    let first = tokens.get(0);
    assert_eq!(
        Reflect::get(&first, &JsValue::from_str("category")).unwrap().as_string(),
        Some("colors".to_string())
    );
}

#[wasm_bindgen_test]
fn test_escape_through_binding() {
    let editor = MentionEditor::new(categories(), JsValue::UNDEFINED).unwrap();
    editor.insert_text("hi @c").unwrap();
    assert!(editor.handle_key("Escape"));
    assert_eq!(editor.plain_text(), "hi @c");
    assert_eq!(editor.phase(), "idle");
}

#[wasm_bindgen_test]
fn test_caret_move_closes_session() {
    let editor = MentionEditor::new(categories(), JsValue::UNDEFINED).unwrap();
    editor.insert_text("hello @col").unwrap();
    assert_eq!(editor.phase(), "choosing_category");

    let caret = editor.caret().unwrap();
    let run = Reflect::get(&caret, &JsValue::from_str("run")).unwrap().as_f64().unwrap();
    assert_eq!(
        Reflect::get(&caret, &JsValue::from_str("offset")).unwrap().as_f64(),
        Some(10.0)
    );

    editor.set_caret(run as u32, 2).unwrap();
    assert_eq!(editor.phase(), "idle");
    assert!(editor.set_caret(run as u32, 99).is_err());
}

#[wasm_bindgen_test]
fn test_bad_category_rejected() {
    let categories = Object::new();
    Reflect::set(&categories, &JsValue::from_str("broken"), &JsValue::from_f64(3.0)).unwrap();
    assert!(MentionEditor::new(categories.into(), JsValue::UNDEFINED).is_err());
}
