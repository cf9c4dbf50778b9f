//! Checks that need a JS engine; run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use serde::Serialize;
use tab_sorter::{Command, Response, SortMethod, extract_domain_key};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_extract_domain_key_exported() {
    assert_eq!(extract_domain_key("https://mail.example.com/z"), "example.com");
    assert_eq!(extract_domain_key("nonsense"), "unknown");
}

#[wasm_bindgen_test]
fn test_request_round_trips_through_js() {
    let request = serde_json::json!({"action": "sortTabsMove", "method": "domain"});
    let js = request
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap();
    let back: serde_json::Value = serde_wasm_bindgen::from_value(js).unwrap();

    assert_eq!(
        Command::from_request(&back).unwrap(),
        Command::SortTabsMove { method: Some(SortMethod::Domain.to_string()) }
    );
}

#[wasm_bindgen_test]
fn test_response_becomes_plain_object() {
    let response = Response {
        success: false,
        message: None,
        error: Some("No tabs to export".to_string()),
    };
    let js = serde_wasm_bindgen::to_value(&response).unwrap();

    assert!(js.is_object());
    let back: Response = serde_wasm_bindgen::from_value(js).unwrap();
    assert_eq!(back, response);
}
