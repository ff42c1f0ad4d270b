//! Browser tests for the exported bindings
//!
//! Run with `wasm-pack test --headless --firefox wasm`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use stocktrack_wasm::{
    apply_sold_item_change, compute_period_analytics, credentials_error, is_known_sale_source, normalize_date,
    pending_remaining, preview_markups,
};

wasm_bindgen_test_configure!(run_in_browser);

const SOLD: &str = r#"[{
    "id": "6f1c1e38-5a4e-4c43-9d7d-9f3f0a1b2c3d",
    "stock_item_id": null,
    "name": "Vaza", "category": "", "description": "Vaza", "unit": "buc",
    "quantity_sold": 1, "sale_price": "25", "total_value": "25",
    "sold_by": "ana@example.com",
    "sold_date": "2025-07-18T21:45:00Z",
    "source": "Instagram",
    "created_at": "2025-07-18T21:45:00Z"
}]"#;

#[wasm_bindgen_test]
fn analytics_uses_local_day_in_summer_time() {
    // 2025-07-19T09:00:00Z; the sale was at 00:45 local that day
    let now_ms = 1_752_915_600_000.0;
    let json = compute_period_analytics("day", now_ms, "Europe/Bucharest", "[]", SOLD).unwrap();
    let report: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(report["transaction_count"], 1);
    assert_eq!(report["series"][0]["key"], "2025-07-19");
}

#[wasm_bindgen_test]
fn analytics_rejects_unknown_timezone() {
    assert!(compute_period_analytics("day", 0.0, "Mars/Olympus", "[]", "[]").is_err());
}

#[wasm_bindgen_test]
fn live_delete_removes_row() {
    let change = r#"{"type": "delete", "id": "6f1c1e38-5a4e-4c43-9d7d-9f3f0a1b2c3d"}"#;
    assert_eq!(apply_sold_item_change(SOLD, change).unwrap(), "[]");
}

#[wasm_bindgen_test]
fn form_helpers() {
    assert_eq!(normalize_date("18-07-2025"), "2025-07-18");
    assert_eq!(pending_remaining(10, 3), 7);
    assert!(is_known_sale_source("TikTok"));
    assert!(credentials_error("ana@example.com", "x").is_some());
    assert!(preview_markups("20").is_some());
}
