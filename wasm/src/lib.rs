//! WebAssembly module for Stocktrack
//!
//! Provides client-side computation for:
//! - Period analytics over the loaded stock and sales
//! - Applying live sold-item changes to the local list
//! - Invoice date normalization and price markups for the forms

use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;

use shared::analytics::{compute_analytics, Period};
use shared::validation::{parse_price_input, validate_email, validate_password, validate_sale_source};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("stocktrack-wasm ready"));
}

fn analytics_json(
    period: &str,
    now_ms: f64,
    timezone: &str,
    stock_json: &str,
    sold_json: &str,
) -> Result<String, String> {
    let period: Period = period.parse().map_err(|e| format!("{}", e))?;
    let now = Utc
        .timestamp_millis_opt(now_ms as i64)
        .single()
        .ok_or_else(|| format!("Invalid timestamp: {}", now_ms))?;
    let tz: Tz = timezone
        .parse()
        .map_err(|e| format!("Invalid timezone {}: {}", timezone, e))?;
    let stock: Vec<StockItem> =
        serde_json::from_str(stock_json).map_err(|e| format!("Invalid stock JSON: {}", e))?;
    let sold: Vec<SoldItem> =
        serde_json::from_str(sold_json).map_err(|e| format!("Invalid sold items JSON: {}", e))?;

    let report = compute_analytics(period, now, tz, &stock, &sold);
    serde_json::to_string(&report).map_err(|e| e.to_string())
}

/// Compute the analytics report for `period` from the loaded lists.
///
/// `now_ms` is `Date.now()`; `timezone` is the business IANA zone, e.g. `Europe/Bucharest`.
#[wasm_bindgen]
pub fn compute_period_analytics(
    period: &str,
    now_ms: f64,
    timezone: &str,
    stock_json: &str,
    sold_json: &str,
) -> Result<String, JsValue> {
    analytics_json(period, now_ms, timezone, stock_json, sold_json).map_err(|e| JsValue::from_str(&e))
}

fn apply_change_json(sold_json: &str, change_json: &str) -> Result<String, String> {
    let mut sold: Vec<SoldItem> =
        serde_json::from_str(sold_json).map_err(|e| format!("Invalid sold items JSON: {}", e))?;
    let change: SoldItemChange =
        serde_json::from_str(change_json).map_err(|e| format!("Invalid change JSON: {}", e))?;
    apply_change(&mut sold, change);
    serde_json::to_string(&sold).map_err(|e| e.to_string())
}

/// Apply one live feed message to the newest-first sold list
#[wasm_bindgen]
pub fn apply_sold_item_change(sold_json: &str, change_json: &str) -> Result<String, JsValue> {
    apply_change_json(sold_json, change_json).map_err(|e| JsValue::from_str(&e))
}

/// Normalize an extracted invoice date to `YYYY-MM-DD` when possible
#[wasm_bindgen]
pub fn normalize_date(raw: &str) -> String {
    normalize_invoice_date(raw)
}

fn markups_json(initial_price: &str) -> Option<String> {
    let price = parse_price_input(initial_price)?;
    serde_json::to_string(&markup_prices(price)).ok()
}

/// Home and final prices for the add-stock form. Accepts `12,50` or `12.50`.
#[wasm_bindgen]
pub fn preview_markups(initial_price: &str) -> Option<String> {
    markups_json(initial_price)
}

/// Pieces still to sell in a pending row
#[wasm_bindgen]
pub fn pending_remaining(qty_total: i32, qty_sold: i32) -> i32 {
    remaining_pieces(qty_total, qty_sold)
}

/// First problem with the sign-in form, if any
#[wasm_bindgen]
pub fn credentials_error(email: &str, password: &str) -> Option<String> {
    validate_email(email)
        .and_then(|_| validate_password(password))
        .err()
        .map(str::to_string)
}

#[wasm_bindgen]
pub fn is_known_sale_source(source: &str) -> bool {
    validate_sale_source(source).is_ok()
}
