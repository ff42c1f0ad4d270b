//! Stock item models and pricing rules

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rows with fewer units than this count as low stock
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Markup applied to the purchase price to get the unit cost ("preț acasă")
pub const HOME_PRICE_MARKUP: Decimal = Decimal::from_parts(135, 0, 0, false, 2);

/// Markup applied to the purchase price to get the final sale price ("preț final")
pub const FINAL_PRICE_MARKUP: Decimal = Decimal::from_parts(170, 0, 0, false, 2);

/// Currency used for manually added stock
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Units offered by the manual add form
pub const STOCK_UNITS: &[&str] = &["set", "buc"];

/// A batch of goods received from a supplier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockItem {
    pub id: Uuid,
    pub line_number: i32,
    pub description: String,
    /// Unit of measure ("set", "buc", ...)
    pub unit: String,
    /// Units on hand
    pub quantity: Decimal,
    /// Unit cost
    pub unit_price: Decimal,
    /// Unit final sale price, used for invoicing
    pub value: Decimal,
    pub vat: Decimal,
    pub supplier: String,
    pub proforma_number: String,
    pub serie: String,
    /// ISO date when the source document date could be parsed, raw text otherwise
    pub date: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    /// Rows at zero are kept in the table but no longer offered for sale
    pub fn is_exhausted(&self) -> bool {
        self.quantity <= Decimal::ZERO
    }

    /// Below the threshold, zeroed rows included
    pub fn is_low_stock(&self) -> bool {
        self.quantity < Decimal::from(LOW_STOCK_THRESHOLD)
    }

    /// Value of the units on hand at cost
    pub fn stock_value(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Stock row to insert, either from invoice intake or from the manual form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewStockItem {
    pub line_number: i32,
    pub description: String,
    pub unit: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub value: Decimal,
    pub vat: Decimal,
    pub supplier: String,
    pub proforma_number: String,
    pub serie: String,
    pub date: String,
    pub currency: String,
}

/// Unit cost and final price derived from a purchase price
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkupPrices {
    pub home_price: Decimal,
    pub final_price: Decimal,
}

/// Apply the standard markups, rounded to whole currency units
pub fn markup_prices(initial_price: Decimal) -> MarkupPrices {
    let round = |d: Decimal| d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    MarkupPrices {
        home_price: round(initial_price * HOME_PRICE_MARKUP),
        final_price: round(initial_price * FINAL_PRICE_MARKUP),
    }
}

/// Build the row for a manually added product
pub fn manual_stock_item(
    name: &str,
    initial_price: Decimal,
    unit: &str,
    quantity: i32,
    line_number: i32,
    date: &str,
) -> NewStockItem {
    let prices = markup_prices(initial_price);
    NewStockItem {
        line_number,
        description: name.trim().to_string(),
        unit: unit.to_string(),
        quantity: Decimal::from(quantity),
        unit_price: prices.home_price,
        value: prices.final_price,
        vat: Decimal::ZERO,
        supplier: String::new(),
        proforma_number: String::new(),
        serie: String::new(),
        date: date.to_string(),
        currency: DEFAULT_CURRENCY.to_string(),
    }
}
