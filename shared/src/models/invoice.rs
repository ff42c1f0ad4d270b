//! Invoice price records
//!
//! One record is appended for every sale taken directly from stock. It keeps
//! the final unit price that was current at the time of the sale.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoldFactura {
    pub id: Uuid,
    pub stock_item_id: Uuid,
    pub sold_item_id: Option<Uuid>,
    pub product_name: String,
    pub invoice_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSoldFactura {
    pub stock_item_id: Uuid,
    pub product_name: String,
    pub invoice_price: Decimal,
}
