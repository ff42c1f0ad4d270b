//! Database row types
//!
//! Re-exports models from the shared crate and maps table rows onto them.
//! Column names that differ from the model (`sursa`, `pret_vanzare_factura`)
//! are aliased in the queries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

pub use shared::models::*;

pub const STOCK_COLUMNS: &str = "id, line_number, description, unit, quantity, unit_price, value, vat, \
     supplier, proforma_number, serie, date, currency, created_at, updated_at";

pub const SOLD_COLUMNS: &str = "id, stock_item_id, name, category, description, unit, quantity_sold, \
     sale_price, total_value, sold_by, sold_date, sursa AS source, created_at";

pub const PENDING_COLUMNS: &str =
    "id, stock_item_id, description, unit, qty_total, qty_sold, comment, created_at";

pub const FACTURA_COLUMNS: &str =
    "id, stock_item_id, sold_item_id, product_name, pret_vanzare_factura AS invoice_price, created_at";

#[derive(Debug, FromRow)]
pub struct StockItemRow {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StockItemRow> for StockItem {
    fn from(row: StockItemRow) -> Self {
        StockItem {
            id: row.id,
            line_number: row.line_number,
            description: row.description,
            unit: row.unit,
            quantity: row.quantity,
            unit_price: row.unit_price,
            value: row.value,
            vat: row.vat,
            supplier: row.supplier,
            proforma_number: row.proforma_number,
            serie: row.serie,
            date: row.date,
            currency: row.currency,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct SoldItemRow {
    pub id: Uuid,
    pub stock_item_id: Option<Uuid>,
    pub name: String,
    pub category: String,
    pub description: String,
    pub unit: String,
    pub quantity_sold: i32,
    pub sale_price: Decimal,
    pub total_value: Decimal,
    pub sold_by: String,
    pub sold_date: DateTime<Utc>,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl From<SoldItemRow> for SoldItem {
    fn from(row: SoldItemRow) -> Self {
        SoldItem {
            id: row.id,
            stock_item_id: row.stock_item_id,
            name: row.name,
            category: row.category,
            description: row.description,
            unit: row.unit,
            quantity_sold: row.quantity_sold,
            sale_price: row.sale_price,
            total_value: row.total_value,
            sold_by: row.sold_by,
            sold_date: row.sold_date,
            source: row.source,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct PendingItemRow {
    pub id: Uuid,
    pub stock_item_id: Uuid,
    pub description: String,
    pub unit: String,
    pub qty_total: i32,
    pub qty_sold: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<PendingItemRow> for PendingItem {
    fn from(row: PendingItemRow) -> Self {
        PendingItem {
            id: row.id,
            stock_item_id: row.stock_item_id,
            description: row.description,
            unit: row.unit,
            qty_total: row.qty_total,
            qty_sold: row.qty_sold,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct SoldFacturaRow {
    pub id: Uuid,
    pub stock_item_id: Uuid,
    pub sold_item_id: Option<Uuid>,
    pub product_name: String,
    pub invoice_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<SoldFacturaRow> for SoldFactura {
    fn from(row: SoldFacturaRow) -> Self {
        SoldFactura {
            id: row.id,
            stock_item_id: row.stock_item_id,
            sold_item_id: row.sold_item_id,
            product_name: row.product_name,
            invoice_price: row.invoice_price,
            created_at: row.created_at,
        }
    }
}
