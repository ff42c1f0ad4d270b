//! Stock service: listing, manual additions, and invoice reconciliation writes

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{manual_stock_item, NewStockItem, StockItem, StockItemRow, STOCK_COLUMNS};
use shared::analytics::local_date;

/// Stock service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
    tz: Tz,
}

/// Input from the add-stock form
#[derive(Debug, Deserialize, Validate)]
pub struct ManualStockInput {
    #[validate(length(min = 1, max = 500))]
    pub name: String,
    /// Purchase price; markups are applied on top
    pub initial_price: Decimal,
    pub unit: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

impl ManualStockInput {
    fn check(&self) -> AppResult<()> {
        self.validate()?;
        shared::validate_product_name(&self.name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
            message_ro: "Numele produsului este obligatoriu".to_string(),
        })?;
        shared::validate_price(self.initial_price).map_err(|msg| AppError::Validation {
            field: "initial_price".to_string(),
            message: msg.to_string(),
            message_ro: "Prețul trebuie să fie mai mare decât zero".to_string(),
        })?;
        shared::validate_unit(&self.unit).map_err(|msg| AppError::Validation {
            field: "unit".to_string(),
            message: msg.to_string(),
            message_ro: "Unitatea trebuie să fie set sau buc".to_string(),
        })?;
        Ok(())
    }
}

impl StockService {
    pub fn new(db: PgPool, tz: Tz) -> Self {
        Self { db, tz }
    }

    /// Stock rows still on hand, newest first
    pub async fn list_available(&self) -> AppResult<Vec<StockItem>> {
        let rows = sqlx::query_as::<_, StockItemRow>(&format!(
            "SELECT {} FROM stock_items WHERE quantity > 0 ORDER BY created_at DESC",
            STOCK_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Every stock row, zeroed ones included. Needed to price past sales.
    pub async fn list_all(&self) -> AppResult<Vec<StockItem>> {
        let rows = sqlx::query_as::<_, StockItemRow>(&format!(
            "SELECT {} FROM stock_items ORDER BY created_at DESC",
            STOCK_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Add a product from the manual form
    pub async fn add_manual(&self, input: ManualStockInput) -> AppResult<StockItem> {
        input.check()?;

        let mut tx = self.db.begin().await?;

        let max_line = sqlx::query_scalar::<_, Option<i32>>("SELECT MAX(line_number) FROM stock_items")
            .fetch_one(&mut *tx)
            .await?;
        let line_number = max_line.unwrap_or(0) + 1;
        let today = entry_date(Utc::now(), self.tz);

        let new_item = manual_stock_item(
            &input.name,
            input.initial_price,
            &input.unit,
            input.quantity,
            line_number,
            &today,
        );
        let item = insert_stock_item(&mut tx, &new_item).await?;
        tx.commit().await?;

        tracing::info!(
            stock_item_id = %item.id,
            line_number,
            unit_price = %item.unit_price,
            value = %item.value,
            "Added stock item manually"
        );

        Ok(item)
    }
}

/// Date stamped on a manually added row: today in the business timezone
fn entry_date(now: DateTime<Utc>, tz: Tz) -> String {
    local_date(now, tz).format("%Y-%m-%d").to_string()
}

/// Lock a stock row for the rest of the transaction
pub async fn find_for_update(conn: &mut PgConnection, stock_item_id: Uuid) -> AppResult<Option<StockItem>> {
    let row = sqlx::query_as::<_, StockItemRow>(&format!(
        "SELECT {} FROM stock_items WHERE id = $1 FOR UPDATE",
        STOCK_COLUMNS
    ))
    .bind(stock_item_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(Into::into))
}

/// Lock every row an upload may reconcile against, oldest first.
///
/// `keys` are (trimmed description, proforma number) pairs.
pub async fn find_matching(conn: &mut PgConnection, keys: &[(String, String)]) -> AppResult<Vec<StockItem>> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    let (descriptions, proformas): (Vec<String>, Vec<String>) = keys.iter().cloned().unzip();

    let rows = sqlx::query_as::<_, StockItemRow>(&format!(
        "SELECT {} FROM stock_items \
         WHERE (description, proforma_number) IN (SELECT * FROM UNNEST($1::text[], $2::text[])) \
         ORDER BY created_at FOR UPDATE",
        STOCK_COLUMNS
    ))
    .bind(descriptions)
    .bind(proformas)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn insert_stock_item(conn: &mut PgConnection, item: &NewStockItem) -> AppResult<StockItem> {
    let row = sqlx::query_as::<_, StockItemRow>(&format!(
        r#"
        INSERT INTO stock_items (line_number, description, unit, quantity, unit_price, value, vat,
                                 supplier, proforma_number, serie, date, currency)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {}
        "#,
        STOCK_COLUMNS
    ))
    .bind(item.line_number)
    .bind(&item.description)
    .bind(&item.unit)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.value)
    .bind(item.vat)
    .bind(&item.supplier)
    .bind(&item.proforma_number)
    .bind(&item.serie)
    .bind(&item.date)
    .bind(&item.currency)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.into())
}

/// Set the quantity of a row and touch `updated_at`
pub async fn set_quantity(conn: &mut PgConnection, stock_item_id: Uuid, quantity: Decimal) -> AppResult<()> {
    sqlx::query("UPDATE stock_items SET quantity = $2, updated_at = NOW() WHERE id = $1")
        .bind(stock_item_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Exhausted rows stay in the table with quantity and value at zero
pub async fn zero_out(conn: &mut PgConnection, stock_item_id: Uuid) -> AppResult<()> {
    sqlx::query("UPDATE stock_items SET quantity = 0, value = 0, updated_at = NOW() WHERE id = $1")
        .bind(stock_item_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input(name: &str, price: i64, unit: &str, quantity: i32) -> ManualStockInput {
        ManualStockInput {
            name: name.to_string(),
            initial_price: Decimal::from(price),
            unit: unit.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_manual_input_accepts_valid_form() {
        assert!(input("Set oale", 100, "set", 2).check().is_ok());
    }

    #[test]
    fn test_entry_date_uses_business_timezone() {
        // 22:30 UTC on 18 July is 01:30 on the 19th in Bucharest
        let now = Utc.with_ymd_and_hms(2025, 7, 18, 22, 30, 0).unwrap();
        assert_eq!(entry_date(now, chrono_tz::Europe::Bucharest), "2025-07-19");
        assert_eq!(entry_date(now, chrono_tz::UTC), "2025-07-18");
        // 22:30 UTC in January is only 00:30 local
        let winter = Utc.with_ymd_and_hms(2025, 1, 18, 22, 30, 0).unwrap();
        assert_eq!(entry_date(winter, chrono_tz::Europe::Bucharest), "2025-01-19");
        let before = Utc.with_ymd_and_hms(2025, 1, 18, 21, 30, 0).unwrap();
        assert_eq!(entry_date(before, chrono_tz::Europe::Bucharest), "2025-01-18");
    }

    #[test]
    fn test_manual_input_rejects_bad_fields() {
        assert!(input("   ", 100, "set", 2).check().is_err());
        assert!(input("Set oale", 0, "set", 2).check().is_err());
        assert!(input("Set oale", 100, "kg", 2).check().is_err());
        assert!(input("Set oale", 100, "buc", 0).check().is_err());
    }
}
