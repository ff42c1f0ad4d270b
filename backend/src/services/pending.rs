//! Pending ("în așteptare") rows: units being sold piece by piece

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{NewPendingItem, PendingItem, PendingItemRow, PendingItemView, PENDING_COLUMNS};

#[derive(Clone)]
pub struct PendingService {
    db: PgPool,
}

impl PendingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Pending rows, newest first, with the remaining count derived on read
    pub async fn list(&self) -> AppResult<Vec<PendingItemView>> {
        let rows = sqlx::query_as::<_, PendingItemRow>(&format!(
            "SELECT {} FROM in_asteptare ORDER BY created_at DESC",
            PENDING_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PendingItemView::from(PendingItem::from(row)))
            .collect())
    }
}

pub async fn find_for_update(conn: &mut PgConnection, pending_id: Uuid) -> AppResult<Option<PendingItem>> {
    let row = sqlx::query_as::<_, PendingItemRow>(&format!(
        "SELECT {} FROM in_asteptare WHERE id = $1 FOR UPDATE",
        PENDING_COLUMNS
    ))
    .bind(pending_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(Into::into))
}

pub async fn insert(conn: &mut PgConnection, item: &NewPendingItem) -> AppResult<PendingItem> {
    let row = sqlx::query_as::<_, PendingItemRow>(&format!(
        r#"
        INSERT INTO in_asteptare (stock_item_id, description, unit, qty_total, qty_sold, comment)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {}
        "#,
        PENDING_COLUMNS
    ))
    .bind(item.stock_item_id)
    .bind(&item.description)
    .bind(&item.unit)
    .bind(item.qty_total)
    .bind(item.qty_sold)
    .bind(&item.comment)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.into())
}

/// Only the sold count is stored; the remaining count is never written
pub async fn update_sold(conn: &mut PgConnection, pending_id: Uuid, qty_sold: i32) -> AppResult<()> {
    sqlx::query("UPDATE in_asteptare SET qty_sold = $2 WHERE id = $1")
        .bind(pending_id)
        .bind(qty_sold)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn delete(conn: &mut PgConnection, pending_id: Uuid) -> AppResult<()> {
    sqlx::query("DELETE FROM in_asteptare WHERE id = $1")
        .bind(pending_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
