//! Sales service
//!
//! Records sales against stock or pending rows. The target row is locked and
//! every write of the sale runs in a single transaction, so a failure leaves
//! no partial sale behind.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    plan_sale, NewSoldFactura, NewSoldItem, PendingAction, PendingItemView, SaleContext, SaleRequest,
    SaleTarget, SoldFactura, SoldFacturaRow, SoldItem, SoldItemRow, StockUpdate, FACTURA_COLUMNS,
    SOLD_COLUMNS,
};
use crate::services::{pending, stock};

#[derive(Clone)]
pub struct SalesService {
    db: PgPool,
}

/// What a recorded sale changed
#[derive(Debug, Serialize)]
pub struct SaleOutcome {
    pub sold_item: SoldItem,
    pub invoice: Option<SoldFactura>,
    /// Remaining stock quantity for stock-originated sales
    pub stock_remaining: Option<rust_decimal::Decimal>,
    /// Pending row after the sale, when one exists
    pub pending: Option<PendingItemView>,
    /// Set when the pending row was fully sold and removed
    pub pending_removed: Option<Uuid>,
}

impl SalesService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Sold items, newest first
    pub async fn list(&self) -> AppResult<Vec<SoldItem>> {
        let rows = sqlx::query_as::<_, SoldItemRow>(&format!(
            "SELECT {} FROM sold_items ORDER BY sold_date DESC",
            SOLD_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Sold items on or after `since`, newest first
    pub async fn list_since(&self, since: DateTime<Utc>) -> AppResult<Vec<SoldItem>> {
        let rows = sqlx::query_as::<_, SoldItemRow>(&format!(
            "SELECT {} FROM sold_items WHERE sold_date >= $1 ORDER BY sold_date DESC",
            SOLD_COLUMNS
        ))
        .bind(since)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Invoice price records linked to the given sales
    pub async fn invoices_for(&self, sold_item_ids: &[Uuid]) -> AppResult<Vec<SoldFactura>> {
        let rows = sqlx::query_as::<_, SoldFacturaRow>(&format!(
            "SELECT {} FROM sold_factura WHERE sold_item_id = ANY($1)",
            FACTURA_COLUMNS
        ))
        .bind(sold_item_ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Record a sale on behalf of `seller`
    pub async fn record_sale(&self, seller: &str, request: SaleRequest) -> AppResult<SaleOutcome> {
        let mut tx = self.db.begin().await?;

        let target = match request.context {
            SaleContext::Stock => stock::find_for_update(&mut tx, request.item_id)
                .await?
                .map(SaleTarget::Stock)
                .ok_or_else(|| AppError::NotFound("Stock item".to_string()))?,
            SaleContext::Pending => pending::find_for_update(&mut tx, request.item_id)
                .await?
                .map(SaleTarget::Pending)
                .ok_or_else(|| AppError::NotFound("Pending item".to_string()))?,
        };

        let plan = plan_sale(&target, &request, seller, Utc::now())?;

        let sold_item = insert_sold_item(&mut tx, &plan.sold_item).await?;

        let invoice = match &plan.invoice {
            Some(invoice) => Some(insert_invoice(&mut tx, invoice, sold_item.id).await?),
            None => None,
        };

        let stock_remaining = match plan.stock_update {
            Some(StockUpdate::Decrement {
                stock_item_id,
                remaining,
            }) => {
                stock::set_quantity(&mut tx, stock_item_id, remaining).await?;
                Some(remaining)
            }
            Some(StockUpdate::Zero { stock_item_id }) => {
                stock::zero_out(&mut tx, stock_item_id).await?;
                Some(rust_decimal::Decimal::ZERO)
            }
            None => None,
        };

        let mut pending_view = None;
        let mut pending_removed = None;
        match plan.pending {
            Some(PendingAction::Create(new_pending)) => {
                let row = pending::insert(&mut tx, &new_pending).await?;
                pending_view = Some(PendingItemView::from(row));
            }
            Some(PendingAction::UpdateSold { pending_id, qty_sold }) => {
                pending::update_sold(&mut tx, pending_id, qty_sold).await?;
                if let SaleTarget::Pending(mut row) = target {
                    row.qty_sold = qty_sold;
                    pending_view = Some(PendingItemView::from(row));
                }
            }
            Some(PendingAction::Delete { pending_id }) => {
                pending::delete(&mut tx, pending_id).await?;
                pending_removed = Some(pending_id);
            }
            None => {}
        }

        tx.commit().await?;

        tracing::info!(
            sold_item_id = %sold_item.id,
            context = ?request.context,
            quantity = request.quantity,
            total = %request.total_price,
            source = %sold_item.source,
            seller = %seller,
            "Recorded sale"
        );

        Ok(SaleOutcome {
            sold_item,
            invoice,
            stock_remaining,
            pending: pending_view,
            pending_removed,
        })
    }
}

async fn insert_sold_item(conn: &mut PgConnection, item: &NewSoldItem) -> AppResult<SoldItem> {
    let row = sqlx::query_as::<_, SoldItemRow>(&format!(
        r#"
        INSERT INTO sold_items (stock_item_id, name, category, description, unit, quantity_sold,
                                sale_price, total_value, sold_by, sold_date, sursa)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {}
        "#,
        SOLD_COLUMNS
    ))
    .bind(item.stock_item_id)
    .bind(&item.name)
    .bind(&item.category)
    .bind(&item.description)
    .bind(&item.unit)
    .bind(item.quantity_sold)
    .bind(item.sale_price)
    .bind(item.total_value)
    .bind(&item.sold_by)
    .bind(item.sold_date)
    .bind(&item.source)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.into())
}

async fn insert_invoice(
    conn: &mut PgConnection,
    invoice: &NewSoldFactura,
    sold_item_id: Uuid,
) -> AppResult<SoldFactura> {
    let row = sqlx::query_as::<_, SoldFacturaRow>(&format!(
        r#"
        INSERT INTO sold_factura (stock_item_id, sold_item_id, product_name, pret_vanzare_factura)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        FACTURA_COLUMNS
    ))
    .bind(invoice.stock_item_id)
    .bind(sold_item_id)
    .bind(&invoice.product_name)
    .bind(invoice.invoice_price)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.into())
}
