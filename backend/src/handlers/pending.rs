//! Pending item and overview handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::{PendingService, SalesService, StockService};
use crate::AppState;
use shared::models::{PendingItemView, SoldItem, StockItem};

/// Everything the stock page shows at once
#[derive(Serialize)]
pub struct Overview {
    pub stock: Vec<StockItem>,
    pub sold: Vec<SoldItem>,
    pub pending: Vec<PendingItemView>,
}

pub async fn list_pending(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<PendingItemView>>> {
    let service = PendingService::new(state.db.clone());
    Ok(Json(service.list().await?))
}

/// Stock, sold and pending lists, fetched concurrently
pub async fn get_overview(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Overview>> {
    let stock_service = StockService::new(state.db.clone(), state.config.reporting.timezone);
    let sales_service = SalesService::new(state.db.clone());
    let pending_service = PendingService::new(state.db.clone());

    let (stock, sold, pending) = tokio::try_join!(
        stock_service.list_available(),
        sales_service.list(),
        pending_service.list(),
    )?;

    Ok(Json(Overview { stock, sold, pending }))
}
