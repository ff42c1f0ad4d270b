//! Sale handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::sales::SaleOutcome;
use crate::services::SalesService;
use crate::AppState;
use shared::models::{SaleRequest, SoldItem};

pub async fn list_sales(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<SoldItem>>> {
    let service = SalesService::new(state.db.clone());
    Ok(Json(service.list().await?))
}

/// Record a full, partial or pending sale. The seller is the signed-in user.
pub async fn record_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<SaleRequest>,
) -> AppResult<(StatusCode, Json<SaleOutcome>)> {
    let service = SalesService::new(state.db.clone());
    let outcome = service.record_sale(&current_user.0.email, request).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
