//! Stock handlers: listing, manual add and PDF invoice upload

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::intake::{is_pdf, UploadedFile};
use crate::services::stock::ManualStockInput;
use crate::services::{IntakeService, StockService};
use crate::AppState;
use shared::models::{IntakeSummary, StockItem};

/// Stock rows still on hand
pub async fn list_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<StockItem>>> {
    let service = StockService::new(state.db.clone(), state.config.reporting.timezone);
    Ok(Json(service.list_available().await?))
}

pub async fn add_stock_item(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<ManualStockInput>,
) -> AppResult<(StatusCode, Json<StockItem>)> {
    let service = StockService::new(state.db.clone(), state.config.reporting.timezone);
    let item = service.add_manual(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Upload one or more invoice PDFs. Parts that are not PDFs are skipped.
pub async fn upload_invoices(
    State(state): State<AppState>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<IntakeSummary>> {
    let mut files = Vec::new();
    let mut skipped = 0;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("Invalid multipart body: {}", e)))?
    {
        let file_name = field.file_name().map(str::to_owned);
        if !is_pdf(file_name.as_deref(), field.content_type()) {
            tracing::warn!(
                file = file_name.as_deref().unwrap_or("<unnamed>"),
                content_type = field.content_type().unwrap_or("<none>"),
                "Skipping non-PDF upload part"
            );
            skipped += 1;
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::ValidationError(format!("Failed to read upload: {}", e)))?;
        files.push(UploadedFile {
            file_name: file_name.unwrap_or_else(|| "invoice.pdf".to_string()),
            bytes: bytes.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(AppError::Validation {
            field: "file".to_string(),
            message: "Upload at least one PDF file".to_string(),
            message_ro: "Încărcați cel puțin un fișier PDF".to_string(),
        });
    }

    tracing::info!(
        user = %current_user.0.email,
        files = files.len(),
        skipped,
        "Processing invoice upload"
    );

    let service = IntakeService::new(state.db.clone(), state.extraction.clone());
    let summary = service.process_upload(files, skipped).await?;

    Ok(Json(summary))
}
