//! Error handling for the stock tracking server
//!
//! Provides consistent error responses in English and Romanian

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::SaleError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
        message_ro: String,
    },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_ro: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_ro: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Sale rejected: {0}")]
    Sale(#[from] SaleError),

    #[error("No stock items found in the uploaded documents")]
    NoItemsExtracted,

    // External service errors
    #[error("Extraction service error: {status} - {body}")]
    Extraction { status: u16, body: String },

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Report rendering failed: {0}")]
    Report(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_ro: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_default();
        AppError::Validation {
            message: format!("Invalid value for {}", field),
            message_ro: format!("Valoare invalidă pentru {}", field),
            field,
        }
    }
}

fn sale_message_ro(err: &SaleError) -> String {
    match err {
        SaleError::NonPositivePrice => "Prețul vânzării trebuie să fie mai mare decât zero".to_string(),
        SaleError::InvalidQuantity => "Cantitatea trebuie să fie cel puțin 1".to_string(),
        SaleError::InsufficientStock { available, requested } => {
            format!("Ați cerut {} dar sunt doar {} în stoc", requested, available)
        }
        SaleError::ExceedsPending { pending, requested } => {
            format!("Ați cerut {} dar sunt doar {} bucăți în așteptare", requested, pending)
        }
        SaleError::InvalidTotalPieces { total, sold } => format!(
            "Bucățile vândute acum ({}) trebuie să fie mai puține decât totalul ({})",
            sold, total
        ),
        SaleError::PartialFromPending => {
            "Produsele în așteptare nu pot fi vândute parțial din nou".to_string()
        }
        SaleError::UnknownSource(source) => format!("Sursă necunoscută: {}", source),
        SaleError::Exhausted => "Produsul nu mai este în stoc".to_string(),
        SaleError::ContextMismatch => "Contextul vânzării nu corespunde produsului".to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_CREDENTIALS".to_string(),
                    message_en: "Invalid email or password".to_string(),
                    message_ro: "Email sau parolă incorectă".to_string(),
                    field: None,
                },
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_TOKEN".to_string(),
                    message_en: "Invalid token".to_string(),
                    message_ro: "Token invalid".to_string(),
                    field: None,
                },
            ),
            AppError::Unauthorized { message, message_ro } => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "UNAUTHORIZED".to_string(),
                    message_en: message.clone(),
                    message_ro: message_ro.clone(),
                    field: None,
                },
            ),
            AppError::Validation { field, message, message_ro } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_ro: message_ro.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_ro: format!("Date invalide: {}", msg),
                    field: None,
                },
            ),
            AppError::Conflict { resource, message, message_ro } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message_en: message.clone(),
                    message_ro: message_ro.clone(),
                    field: Some(resource.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_ro: format!("{} nu a fost găsit", resource),
                    field: None,
                },
            ),
            AppError::Sale(err) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "SALE_REJECTED".to_string(),
                    message_en: err.to_string(),
                    message_ro: sale_message_ro(err),
                    field: Some(err.field().to_string()),
                },
            ),
            AppError::NoItemsExtracted => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "NO_ITEMS_EXTRACTED".to_string(),
                    message_en: "No stock items were found in the uploaded documents".to_string(),
                    message_ro: "Nu s-au găsit produse în documentele încărcate".to_string(),
                    field: Some("file".to_string()),
                },
            ),
            AppError::Extraction { status, body } => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "EXTRACTION_ERROR".to_string(),
                    message_en: format!("Extraction service error: {} - {}", status, body),
                    message_ro: format!("Eroare la procesarea documentului: {} - {}", status, body),
                    field: None,
                },
            ),
            AppError::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "EXTERNAL_SERVICE_ERROR".to_string(),
                    message_en: format!("External service error: {}", msg),
                    message_ro: format!("Eroare la serviciul extern: {}", msg),
                    field: None,
                },
            ),
            AppError::Report(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "REPORT_ERROR".to_string(),
                    message_en: format!("Report rendering failed: {}", msg),
                    message_ro: "Raportul nu a putut fi generat".to_string(),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_ro: "A apărut o eroare la baza de date".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_ro: "Eroare internă a serverului".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_ro: "Eroare internă a serverului".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_sale_error_maps_to_bad_request_with_field() {
        let response = AppError::from(SaleError::InsufficientStock {
            available: Decimal::from(2),
            requested: 3,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_extraction_error_is_bad_gateway() {
        let response = AppError::Extraction {
            status: 500,
            body: "boom".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_romanian_sale_messages() {
        assert_eq!(
            sale_message_ro(&SaleError::ExceedsPending { pending: 4, requested: 5 }),
            "Ați cerut 5 dar sunt doar 4 bucăți în așteptare"
        );
    }
}
