//! Invoice extraction client
//!
//! Client for the document extraction service. Each PDF is posted as a
//! multipart `file` field to `{base_url}/extract-stock`; the service answers
//! with the document metadata and the parsed line items.

use std::time::Duration;

use reqwest::{multipart, Client};
use shared::ExtractionResult;

use crate::config::ExtractionConfig;
use crate::error::{AppError, AppResult};

const EXTRACT_PATH: &str = "/extract-stock";

/// Client for the extraction microservice
#[derive(Clone)]
pub struct ExtractionClient {
    endpoint: String,
    http_client: Client,
}

impl ExtractionClient {
    /// Create a new extraction client
    pub fn new(config: &ExtractionConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: Self::endpoint_url(&config.base_url),
            http_client,
        })
    }

    fn endpoint_url(base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), EXTRACT_PATH)
    }

    /// Send one PDF for extraction
    pub async fn extract(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<ExtractionResult> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| AppError::Internal(format!("Invalid MIME type: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        tracing::debug!(file = %file_name, endpoint = %self.endpoint, "Sending document for extraction");

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Extraction request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Extraction {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to read extraction response: {}", e)))?;

        parse_response(&body)
    }
}

fn parse_response(body: &str) -> AppResult<ExtractionResult> {
    serde_json::from_str(body)
        .map_err(|e| AppError::ExternalService(format!("Failed to parse extraction response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_endpoint_url_joins_path() {
        assert_eq!(
            ExtractionClient::endpoint_url("http://localhost:8000/"),
            "http://localhost:8000/extract-stock"
        );
        assert_eq!(
            ExtractionClient::endpoint_url("https://extract.internal"),
            "https://extract.internal/extract-stock"
        );
    }

    #[test]
    fn test_parse_service_response() {
        let body = r#"{
            "metadata": {"supplier": null, "proforma_number": "1042", "serie": "PF", "date": "18-07-25", "currency": "EUR"},
            "items": [
                {"line_number": 1, "description": "Set oale", "unit": "set", "quantity": 2.0,
                 "unit_price": 40.5, "value": 81.0, "vat": 19.0}
            ]
        }"#;
        let parsed = parse_response(body).unwrap();
        assert_eq!(parsed.metadata.supplier, "");
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].quantity, Decimal::from(2));
        assert_eq!(parsed.items[0].unit_price, Decimal::new(405, 1));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_response("<html>"), Err(AppError::ExternalService(_))));
    }
}
