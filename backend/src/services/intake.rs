//! Invoice intake: extract uploaded PDFs and reconcile their lines into stock

use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::external::ExtractionClient;
use crate::models::{reconcile_intake, ExtractionResult, IntakeAction, IntakeSummary};
use crate::services::stock;

/// A PDF taken from the upload form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct IntakeService {
    db: PgPool,
    extraction: ExtractionClient,
}

impl IntakeService {
    pub fn new(db: PgPool, extraction: ExtractionClient) -> Self {
        Self { db, extraction }
    }

    /// Extract every file, then reconcile all lines in one transaction.
    ///
    /// A line increments the row with the same description and proforma
    /// number, including rows inserted earlier in the same upload. Any
    /// extraction failure aborts the upload before stock is touched.
    pub async fn process_upload(&self, files: Vec<UploadedFile>, skipped: usize) -> AppResult<IntakeSummary> {
        let files_processed = files.len();
        let mut extracted: Vec<ExtractionResult> = Vec::with_capacity(files.len());

        for file in files {
            let result = self.extraction.extract(&file.file_name, file.bytes).await?;
            tracing::debug!(
                file = %file.file_name,
                proforma = %result.metadata.proforma_number,
                items = result.items.len(),
                "Extracted invoice"
            );
            extracted.push(result);
        }

        let items_extracted: usize = extracted.iter().map(|r| r.items.len()).sum();
        if items_extracted == 0 {
            return Err(AppError::NoItemsExtracted);
        }

        let keys: Vec<(String, String)> = extracted
            .iter()
            .flat_map(|result| {
                result.items.iter().map(move |item| {
                    (
                        item.description.trim().to_string(),
                        result.metadata.proforma_number.clone(),
                    )
                })
            })
            .collect();

        let mut tx = self.db.begin().await?;

        let existing = stock::find_matching(&mut tx, &keys).await?;
        let plan = reconcile_intake(&existing, &extracted);

        for action in &plan.actions {
            match action {
                IntakeAction::Increment {
                    stock_item_id,
                    new_quantity,
                } => stock::set_quantity(&mut tx, *stock_item_id, *new_quantity).await?,
                IntakeAction::Insert(new_item) => {
                    stock::insert_stock_item(&mut tx, new_item).await?;
                }
            }
        }

        tx.commit().await?;

        let summary = IntakeSummary {
            files_processed,
            files_skipped: skipped,
            items_extracted,
            inserted: plan.inserted,
            incremented: plan.incremented,
            items: plan.new_items().cloned().collect(),
        };

        tracing::info!(
            files = summary.files_processed,
            skipped = summary.files_skipped,
            inserted = summary.inserted,
            incremented = summary.incremented,
            "Reconciled uploaded invoices"
        );

        Ok(summary)
    }
}

/// Whether an upload part is a PDF, by content type or file extension
pub fn is_pdf(file_name: Option<&str>, content_type: Option<&str>) -> bool {
    let by_type = content_type
        .map(|ct| ct.eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false);
    let by_name = file_name
        .map(|name| name.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);
    by_type || by_name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_by_type_or_extension() {
        assert!(is_pdf(Some("factura.pdf"), None));
        assert!(is_pdf(Some("FACTURA.PDF"), Some("application/octet-stream")));
        assert!(is_pdf(Some("scan"), Some("application/pdf")));
        assert!(!is_pdf(Some("poza.jpg"), Some("image/jpeg")));
        assert!(!is_pdf(None, None));
    }
}
