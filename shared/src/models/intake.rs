//! Invoice intake models
//!
//! Line items come back from the document extraction service together with
//! metadata shared by the whole document. Each item is reconciled against
//! existing stock by (description, proforma number).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{NewStockItem, StockItem};

/// Document-level metadata returned by the extraction service
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractionMetadata {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub supplier: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub proforma_number: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub serie: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub currency: String,
}

/// One table row parsed from an invoice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedLineItem {
    #[serde(default)]
    pub line_number: i32,
    pub description: String,
    pub unit: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub value: Decimal,
    #[serde(default)]
    pub vat: Decimal,
}

/// Full extraction response body
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractionResult {
    pub metadata: ExtractionMetadata,
    #[serde(default)]
    pub items: Vec<ExtractedLineItem>,
}

/// What to do with one extracted line item
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeAction {
    /// A row with the same description and proforma number exists
    Increment {
        stock_item_id: Uuid,
        new_quantity: Decimal,
    },
    Insert(NewStockItem),
}

/// Writes that reconcile one upload into stock
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntakePlan {
    /// One write per touched row: increments first, then inserts
    pub actions: Vec<IntakeAction>,
    /// Rows created
    pub inserted: usize,
    /// Lines added onto an existing row or a row created by this upload
    pub incremented: usize,
}

impl IntakePlan {
    pub fn new_items(&self) -> impl Iterator<Item = &NewStockItem> {
        self.actions.iter().filter_map(|action| match action {
            IntakeAction::Insert(item) => Some(item),
            IntakeAction::Increment { .. } => None,
        })
    }
}

/// Outcome of an upload request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntakeSummary {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub items_extracted: usize,
    pub inserted: usize,
    pub incremented: usize,
    pub items: Vec<NewStockItem>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Normalize `DD-MM-YY`, `DD-MM-YYYY`, `DD/MM/YY` or `DD/MM/YYYY` to `YYYY-MM-DD`.
///
/// Two-digit years are taken as 20YY. Anything that does not parse to a real
/// calendar date is returned unchanged.
pub fn normalize_invoice_date(raw: &str) -> String {
    let trimmed = raw.trim();
    let parts: Vec<&str> = trimmed.split(['-', '/']).collect();
    if parts.len() != 3 {
        return raw.to_string();
    }

    let all_digits = parts
        .iter()
        .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
    if !all_digits || parts[0].len() > 2 || parts[1].len() > 2 {
        return raw.to_string();
    }

    let year = match parts[2].len() {
        2 => format!("20{}", parts[2]),
        4 => parts[2].to_string(),
        _ => return raw.to_string(),
    };

    let (Ok(y), Ok(m), Ok(d)) = (
        year.parse::<i32>(),
        parts[1].parse::<u32>(),
        parts[0].parse::<u32>(),
    ) else {
        return raw.to_string();
    };

    match NaiveDate::from_ymd_opt(y, m, d) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => raw.to_string(),
    }
}

/// Merge the document metadata onto a line item
pub fn merge_line_item(metadata: &ExtractionMetadata, item: &ExtractedLineItem) -> NewStockItem {
    NewStockItem {
        line_number: item.line_number,
        description: item.description.trim().to_string(),
        unit: item.unit.trim().to_lowercase(),
        quantity: item.quantity,
        unit_price: item.unit_price,
        value: item.value,
        vat: item.vat,
        supplier: metadata.supplier.clone(),
        proforma_number: metadata.proforma_number.clone(),
        serie: metadata.serie.clone(),
        date: normalize_invoice_date(&metadata.date),
        currency: metadata.currency.clone(),
    }
}

/// Decide between incrementing the matching row and inserting a new one
pub fn plan_intake(
    existing: Option<&StockItem>,
    metadata: &ExtractionMetadata,
    item: &ExtractedLineItem,
) -> IntakeAction {
    match existing {
        Some(row) => IntakeAction::Increment {
            stock_item_id: row.id,
            new_quantity: row.quantity + item.quantity,
        },
        None => IntakeAction::Insert(merge_line_item(metadata, item)),
    }
}

/// Reconcile every extracted line of an upload against `existing` stock.
///
/// A line matches the oldest row with its trimmed description and the
/// document's proforma number. Lines matching a row created earlier in the
/// same upload are added to that row, so an upload never duplicates a pair.
pub fn reconcile_intake(existing: &[StockItem], extracted: &[ExtractionResult]) -> IntakePlan {
    let mut rows: Vec<StockItem> = existing.to_vec();
    rows.sort_by_key(|row| row.created_at);

    let mut touched: Vec<Uuid> = Vec::new();
    let mut new_items: Vec<NewStockItem> = Vec::new();
    let mut plan = IntakePlan::default();

    for result in extracted {
        let proforma = result.metadata.proforma_number.as_str();
        for line in &result.items {
            let description = line.description.trim();

            if let Some(new_item) = new_items
                .iter_mut()
                .find(|n| n.description == description && n.proforma_number == proforma)
            {
                new_item.quantity += line.quantity;
                plan.incremented += 1;
                continue;
            }

            let existing = rows
                .iter_mut()
                .find(|row| row.description == description && row.proforma_number == proforma);
            let action = plan_intake(existing.as_deref(), &result.metadata, line);

            match (action, existing) {
                (
                    IntakeAction::Increment {
                        stock_item_id,
                        new_quantity,
                    },
                    Some(row),
                ) => {
                    row.quantity = new_quantity;
                    if !touched.contains(&stock_item_id) {
                        touched.push(stock_item_id);
                    }
                    plan.incremented += 1;
                }
                (IntakeAction::Insert(new_item), _) => {
                    new_items.push(new_item);
                    plan.inserted += 1;
                }
                (IntakeAction::Increment { .. }, None) => {}
            }
        }
    }

    plan.actions = touched
        .iter()
        .filter_map(|id| rows.iter().find(|row| row.id == *id))
        .map(|row| IntakeAction::Increment {
            stock_item_id: row.id,
            new_quantity: row.quantity,
        })
        .chain(new_items.into_iter().map(IntakeAction::Insert))
        .collect();

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn metadata() -> ExtractionMetadata {
        ExtractionMetadata {
            supplier: "Furnizor SRL".to_string(),
            proforma_number: "1042".to_string(),
            serie: "PF".to_string(),
            date: "07/03/25".to_string(),
            currency: "EUR".to_string(),
        }
    }

    fn line(description: &str, quantity: &str) -> ExtractedLineItem {
        ExtractedLineItem {
            line_number: 1,
            description: description.to_string(),
            unit: "BUC".to_string(),
            quantity: dec(quantity),
            unit_price: dec("40"),
            value: dec("50"),
            vat: dec("19"),
        }
    }

    fn stock_row(description: &str, quantity: &str) -> StockItem {
        StockItem {
            id: Uuid::new_v4(),
            line_number: 1,
            description: description.to_string(),
            unit: "buc".to_string(),
            quantity: dec(quantity),
            unit_price: dec("40"),
            value: dec("50"),
            vat: dec("19"),
            supplier: "Furnizor SRL".to_string(),
            proforma_number: "1042".to_string(),
            serie: "PF".to_string(),
            date: "2025-03-07".to_string(),
            currency: "EUR".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_dash_four_digit_year() {
        assert_eq!(normalize_invoice_date("18-07-2025"), "2025-07-18");
    }

    #[test]
    fn test_normalize_slash_two_digit_year() {
        assert_eq!(normalize_invoice_date("7/3/25"), "2025-03-07");
        assert_eq!(normalize_invoice_date("07/03/25"), "2025-03-07");
    }

    #[test]
    fn test_normalize_passes_through_unparseable() {
        assert_eq!(normalize_invoice_date(""), "");
        assert_eq!(normalize_invoice_date("ieri"), "ieri");
        assert_eq!(normalize_invoice_date("2025-07-18"), "2025-07-18");
        assert_eq!(normalize_invoice_date("31-02-2025"), "31-02-2025");
        assert_eq!(normalize_invoice_date("1-2-345"), "1-2-345");
    }

    #[test]
    fn test_metadata_nulls_become_empty() {
        let json = r#"{"metadata":{"supplier":null,"proforma_number":"7","serie":"A","date":"01-01-2025","currency":"RON"},"items":[]}"#;
        let parsed: ExtractionResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.metadata.supplier, "");
        assert_eq!(parsed.metadata.proforma_number, "7");
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn test_merge_carries_batch_metadata() {
        let merged = merge_line_item(&metadata(), &line("  Cana ceramica ", "4"));
        assert_eq!(merged.description, "Cana ceramica");
        assert_eq!(merged.unit, "buc");
        assert_eq!(merged.supplier, "Furnizor SRL");
        assert_eq!(merged.proforma_number, "1042");
        assert_eq!(merged.serie, "PF");
        assert_eq!(merged.date, "2025-03-07");
        assert_eq!(merged.currency, "EUR");
    }

    #[test]
    fn test_plan_intake_increments_existing_row() {
        let existing = stock_row("Cana ceramica", "3");
        let action = plan_intake(Some(&existing), &metadata(), &line("Cana ceramica", "4"));
        assert_eq!(
            action,
            IntakeAction::Increment {
                stock_item_id: existing.id,
                new_quantity: dec("7"),
            }
        );
    }

    #[test]
    fn test_reconcile_matches_trimmed_description_on_oldest_row() {
        let mut older = stock_row("Cana ceramica", "3");
        older.created_at = Utc::now() - chrono::Duration::days(2);
        let newer = stock_row("Cana ceramica", "10");

        let upload = ExtractionResult {
            metadata: metadata(),
            items: vec![line("  Cana ceramica  ", "4"), line("Cana ceramica", "1")],
        };
        let plan = reconcile_intake(&[newer, older.clone()], &[upload]);

        assert_eq!(
            plan.actions,
            vec![IntakeAction::Increment {
                stock_item_id: older.id,
                new_quantity: dec("8"),
            }]
        );
        assert_eq!(plan.incremented, 2);
        assert_eq!(plan.inserted, 0);
    }

    #[test]
    fn test_reconcile_merges_new_lines_within_upload() {
        let mut other = metadata();
        other.proforma_number = "1043".to_string();
        let uploads = vec![
            ExtractionResult {
                metadata: metadata(),
                items: vec![line("Farfurie", "2"), line(" Farfurie", "3")],
            },
            ExtractionResult {
                metadata: other,
                items: vec![line("Farfurie", "1")],
            },
        ];
        let plan = reconcile_intake(&[], &uploads);

        let items: Vec<&NewStockItem> = plan.new_items().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, dec("5"));
        assert_eq!(items[0].proforma_number, "1042");
        assert_eq!(items[1].quantity, dec("1"));
        assert_eq!(plan.inserted, 2);
        assert_eq!(plan.incremented, 1);
    }

    #[test]
    fn test_plan_intake_inserts_when_no_match() {
        let action = plan_intake(None, &metadata(), &line("Farfurie", "2"));
        match action {
            IntakeAction::Insert(row) => {
                assert_eq!(row.description, "Farfurie");
                assert_eq!(row.quantity, dec("2"));
                assert_eq!(row.proforma_number, "1042");
            }
            other => panic!("expected insert, got {:?}", other),
        }
    }
}
