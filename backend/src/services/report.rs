//! Report rendering: sales tables as PDF or CSV

use printpdf::{BuiltinFont, Line, Mm, PdfDocument, PdfLayerReference, Point};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use shared::analytics::ReportRow;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_X: f32 = 15.0;
const TOP_Y: f32 = 275.0;
const BOTTOM_Y: f32 = 20.0;
const ROW_HEIGHT: f32 = 7.0;

/// Column x positions: product, date, price, source
const COLUMNS: [f32; 4] = [MARGIN_X, 105.0, 142.0, 168.0];
const HEADERS: [&str; 4] = ["Produs", "Data", "Pret", "Sursa"];

/// Longest product name drawn before truncation
const MAX_PRODUCT_CHARS: usize = 48;

pub struct ReportService;

impl ReportService {
    /// Render the rows as an A4 table. Runs on the blocking pool.
    pub async fn render_pdf(title: String, subtitle: String, rows: Vec<ReportRow>) -> AppResult<Vec<u8>> {
        tokio::task::spawn_blocking(move || render_table(&title, &subtitle, &rows))
            .await
            .map_err(|e| AppError::Report(format!("PDF task failed: {}", e)))?
    }

    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Report(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Report(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Report(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

fn render_table(title: &str, subtitle: &str, rows: &[ReportRow]) -> AppResult<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(fold_ascii(title), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Report(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Report(e.to_string()))?;

    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = TOP_Y;

    current.use_text(fold_ascii(title), 16.0, Mm(MARGIN_X), Mm(y), &bold);
    y -= 8.0;
    current.use_text(fold_ascii(subtitle), 10.0, Mm(MARGIN_X), Mm(y), &font);
    y -= 12.0;

    let draw_header = |layer: &PdfLayerReference, y: f32| {
        for (x, header) in COLUMNS.iter().zip(HEADERS) {
            layer.use_text(header, 10.0, Mm(*x), Mm(y), &bold);
        }
        rule(layer, y - 2.0);
    };

    draw_header(&current, y);
    y -= ROW_HEIGHT + 1.0;

    if rows.is_empty() {
        current.use_text("Nicio vanzare in aceasta perioada", 10.0, Mm(MARGIN_X), Mm(y), &font);
    }

    for row in rows {
        if y < BOTTOM_Y {
            let (next_page, next_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            current = doc.get_page(next_page).get_layer(next_layer);
            y = TOP_Y;
            draw_header(&current, y);
            y -= ROW_HEIGHT + 1.0;
        }

        let cells = [
            truncate(&fold_ascii(&row.product), MAX_PRODUCT_CHARS),
            row.date.clone(),
            format!("{:.2}", row.price),
            fold_ascii(&row.source),
        ];
        for (x, cell) in COLUMNS.iter().zip(cells) {
            current.use_text(cell, 9.0, Mm(*x), Mm(y), &font);
        }
        y -= ROW_HEIGHT;
    }

    doc.save_to_bytes().map_err(|e| AppError::Report(e.to_string()))
}

fn rule(layer: &PdfLayerReference, y: f32) {
    let line = Line {
        points: vec![
            (Point::new(Mm(MARGIN_X), Mm(y)), false),
            (Point::new(Mm(PAGE_WIDTH - MARGIN_X), Mm(y)), false),
        ],
        is_closed: false,
    };
    layer.add_line(line);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max - 3).collect();
    cut.push_str("...");
    cut
}

/// Builtin PDF fonts only cover Latin-1; Romanian diacritics are folded
fn fold_ascii(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ă' | 'â' => 'a',
            'Ă' | 'Â' => 'A',
            'î' => 'i',
            'Î' => 'I',
            'ș' | 'ş' => 's',
            'Ș' | 'Ş' => 'S',
            'ț' | 'ţ' => 't',
            'Ț' | 'Ţ' => 'T',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn row(product: &str) -> ReportRow {
        ReportRow {
            product: product.to_string(),
            date: "18.07.2025 14:30".to_string(),
            price: Decimal::new(12050, 2),
            source: "Prieteni".to_string(),
        }
    }

    #[test]
    fn test_fold_ascii_romanian() {
        assert_eq!(fold_ascii("Preț Sursă Ștefan Încă"), "Pret Sursa Stefan Inca");
        assert_eq!(fold_ascii("Altă sursă"), "Alta sursa");
    }

    #[test]
    fn test_truncate_long_names() {
        assert_eq!(truncate("Vaza", 10), "Vaza");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_csv_has_romanian_headers() {
        let csv = ReportService::export_to_csv(&[row("Set oale")]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Produs,Data,Preț,Sursă"));
        assert_eq!(lines.next(), Some("Set oale,18.07.2025 14:30,120.50,Prieteni"));
    }

    #[test]
    fn test_pdf_renders_many_pages() {
        let rows: Vec<ReportRow> = (0..120).map(|i| row(&format!("Produs {}", i))).collect();
        let bytes = render_table("Raport vânzări", "Săptămâna", &rows).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
