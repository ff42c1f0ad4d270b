//! Analytics handlers: period aggregates and report export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::{AnalyticsService, ReportService};
use crate::AppState;
use shared::analytics::{report_file_name, AnalyticsReport, Period};

#[derive(Deserialize)]
pub struct AnalyticsQuery {
    pub period: Option<String>,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    pub period: Option<String>,
    pub format: Option<String>, // "pdf" or "csv"
}

fn parse_period(raw: Option<&str>) -> AppResult<Period> {
    match raw {
        None => Ok(Period::default()),
        Some(raw) => raw.parse().map_err(|e: shared::analytics::UnknownPeriod| AppError::Validation {
            field: "period".to_string(),
            message: e.to_string(),
            message_ro: format!("Perioadă necunoscută: {}", e.0),
        }),
    }
}

pub async fn get_analytics(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<AnalyticsReport>> {
    let period = parse_period(query.period.as_deref())?;
    let service = AnalyticsService::new(state.db.clone(), state.config.reporting.timezone);
    Ok(Json(service.report(period).await?))
}

/// Download the sales of a period as PDF (default) or CSV
pub async fn export_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let period = parse_period(query.period.as_deref())?;
    let format = query.format.as_deref().unwrap_or("pdf").to_ascii_lowercase();
    if format != "pdf" && format != "csv" {
        return Err(AppError::Validation {
            field: "format".to_string(),
            message: format!("Unsupported export format: {}", format),
            message_ro: format!("Format de export necunoscut: {}", format),
        });
    }

    let service = AnalyticsService::new(state.db.clone(), state.config.reporting.timezone);
    let report = service.period_rows(period).await?;
    let file_name = report_file_name(report.period, report.range.start, report.range.end, &format);
    let disposition = format!("attachment; filename=\"{}\"", file_name);

    tracing::info!(
        user = %current_user.0.email,
        period = %period,
        rows = report.rows.len(),
        format = %format,
        "Exporting sales report"
    );

    if format == "csv" {
        let csv = ReportService::export_to_csv(&report.rows)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response())
    } else {
        let title = format!("Raport vânzări ({})", period.label_ro());
        let subtitle = format!(
            "Perioada: {} - {}",
            report.range.start.format("%d.%m.%Y"),
            report.range.end.format("%d.%m.%Y")
        );
        let pdf = ReportService::render_pdf(title, subtitle, report.rows).await?;
        Ok((
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            pdf,
        )
            .into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_period() {
        assert_eq!(parse_period(None).unwrap(), Period::Day);
        assert_eq!(parse_period(Some("Month")).unwrap(), Period::Month);
        assert!(matches!(
            parse_period(Some("decade")),
            Err(AppError::Validation { field, .. }) if field == "period"
        ));
    }
}
