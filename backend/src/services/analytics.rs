//! Analytics service: loads the rows a period needs and aggregates them

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::{SalesService, StockService};
use shared::analytics::{
    compute_analytics, local_date, local_midnight, period_start_date, report_rows, AnalyticsReport, Period, ReportRow,
};
use shared::types::DateRange;

#[derive(Clone)]
pub struct AnalyticsService {
    stock: StockService,
    sales: SalesService,
    tz: Tz,
}

/// Sold items of a period, ready for export
#[derive(Debug)]
pub struct PeriodReport {
    pub period: Period,
    /// From the first day of the period through today
    pub range: DateRange,
    pub rows: Vec<ReportRow>,
}

impl AnalyticsService {
    pub fn new(db: PgPool, tz: Tz) -> Self {
        Self {
            stock: StockService::new(db.clone(), tz),
            sales: SalesService::new(db),
            tz,
        }
    }

    /// Start of `period` as a UTC instant and as a local calendar date
    fn window(&self, period: Period, now: DateTime<Utc>) -> (DateTime<Utc>, NaiveDate, NaiveDate) {
        let today = local_date(now, self.tz);
        let start_date = period_start_date(period, today);
        (local_midnight(start_date, self.tz), start_date, today)
    }

    pub async fn report(&self, period: Period) -> AppResult<AnalyticsReport> {
        let now = Utc::now();
        let (start, _, _) = self.window(period, now);

        let (stock, sold) = tokio::try_join!(self.stock.list_all(), self.sales.list_since(start))?;

        tracing::debug!(
            period = %period,
            stock_rows = stock.len(),
            sold_rows = sold.len(),
            "Computing analytics"
        );

        Ok(compute_analytics(period, now, self.tz, &stock, &sold))
    }

    /// Sold items of the period with their invoice prices, newest first
    pub async fn period_rows(&self, period: Period) -> AppResult<PeriodReport> {
        let (start, start_date, today) = self.window(period, Utc::now());

        let sold = self.sales.list_since(start).await?;
        let ids: Vec<Uuid> = sold.iter().map(|s| s.id).collect();
        let invoices = self.sales.invoices_for(&ids).await?;

        let refs: Vec<_> = sold.iter().collect();
        Ok(PeriodReport {
            period,
            range: DateRange {
                start: start_date,
                end: today,
            },
            rows: report_rows(&refs, &invoices, self.tz),
        })
    }
}
