//! Sales analytics
//!
//! Aggregates sold items over a reporting period (day, week, month, year)
//! measured in the business's local time. Every bucket of the time series is
//! reported, with zeros where nothing was sold.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{SoldFactura, SoldItem, StockItem, UNKNOWN_SOURCE_LABEL};

/// Number of products listed in the top sellers table
pub const TOP_PRODUCTS: usize = 5;

const WEEKDAYS_RO: [&str; 7] = ["Luni", "Marți", "Miercuri", "Joi", "Vineri", "Sâmbătă", "Duminică"];
const MONTHS_RO: [&str; 12] = [
    "Ian", "Feb", "Mar", "Apr", "Mai", "Iun", "Iul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    pub fn label_ro(&self) -> &'static str {
        match self {
            Period::Day => "Zi",
            Period::Week => "Săptămână",
            Period::Month => "Lună",
            Period::Year => "An",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Unknown period: {0}")]
pub struct UnknownPeriod(pub String);

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            other => Err(UnknownPeriod(other.to_string())),
        }
    }
}

/// First local day of the period containing `today`
pub fn period_start_date(period: Period, today: NaiveDate) -> NaiveDate {
    match period {
        Period::Day => today,
        Period::Week => today - Duration::days(today.weekday().num_days_from_monday() as i64),
        Period::Month => today.with_day(1).unwrap_or(today),
        Period::Year => today.with_ordinal(1).unwrap_or(today),
    }
}

/// Calendar date of `instant` in the business timezone
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Instant of local midnight on `date`.
///
/// The UTC offset is the one in force on that date, so a day start follows
/// daylight saving changes. Where a transition skips midnight the day starts
/// at the first local hour that exists.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..3)
        .find_map(|h| tz.from_local_datetime(&(midnight + Duration::hours(h))).earliest())
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Start instant of the period containing `now`
pub fn period_start(period: Period, now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    local_midnight(period_start_date(period, local_date(now, tz)), tz)
}

/// ISO week key such as `2025-W29`. The week belongs to the year of its Thursday.
pub fn iso_week_key(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// Keys and labels of the time series buckets for a period starting on `start`
pub fn period_buckets(period: Period, start: NaiveDate) -> Vec<(String, String)> {
    match period {
        Period::Day => vec![(
            start.format("%Y-%m-%d").to_string(),
            start.format("%d.%m.%Y").to_string(),
        )],
        Period::Week => (0..7)
            .map(|i| {
                let day = start + Duration::days(i);
                (
                    day.format("%Y-%m-%d").to_string(),
                    WEEKDAYS_RO[day.weekday().num_days_from_monday() as usize].to_string(),
                )
            })
            .collect(),
        Period::Month => {
            let mut buckets: Vec<(String, String)> = Vec::new();
            let mut day = start;
            while day.month() == start.month() {
                let key = iso_week_key(day);
                if buckets.last().map(|(k, _)| k != &key).unwrap_or(true) {
                    buckets.push((key, format!("Săpt. {}", day.iso_week().week())));
                }
                day += Duration::days(1);
            }
            buckets
        }
        Period::Year => MONTHS_RO
            .iter()
            .enumerate()
            .map(|(i, label)| (format!("{}-{:02}", start.year(), i + 1), label.to_string()))
            .collect(),
    }
}

/// Bucket key a local sale date falls into
fn bucket_key(period: Period, date: NaiveDate) -> String {
    match period {
        Period::Day | Period::Week => date.format("%Y-%m-%d").to_string(),
        Period::Month => iso_week_key(date),
        Period::Year => date.format("%Y-%m").to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSales {
    pub name: String,
    pub quantity: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSales {
    pub source: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesBucket {
    pub key: String,
    pub label: String,
    pub sales: Decimal,
    pub profit: Decimal,
    pub transactions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsReport {
    pub period: Period,
    pub period_start: DateTime<Utc>,
    pub total_stock_value: Decimal,
    pub total_sales: Decimal,
    pub transaction_count: usize,
    pub average_sale: Decimal,
    pub low_stock_count: usize,
    pub total_profit: Decimal,
    pub top_products: Vec<ProductSales>,
    pub sales_by_source: Vec<SourceSales>,
    pub series: Vec<SeriesBucket>,
}

/// Unit cost per stock row, used to price sold items
pub fn cost_lookup(stock: &[StockItem]) -> HashMap<Uuid, Decimal> {
    stock.iter().map(|item| (item.id, item.unit_price)).collect()
}

/// Sale value minus cost. Cost is 0 when the stock row is gone.
pub fn sale_profit(sale: &SoldItem, costs: &HashMap<Uuid, Decimal>) -> Decimal {
    let cost = sale
        .stock_item_id
        .and_then(|id| costs.get(&id).copied())
        .unwrap_or(Decimal::ZERO);
    sale.total_value - cost * Decimal::from(sale.quantity_sold)
}

/// Sold items on or after the start of the period
pub fn filter_period<'a>(sold: &'a [SoldItem], start: DateTime<Utc>) -> Vec<&'a SoldItem> {
    sold.iter().filter(|s| s.sold_date >= start).collect()
}

pub fn compute_analytics(
    period: Period,
    now: DateTime<Utc>,
    tz: Tz,
    stock: &[StockItem],
    sold: &[SoldItem],
) -> AnalyticsReport {
    let start_date = period_start_date(period, local_date(now, tz));
    let start = local_midnight(start_date, tz);
    let in_period = filter_period(sold, start);
    let costs = cost_lookup(stock);

    let total_stock_value: Decimal = stock.iter().map(StockItem::stock_value).sum();
    let low_stock_count = stock.iter().filter(|item| item.is_low_stock()).count();
    let total_sales: Decimal = in_period.iter().map(|s| s.total_value).sum();
    let total_profit: Decimal = in_period.iter().map(|s| sale_profit(s, &costs)).sum();
    let transaction_count = in_period.len();
    let average_sale = if transaction_count == 0 {
        Decimal::ZERO
    } else {
        (total_sales / Decimal::from(transaction_count as u64)).round_dp(2)
    };

    // Products, in order of first appearance so ties keep a stable order
    let mut products: Vec<ProductSales> = Vec::new();
    for sale in in_period.iter().filter(|s| !s.name.is_empty()) {
        match products.iter_mut().find(|p| p.name == sale.name) {
            Some(p) => {
                p.quantity += sale.quantity_sold as i64;
                p.revenue += sale.total_value;
            }
            None => products.push(ProductSales {
                name: sale.name.clone(),
                quantity: sale.quantity_sold as i64,
                revenue: sale.total_value,
            }),
        }
    }
    products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    products.truncate(TOP_PRODUCTS);

    let mut sources: Vec<SourceSales> = Vec::new();
    for sale in &in_period {
        let name = match sale.source.trim() {
            "" => UNKNOWN_SOURCE_LABEL,
            s => s,
        };
        match sources.iter_mut().find(|s| s.source == name) {
            Some(s) => s.quantity += sale.quantity_sold as i64,
            None => sources.push(SourceSales {
                source: name.to_string(),
                quantity: sale.quantity_sold as i64,
            }),
        }
    }

    let mut series: Vec<SeriesBucket> = period_buckets(period, start_date)
        .into_iter()
        .map(|(key, label)| SeriesBucket {
            key,
            label,
            sales: Decimal::ZERO,
            profit: Decimal::ZERO,
            transactions: 0,
        })
        .collect();

    for sale in &in_period {
        let key = match period {
            // everything in the window lands in the single bucket
            Period::Day => series.first().map(|b| b.key.clone()).unwrap_or_default(),
            _ => bucket_key(period, local_date(sale.sold_date, tz)),
        };
        if let Some(bucket) = series.iter_mut().find(|b| b.key == key) {
            bucket.sales += sale.total_value;
            bucket.profit += sale_profit(sale, &costs);
            bucket.transactions += 1;
        }
    }

    AnalyticsReport {
        period,
        period_start: start,
        total_stock_value,
        total_sales,
        transaction_count,
        average_sale,
        low_stock_count,
        total_profit,
        top_products: products,
        sales_by_source: sources,
        series,
    }
}

/// One line of the sales report export
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportRow {
    #[serde(rename = "Produs")]
    pub product: String,
    #[serde(rename = "Data")]
    pub date: String,
    #[serde(rename = "Preț")]
    pub price: Decimal,
    #[serde(rename = "Sursă")]
    pub source: String,
}

/// Report rows for the sold items of a period, newest first.
///
/// The price is the invoice price linked to the sale when there is one and
/// the sale total otherwise.
pub fn report_rows(sold: &[&SoldItem], invoices: &[SoldFactura], tz: Tz) -> Vec<ReportRow> {
    let by_sale: HashMap<Uuid, Decimal> = invoices
        .iter()
        .filter_map(|inv| inv.sold_item_id.map(|id| (id, inv.invoice_price)))
        .collect();

    let mut rows: Vec<&SoldItem> = sold.to_vec();
    rows.sort_by(|a, b| b.sold_date.cmp(&a.sold_date));
    rows.into_iter()
        .map(|sale| ReportRow {
            product: sale.name.clone(),
            date: sale.sold_date.with_timezone(&tz).format("%d.%m.%Y %H:%M").to_string(),
            price: by_sale.get(&sale.id).copied().unwrap_or(sale.total_value),
            source: match sale.source.trim() {
                "" => UNKNOWN_SOURCE_LABEL.to_string(),
                s => s.to_string(),
            },
        })
        .collect()
}

/// Download name such as `raport-vanzari-week-2025-07-14_2025-07-18.pdf`
pub fn report_file_name(period: Period, start: NaiveDate, end: NaiveDate, extension: &str) -> String {
    format!(
        "raport-vanzari-{}-{}_{}.{}",
        period.as_str(),
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d"),
        extension
    )
}
