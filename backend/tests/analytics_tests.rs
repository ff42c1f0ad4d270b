//! Analytics tests
//!
//! Tests for period aggregation and bucketing:
//! - An empty day reports zero sales, profit and transactions
//! - Stock value always comes from current stock
//! - ISO week bucketing follows the Thursday rule across month boundaries
//! - Bucket totals add up to the period totals

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{
    apply_change, compute_analytics, iso_week_key, period_buckets, Period, SoldItem, SoldItemChange,
    StockItem, UNKNOWN_SOURCE_LABEL,
};

fn utc() -> Tz {
    chrono_tz::UTC
}

fn bucharest() -> Tz {
    chrono_tz::Europe::Bucharest
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn stock(quantity: i64, unit_price: i64) -> StockItem {
    StockItem {
        id: Uuid::new_v4(),
        line_number: 1,
        description: "Vaza".to_string(),
        unit: "buc".to_string(),
        quantity: Decimal::from(quantity),
        unit_price: Decimal::from(unit_price),
        value: Decimal::from(unit_price + 10),
        vat: Decimal::ZERO,
        supplier: String::new(),
        proforma_number: "1042".to_string(),
        serie: String::new(),
        date: "2025-07-01".to_string(),
        currency: "EUR".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn sale(stock_item_id: Option<Uuid>, qty: i32, total: i64, when: DateTime<Utc>) -> SoldItem {
    SoldItem {
        id: Uuid::new_v4(),
        stock_item_id,
        name: "Vaza".to_string(),
        category: String::new(),
        description: "Vaza".to_string(),
        unit: "buc".to_string(),
        quantity_sold: qty,
        sale_price: Decimal::from(total),
        total_value: Decimal::from(total),
        sold_by: "ana@example.com".to_string(),
        sold_date: when,
        source: "Facebook".to_string(),
        created_at: when,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_empty_day_reports_zero_with_stock_value() {
        let items = vec![stock(3, 20), stock(10, 5), stock(0, 20)];
        // yesterday's sale is outside the day window
        let sold = vec![sale(Some(items[0].id), 1, 40, at(2025, 7, 17, 15))];
        let report = compute_analytics(Period::Day, at(2025, 7, 18, 12), utc(), &items, &sold);

        assert_eq!(report.total_sales, Decimal::ZERO);
        assert_eq!(report.total_profit, Decimal::ZERO);
        assert_eq!(report.transaction_count, 0);
        assert_eq!(report.average_sale, Decimal::ZERO);
        assert_eq!(report.total_stock_value, Decimal::from(110));
        // the zeroed row counts as low stock
        assert_eq!(report.low_stock_count, 2);
        assert_eq!(report.series.len(), 1);
        assert_eq!(report.series[0].transactions, 0);
        assert!(report.top_products.is_empty());
        assert!(report.sales_by_source.is_empty());
    }

    #[test]
    fn test_thursday_of_week_29_lands_in_week_29() {
        // Thursday 17 July 2025
        let thursday = at(2025, 7, 17, 10);
        assert_eq!(iso_week_key(thursday.date_naive()), "2025-W29");

        let items = vec![stock(5, 20)];
        let sold = vec![sale(Some(items[0].id), 2, 100, thursday)];
        let report = compute_analytics(Period::Month, at(2025, 7, 30, 9), utc(), &items, &sold);

        let bucket = report.series.iter().find(|b| b.key == "2025-W29").unwrap();
        assert_eq!(bucket.transactions, 1);
        assert_eq!(bucket.sales, Decimal::from(100));
        assert_eq!(bucket.profit, Decimal::from(60));
        assert_eq!(report.series.iter().map(|b| b.transactions).sum::<u32>(), 1);
    }

    #[test]
    fn test_week_spanning_months_keeps_its_key() {
        // Friday 1 August 2025 belongs to ISO week 31, which starts in July
        let friday = at(2025, 8, 1, 10);
        let sold = vec![sale(None, 1, 30, friday)];
        let report = compute_analytics(Period::Month, at(2025, 8, 20, 9), utc(), &[], &sold);

        assert_eq!(report.series[0].key, "2025-W31");
        assert_eq!(report.series[0].transactions, 1);
        // missing stock row means zero cost
        assert_eq!(report.total_profit, Decimal::from(30));
    }

    #[test]
    fn test_new_year_days_belong_to_previous_iso_year() {
        // 1 January 2027 is a Friday of 2026-W53
        let buckets = period_buckets(Period::Month, NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
        assert_eq!(buckets[0].0, "2026-W53");
        assert_eq!(buckets[1].0, "2027-W01");

        let sold = vec![sale(None, 1, 10, at(2027, 1, 2, 12))];
        let report = compute_analytics(Period::Month, at(2027, 1, 15, 12), utc(), &[], &sold);
        assert_eq!(report.series[0].transactions, 1);
    }

    #[test]
    fn test_local_timezone_moves_late_sales_to_next_day() {
        // 22:30 UTC on the 17th is 01:30 local on the 18th
        let late = at(2025, 7, 17, 22) + Duration::minutes(30);
        let sold = vec![sale(None, 1, 25, late)];

        let local = compute_analytics(Period::Day, at(2025, 7, 18, 8), bucharest(), &[], &sold);
        assert_eq!(local.transaction_count, 1);

        let in_utc = compute_analytics(Period::Day, at(2025, 7, 18, 8), utc(), &[], &sold);
        assert_eq!(in_utc.transaction_count, 0);
    }

    #[test]
    fn test_day_window_tracks_summer_and_winter_time() {
        // 00:45 local the next day in summer (UTC+3) and 23:45 the same day in winter (UTC+2)
        let summer_sale = sale(None, 1, 25, Utc.with_ymd_and_hms(2025, 7, 18, 21, 45, 0).unwrap());
        let summer = compute_analytics(Period::Day, at(2025, 7, 19, 9), bucharest(), &[], &[summer_sale]);
        assert_eq!(summer.transaction_count, 1);
        assert_eq!(summer.period_start, at(2025, 7, 18, 21));

        let winter_sale = sale(None, 1, 25, Utc.with_ymd_and_hms(2025, 1, 18, 21, 45, 0).unwrap());
        let winter = compute_analytics(Period::Day, at(2025, 1, 19, 9), bucharest(), &[], &[winter_sale]);
        assert_eq!(winter.transaction_count, 0);
        assert_eq!(winter.period_start, at(2025, 1, 18, 22));
    }

    #[test]
    fn test_year_buckets_across_both_dst_changes() {
        let sold = vec![
            // 00:30 EEST on 1 April
            sale(None, 1, 10, Utc.with_ymd_and_hms(2025, 3, 31, 21, 30, 0).unwrap()),
            // 00:30 EET on 1 November
            sale(None, 1, 20, Utc.with_ymd_and_hms(2025, 10, 31, 22, 30, 0).unwrap()),
        ];
        let report = compute_analytics(Period::Year, at(2025, 12, 1, 12), bucharest(), &[], &sold);
        assert_eq!(report.series[3].key, "2025-04");
        assert_eq!(report.series[3].sales, Decimal::from(10));
        assert_eq!(report.series[10].key, "2025-11");
        assert_eq!(report.series[10].sales, Decimal::from(20));
        assert_eq!(report.series[2].sales, Decimal::ZERO);
        assert_eq!(report.series[9].sales, Decimal::ZERO);
    }

    #[test]
    fn test_week_buckets_monday_to_sunday() {
        let report = compute_analytics(Period::Week, at(2025, 7, 18, 12), utc(), &[], &[]);
        let labels: Vec<&str> = report.series.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Luni", "Marți", "Miercuri", "Joi", "Vineri", "Sâmbătă", "Duminică"]
        );
        assert_eq!(report.series[0].key, "2025-07-14");
    }

    #[test]
    fn test_empty_source_is_reported_as_unknown() {
        let mut s = sale(None, 3, 30, at(2025, 7, 18, 9));
        s.source = String::new();
        let report = compute_analytics(Period::Year, at(2025, 7, 18, 12), utc(), &[], &[s]);
        assert_eq!(report.sales_by_source[0].source, UNKNOWN_SOURCE_LABEL);
        assert_eq!(report.sales_by_source[0].quantity, 3);
        assert_eq!(report.series.len(), 12);
        assert_eq!(report.series[6].transactions, 1);
    }

    #[test]
    fn test_live_feed_changes_keep_list_current() {
        let first = sale(None, 1, 10, at(2025, 7, 18, 9));
        let mut items = vec![first.clone()];

        let second = sale(None, 2, 20, at(2025, 7, 18, 10));
        apply_change(&mut items, SoldItemChange::Insert { record: second.clone() });
        assert_eq!(items[0].id, second.id);

        apply_change(&mut items, SoldItemChange::Delete { id: first.id });
        assert_eq!(items.len(), 1);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn period_strategy() -> impl Strategy<Value = Period> {
        prop_oneof![
            Just(Period::Day),
            Just(Period::Week),
            Just(Period::Month),
            Just(Period::Year),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Bucket totals add up to the period totals for every period kind
        #[test]
        fn prop_buckets_sum_to_totals(
            period in period_strategy(),
            day_of_year in 0i64..365,
            sales in prop::collection::vec((0i64..400, 1i32..5, 1i64..500), 0..40)
        ) {
            let now = at(2025, 1, 1, 12) + Duration::days(day_of_year);
            let items = vec![stock(8, 15)];
            let sold: Vec<SoldItem> = sales
                .iter()
                .map(|(hours_back, qty, total)| {
                    sale(Some(items[0].id), *qty, *total, now - Duration::hours(*hours_back))
                })
                .collect();

            let report = compute_analytics(period, now, utc(), &items, &sold);
            let bucket_sales: Decimal = report.series.iter().map(|b| b.sales).sum();
            let bucket_profit: Decimal = report.series.iter().map(|b| b.profit).sum();
            let bucket_count: u32 = report.series.iter().map(|b| b.transactions).sum();

            prop_assert_eq!(bucket_sales, report.total_sales);
            prop_assert_eq!(bucket_profit, report.total_profit);
            prop_assert_eq!(bucket_count as usize, report.transaction_count);
            prop_assert_eq!(report.total_stock_value, Decimal::from(120));
        }

        /// Every day of a month falls into one of that month's week buckets
        #[test]
        fn prop_month_buckets_cover_every_day(year in 2000i32..2100, month in 1u32..=12) {
            let start = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
            let keys: Vec<String> = period_buckets(Period::Month, start).into_iter().map(|(k, _)| k).collect();
            prop_assert!(keys.len() >= 4 && keys.len() <= 6);

            let mut day = start;
            while day.format("%m").to_string() == start.format("%m").to_string() {
                prop_assert!(keys.contains(&iso_week_key(day)));
                day += Duration::days(1);
            }
        }

        /// A Thursday and the rest of its ISO week share one key
        #[test]
        fn prop_iso_week_follows_thursday(days in 0i64..20000) {
            let monday = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap() + Duration::weeks(days / 7);
            let thursday = monday + Duration::days(3);
            let key = iso_week_key(thursday);
            for offset in 0..7 {
                prop_assert_eq!(iso_week_key(monday + Duration::days(offset)), key.clone());
            }
            let thursday_year = thursday.format("%Y").to_string();
            prop_assert!(key.starts_with(&thursday_year));
        }
    }
}
