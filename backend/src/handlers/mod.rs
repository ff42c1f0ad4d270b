//! HTTP handlers

pub mod analytics;
pub mod auth;
pub mod health;
pub mod pending;
pub mod realtime;
pub mod sales;
pub mod stock;

pub use analytics::{export_report, get_analytics};
pub use auth::{login, logout, me, refresh, register};
pub use health::health_check;
pub use pending::{get_overview, list_pending};
pub use realtime::live_sales;
pub use sales::{list_sales, record_sale};
pub use stock::{add_stock_item, list_stock, upload_invoices};
