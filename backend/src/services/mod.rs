//! Business logic services for the stock tracking server

pub mod analytics;
pub mod auth;
pub mod intake;
pub mod pending;
pub mod report;
pub mod sales;
pub mod stock;

pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use intake::IntakeService;
pub use pending::PendingService;
pub use report::ReportService;
pub use sales::SalesService;
pub use stock::StockService;
