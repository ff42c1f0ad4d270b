//! Shared types and models for stock and sales tracking
//!
//! This crate contains the domain models and the pure business rules used by
//! the backend and by the browser (via WASM).

pub mod analytics;
pub mod models;
pub mod types;
pub mod validation;

pub use analytics::*;
pub use models::*;
pub use types::*;
pub use validation::*;
