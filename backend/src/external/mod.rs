//! External API integrations

pub mod extraction;

pub use extraction::ExtractionClient;
