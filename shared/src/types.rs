//! Common types used across the workspace

use serde::{Deserialize, Serialize};

/// Supported languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Romanian,
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Romanian => "ro",
            Language::English => "en",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "en" => Language::English,
            _ => Language::Romanian,
        }
    }
}

/// Inclusive date range, used for report file names and exports
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: chrono::NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}
