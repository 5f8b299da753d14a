use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Cannot read sales data from '{path}': {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write delimited output: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    #[error("no data to report")]
    NoData,

    #[error("Failed to format report: {0}")]
    Format(#[from] std::fmt::Error),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Total for {0} exceeds the representable range")]
    Overflow(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog responded with status {0}")]
    Status(reqwest::StatusCode),

    #[error("Catalog payload is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Cannot read catalog file: {0}")]
    Io(#[from] std::io::Error),
}

/// Reason a parsed record was rejected, one per validation check.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValidationFailure {
    #[error("quantity must be positive")]
    NonPositiveQuantity,

    #[error("unit price must be positive")]
    NonPositiveUnitPrice,

    #[error("transaction id is missing its prefix")]
    BadTransactionId,

    #[error("product id is missing its prefix")]
    BadProductId,

    #[error("customer id is missing its prefix")]
    BadCustomerId,

    #[error("region is empty")]
    EmptyRegion,

    #[error("quantity times unit price exceeds the representable range")]
    AmountOutOfRange,
}

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("Expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Quantity is not an integer: '{0}'")]
    InvalidQuantity(String),

    #[error("Unit price is not a number: '{0}'")]
    InvalidUnitPrice(String),
}
