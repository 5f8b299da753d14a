pub mod analytics;
pub mod catalog;
pub mod enrichment;
pub mod error;
pub mod output;
pub mod report;
pub mod source;
pub mod transaction;
pub mod validation;

pub use crate::error::{
    AnalyticsError, CatalogError, PipelineError, RecordError, ReportError, ValidationFailure,
};
pub use crate::source::read_sales_lines;
pub use crate::transaction::{parse_transactions, Transaction};
pub use crate::validation::{validate_and_filter, FilterOptions, ValidationSummary};
