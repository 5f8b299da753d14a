use crate::enrichment::EnrichedTransaction;
use crate::error::PipelineError;
use crate::transaction::FIELD_DELIMITER;

use csv::{QuoteStyle, WriterBuilder};
use rust_decimal::Decimal;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const ENRICHED_HEADER: [&str; 12] = [
    "TransactionID",
    "Date",
    "ProductID",
    "ProductName",
    "Quantity",
    "UnitPrice",
    "CustomerID",
    "Region",
    "API_Category",
    "API_Brand",
    "API_Rating",
    "API_Match",
];

pub const NULL_MARKER: &str = "None";

fn optional<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| NULL_MARKER.to_string())
}

fn flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Price text with trailing zeros dropped but at least one decimal place,
/// so `10.00` is written as `10.0` and `1250.50` as `1250.5`.
fn price_text(price: Decimal) -> String {
    let price = price.normalize();
    if price.scale() == 0 {
        format!("{}.0", price)
    } else {
        price.to_string()
    }
}

pub fn enriched_row(record: &EnrichedTransaction) -> [String; 12] {
    let tx = &record.transaction;
    [
        tx.transaction_id.clone(),
        tx.date.clone(),
        tx.product_id.clone(),
        tx.product_name.clone(),
        tx.quantity.to_string(),
        price_text(tx.unit_price),
        tx.customer_id.clone(),
        tx.region.clone(),
        optional(&record.api_category),
        optional(&record.api_brand),
        optional(&record.api_rating),
        flag(record.api_match).to_string(),
    ]
}

pub fn write_enriched<W: Write>(
    writer: W,
    records: &[EnrichedTransaction],
) -> Result<(), PipelineError> {
    let mut wtr = WriterBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .quote_style(QuoteStyle::Never)
        .from_writer(writer);

    wtr.write_record(ENRICHED_HEADER)?;
    for record in records {
        wtr.write_record(enriched_row(record))?;
    }
    wtr.flush()?;
    Ok(())
}

fn create_parent(path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub fn save_enriched(
    path: impl AsRef<Path>,
    records: &[EnrichedTransaction],
) -> Result<(), PipelineError> {
    let path = path.as_ref();
    create_parent(path)?;
    write_enriched(File::create(path)?, records)?;
    info!(path = %path.display(), rows = records.len(), "Saved enriched data");
    Ok(())
}

pub fn save_report(path: impl AsRef<Path>, report: &str) -> Result<(), PipelineError> {
    let path = path.as_ref();
    create_parent(path)?;
    fs::write(path, report)?;
    info!(path = %path.display(), "Saved report");
    Ok(())
}
