use crate::error::RecordError;

use csv::{ReaderBuilder, StringRecord, Terminator};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

pub const FIELD_DELIMITER: u8 = b'|';
pub const FIELD_COUNT: usize = 8;

pub const TRANSACTION_ID_PREFIX: &str = "T";
pub const PRODUCT_ID_PREFIX: &str = "P";
pub const CUSTOMER_ID_PREFIX: &str = "C";

const THOUSANDS_SEPARATOR: char = ',';

/// A single sale as it appears in the feed, with typed quantity and price.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub transaction_id: String,
    pub date: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub customer_id: String,
    pub region: String,
}

impl Transaction {
    /// Quantity times unit price, `None` when the product does not fit in a
    /// `Decimal`.
    pub fn amount(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}

/// The eight text fields of a feed line, before any cleaning.
#[derive(Debug, Deserialize)]
pub struct RawTransaction {
    pub transaction_id: String,
    pub date: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: String,
    pub unit_price: String,
    pub customer_id: String,
    pub region: String,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = RecordError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        let quantity = strip_separators(&raw.quantity);
        let quantity = quantity
            .trim()
            .parse::<i64>()
            .map_err(|_| RecordError::InvalidQuantity(raw.quantity.clone()))?;

        let unit_price = strip_separators(&raw.unit_price);
        let unit_price = Decimal::from_str(unit_price.trim())
            .map_err(|_| RecordError::InvalidUnitPrice(raw.unit_price.clone()))?;

        Ok(Transaction {
            transaction_id: raw.transaction_id,
            date: raw.date,
            product_id: raw.product_id,
            product_name: strip_separators(&raw.product_name),
            quantity,
            unit_price,
            customer_id: raw.customer_id,
            region: raw.region,
        })
    }
}

fn strip_separators(text: &str) -> String {
    text.replace(THOUSANDS_SEPARATOR, "")
}

fn parse_record(record: &StringRecord) -> Result<Transaction, RecordError> {
    if record.len() != FIELD_COUNT {
        return Err(RecordError::FieldCount {
            expected: FIELD_COUNT,
            found: record.len(),
        });
    }

    // Eight text columns always deserialize
    let raw: RawTransaction = record
        .deserialize(None)
        .map_err(|_| RecordError::FieldCount {
            expected: FIELD_COUNT,
            found: record.len(),
        })?;

    raw.try_into()
}

/// Parses header-less, non-blank feed lines into transactions.
///
/// Lines with the wrong number of fields or a non-numeric quantity/price are
/// dropped without error.
pub fn parse_transactions<I, S>(lines: I) -> Vec<Transaction>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut buffer = String::new();
    for line in lines {
        buffer.push_str(line.as_ref());
        buffer.push('\n');
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(FIELD_DELIMITER)
        .quoting(false)
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(buffer.as_bytes());

    rdr.records()
        .filter_map(|result| match result {
            Ok(record) => match parse_record(&record) {
                Ok(tx) => Some(tx),
                Err(e) => {
                    debug!("Skipping malformed line {:?}: {}", record.position(), e);
                    None
                }
            },
            Err(e) => {
                debug!("Skipping unreadable line: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_line() {
        let txs = parse_transactions(["T1|2024-01-01|P1|Widget|2|10.00|C1|North"]);

        assert_eq!(txs.len(), 1);
        let tx = &txs[0];
        assert_eq!(tx.transaction_id, "T1");
        assert_eq!(tx.date, "2024-01-01");
        assert_eq!(tx.product_id, "P1");
        assert_eq!(tx.product_name, "Widget");
        assert_eq!(tx.quantity, 2);
        assert_eq!(tx.unit_price, Decimal::from_str("10.00").unwrap());
        assert_eq!(tx.customer_id, "C1");
        assert_eq!(tx.region, "North");
        assert_eq!(tx.amount(), Some(Decimal::from(20)));
    }

    #[test]
    fn test_amount_beyond_decimal_range_is_none() {
        let txs =
            parse_transactions(["T1|2024-01-01|P1|W|9000000000000000000|100000000000|C1|North"]);

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount(), None);
    }

    #[test]
    fn test_thousands_separators_are_stripped() {
        let txs = parse_transactions(["T9|2024-02-03|P4|Laptop,Pro|1,000|1,250.50|C7|East"]);

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].product_name, "LaptopPro");
        assert_eq!(txs[0].quantity, 1000);
        assert_eq!(txs[0].unit_price, Decimal::from_str("1250.50").unwrap());
    }

    #[test]
    fn test_wrong_field_count_is_dropped() {
        let txs = parse_transactions([
            "T1|2024-01-01|P1|Widget|2",
            "T2|2024-01-01|P1|Widget|2|10.00|C1|North|extra",
            "T3|2024-01-01|P1|Widget|2|10.00|C1|North",
        ]);

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].transaction_id, "T3");
    }

    #[test]
    fn test_non_numeric_fields_are_dropped() {
        let txs = parse_transactions([
            "T1|2024-01-01|P1|Widget|two|10.00|C1|North",
            "T2|2024-01-01|P1|Widget|2|ten|C1|North",
            "T3|2024-01-01|P1|Widget|2.5|10.00|C1|North",
        ]);

        assert!(txs.is_empty());
    }

    #[test]
    fn test_parser_does_not_validate() {
        let txs = parse_transactions(["X1|2024-01-01|Q1|Widget|-3|0|Z1|"]);

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].quantity, -3);
        assert_eq!(txs[0].unit_price, Decimal::ZERO);
        assert_eq!(txs[0].region, "");
    }

    #[test]
    fn test_quotes_are_plain_text() {
        let txs = parse_transactions([r#"T1|2024-01-01|P1|"Deluxe" Mug|1|5|C1|West"#]);

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].product_name, r#""Deluxe" Mug"#);
    }

    #[test]
    fn test_empty_input() {
        let lines: Vec<String> = Vec::new();
        assert!(parse_transactions(lines).is_empty());
    }
}
