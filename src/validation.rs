use crate::error::ValidationFailure;
use crate::transaction::{Transaction, CUSTOMER_ID_PREFIX, PRODUCT_ID_PREFIX, TRANSACTION_ID_PREFIX};

use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

type Check = fn(&Transaction) -> bool;

/// Checks run in order; the first one that fails decides the rejection reason.
const CHECKS: [(ValidationFailure, Check); 7] = [
    (ValidationFailure::NonPositiveQuantity, |tx| tx.quantity > 0),
    (ValidationFailure::NonPositiveUnitPrice, |tx| tx.unit_price > Decimal::ZERO),
    (ValidationFailure::BadTransactionId, |tx| {
        tx.transaction_id.starts_with(TRANSACTION_ID_PREFIX)
    }),
    (ValidationFailure::BadProductId, |tx| tx.product_id.starts_with(PRODUCT_ID_PREFIX)),
    (ValidationFailure::BadCustomerId, |tx| tx.customer_id.starts_with(CUSTOMER_ID_PREFIX)),
    (ValidationFailure::EmptyRegion, |tx| !tx.region.is_empty()),
    (ValidationFailure::AmountOutOfRange, |tx| tx.amount().is_some()),
];

pub fn validate(tx: &Transaction) -> Result<(), ValidationFailure> {
    for (failure, check) in CHECKS.iter() {
        if !check(tx) {
            return Err(*failure);
        }
    }
    Ok(())
}

/// Optional narrowing applied to valid records. A `Some` value is always
/// applied, zero included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub region: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub transaction_id: String,
    pub reason: ValidationFailure,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationSummary {
    pub total_input: usize,
    pub invalid: usize,
    pub valid: usize,
    pub after_region_filter: usize,
    pub after_amount_filter: usize,
    pub final_count: usize,
    pub available_regions: BTreeSet<String>,
    /// Smallest and largest amount among valid records, before filtering.
    pub amount_range: Option<(Decimal, Decimal)>,
    pub rejections: Vec<Rejection>,
}

impl ValidationSummary {
    pub fn rejections_by_reason(&self) -> BTreeMap<ValidationFailure, usize> {
        let mut tally = BTreeMap::new();
        for rejection in &self.rejections {
            *tally.entry(rejection.reason).or_insert(0) += 1;
        }
        tally
    }
}

/// Drops invalid records, then applies the region and amount filters in
/// that order.
///
/// Returns the surviving records, the number of invalid records and the
/// per-stage counts.
pub fn validate_and_filter(
    transactions: &[Transaction],
    filters: &FilterOptions,
) -> (Vec<Transaction>, usize, ValidationSummary) {
    let mut summary = ValidationSummary {
        total_input: transactions.len(),
        ..Default::default()
    };

    let mut valid = Vec::with_capacity(transactions.len());
    for tx in transactions {
        match validate(tx) {
            Ok(()) => valid.push(tx.clone()),
            Err(reason) => summary.rejections.push(Rejection {
                transaction_id: tx.transaction_id.clone(),
                reason,
            }),
        }
    }

    summary.invalid = summary.rejections.len();
    summary.valid = valid.len();
    summary.available_regions = valid.iter().map(|tx| tx.region.clone()).collect();
    summary.amount_range = amount_range(&valid);

    info!(
        total = summary.total_input,
        invalid = summary.invalid,
        valid = summary.valid,
        "Validation complete"
    );

    let mut filtered = valid;

    if let Some(region) = &filters.region {
        filtered.retain(|tx| &tx.region == region);
        info!(region = %region, remaining = filtered.len(), "Applied region filter");
    }
    summary.after_region_filter = filtered.len();

    if let Some(min) = filters.min_amount {
        filtered.retain(|tx| tx.amount().is_some_and(|amount| amount >= min));
    }
    if let Some(max) = filters.max_amount {
        filtered.retain(|tx| tx.amount().is_some_and(|amount| amount <= max));
    }
    summary.after_amount_filter = filtered.len();
    summary.final_count = filtered.len();

    (filtered, summary.invalid, summary)
}

fn amount_range(transactions: &[Transaction]) -> Option<(Decimal, Decimal)> {
    let mut amounts = transactions.iter().filter_map(Transaction::amount);
    let first = amounts.next()?;
    Some(amounts.fold((first, first), |(lo, hi), a| (lo.min(a), hi.max(a))))
}
