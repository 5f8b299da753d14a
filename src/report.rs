//! Plain-text sales report.
//!
//! The layout (section order, rule widths, ` | ` columns and the `₹` symbol)
//! is consumed by other tools and must stay byte-stable.

use crate::analytics::{
    best_selling_day, customer_analysis, daily_sales_trend, low_performing_products,
    region_wise_sales, top_selling_products, DEFAULT_TOP_N,
};
use crate::enrichment::{matched_count, EnrichedTransaction};
use crate::error::{AnalyticsError, ReportError};
use crate::transaction::Transaction;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fmt::Write;

pub const CURRENCY_SYMBOL: &str = "₹";
const RULE_WIDTH: usize = 44;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats an amount as `₹1,234,567.89`.
pub fn format_currency(value: Decimal) -> String {
    let fixed = format!("{:.2}", value.round_dp(2).abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value.is_sign_negative() && !value.round_dp(2).is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}{}.{}", sign, CURRENCY_SYMBOL, grouped, cents)
}

/// Headline figures computed directly from the records.
#[derive(Debug, Clone, PartialEq)]
pub struct OverallSummary {
    pub total_revenue: Decimal,
    pub transaction_count: usize,
    pub average_order_value: Decimal,
    pub first_date: String,
    pub last_date: String,
}

impl OverallSummary {
    pub fn from_records(records: &[Transaction]) -> Result<Self, ReportError> {
        let first_date = records.iter().map(|tx| &tx.date).min().ok_or(ReportError::NoData)?;
        let last_date = records.iter().map(|tx| &tx.date).max().ok_or(ReportError::NoData)?;

        let mut total = Decimal::ZERO;
        for tx in records {
            total = Decimal::from(tx.quantity)
                .checked_mul(tx.unit_price)
                .and_then(|amount| total.checked_add(amount))
                .ok_or_else(|| AnalyticsError::Overflow("overall summary".to_string()))?;
        }
        let count = records.len();

        Ok(Self {
            total_revenue: total.round_dp(2),
            transaction_count: count,
            average_order_value: (total / Decimal::from(count)).round_dp(2),
            first_date: first_date.clone(),
            last_date: last_date.clone(),
        })
    }
}

fn rule(out: &mut String, ch: char) -> std::fmt::Result {
    writeln!(out, "{}", ch.to_string().repeat(RULE_WIDTH))
}

fn section(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out, "{}", title)?;
    rule(out, '-')
}

fn write_report(
    out: &mut String,
    records: &[Transaction],
    enriched: &[EnrichedTransaction],
    generated_at: NaiveDateTime,
) -> Result<(), ReportError> {
    let summary = OverallSummary::from_records(records)?;

    rule(out, '=')?;
    writeln!(out, "SALES ANALYTICS REPORT")?;
    writeln!(out, "Generated: {}", generated_at.format(TIMESTAMP_FORMAT))?;
    writeln!(out, "Records Processed: {}", records.len())?;
    rule(out, '=')?;
    writeln!(out)?;

    section(out, "OVERALL SUMMARY")?;
    writeln!(out, "Total Revenue: {}", format_currency(summary.total_revenue))?;
    writeln!(out, "Total Transactions: {}", summary.transaction_count)?;
    writeln!(out, "Average Order Value: {}", format_currency(summary.average_order_value))?;
    writeln!(out, "Date Range: {} to {}", summary.first_date, summary.last_date)?;
    writeln!(out)?;

    section(out, "REGION-WISE PERFORMANCE")?;
    writeln!(out, "Region | Total Sales | % of Total | Transactions")?;
    for region in region_wise_sales(records)? {
        writeln!(
            out,
            "{} | {} | {:.2}% | {}",
            region.region,
            format_currency(region.total_sales),
            region.percentage,
            region.transaction_count
        )?;
    }
    writeln!(out)?;

    section(out, "TOP 5 PRODUCTS")?;
    writeln!(out, "Rank | Product | Quantity | Revenue")?;
    for (rank, product) in top_selling_products(records, DEFAULT_TOP_N)?.iter().enumerate() {
        writeln!(
            out,
            "{} | {} | {} | {}",
            rank + 1,
            product.name,
            product.total_quantity,
            format_currency(product.total_revenue)
        )?;
    }
    writeln!(out)?;

    section(out, "TOP 5 CUSTOMERS")?;
    writeln!(out, "Rank | CustomerID | Total Spent | Orders")?;
    for (rank, customer) in customer_analysis(records)?.iter().take(DEFAULT_TOP_N).enumerate() {
        writeln!(
            out,
            "{} | {} | {} | {}",
            rank + 1,
            customer.customer_id,
            format_currency(customer.total_spent),
            customer.purchase_count
        )?;
    }
    writeln!(out)?;

    section(out, "DAILY SALES TREND")?;
    writeln!(out, "Date | Revenue | Transactions | Customers")?;
    for day in daily_sales_trend(records)? {
        writeln!(
            out,
            "{} | {} | {} | {}",
            day.date,
            format_currency(day.total_revenue),
            day.transaction_count,
            day.unique_customers
        )?;
    }
    writeln!(out)?;

    section(out, "PRODUCT PERFORMANCE ANALYSIS")?;
    if let Some(best) = best_selling_day(records)? {
        writeln!(
            out,
            "Best Selling Day: {} ({} in {} transactions)",
            best.date,
            format_currency(best.total_revenue),
            best.transaction_count
        )?;
    }
    writeln!(out, "Low Performing Products:")?;
    for product in low_performing_products(records, DEFAULT_TOP_N)? {
        writeln!(
            out,
            "{} - Qty: {}, Revenue: {}",
            product.name,
            product.total_quantity,
            format_currency(product.total_revenue)
        )?;
    }
    writeln!(out)?;

    let matched = matched_count(enriched);
    let total = enriched.len();
    let rate = if total == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(matched) / Decimal::from(total) * Decimal::ONE_HUNDRED).round_dp(1)
    };

    section(out, "API ENRICHMENT SUMMARY")?;
    writeln!(out, "Products Enriched: {}/{}", matched, total)?;
    writeln!(out, "Success Rate: {:.1}%", rate)?;
    if total > 0 && matched == total {
        writeln!(out, "All products were enriched successfully.")?;
    }
    write!(out, "-- Final sales report generated successfully --")?;

    Ok(())
}

/// Renders the full report for a non-empty record set.
pub fn render_report(
    records: &[Transaction],
    enriched: &[EnrichedTransaction],
    generated_at: NaiveDateTime,
) -> Result<String, ReportError> {
    let mut out = String::new();
    write_report(&mut out, records, enriched, generated_at)?;
    Ok(out)
}
