use crate::error::AnalyticsError;
use crate::transaction::Transaction;

use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const DEFAULT_TOP_N: usize = 5;
const MONEY_DP: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct RegionStats {
    pub region: String,
    pub total_sales: Decimal,
    pub transaction_count: usize,
    /// Share of the grand total, in percent.
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductSales {
    pub name: String,
    pub total_quantity: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerStats {
    pub customer_id: String,
    pub total_spent: Decimal,
    pub purchase_count: usize,
    pub average_order_value: Decimal,
    pub products_bought: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailySales {
    pub date: String,
    pub total_revenue: Decimal,
    pub transaction_count: usize,
    pub unique_customers: usize,
}

#[derive(Default, Clone, Copy)]
struct Tally {
    amount: Decimal,
    count: usize,
}

#[derive(Default, Clone, Copy)]
struct ProductTally {
    quantity: i64,
    revenue: Decimal,
}

#[derive(Default)]
struct CustomerTally<'a> {
    spent: Decimal,
    count: usize,
    products: BTreeSet<&'a str>,
}

#[derive(Default)]
struct DayTally<'a> {
    revenue: Decimal,
    count: usize,
    customers: BTreeSet<&'a str>,
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp(MONEY_DP)
}

/// Descending on the primary key, then ascending on the group key.
fn desc_then_key<T: Ord, K: Ord>(a: (T, K), b: (T, K)) -> Ordering {
    b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1))
}

fn amount_of(tx: &Transaction) -> Result<Decimal, AnalyticsError> {
    tx.amount()
        .ok_or_else(|| AnalyticsError::Overflow(format!("transaction '{}'", tx.transaction_id)))
}

fn add_money(
    total: &mut Decimal,
    amount: Decimal,
    group: impl FnOnce() -> String,
) -> Result<(), AnalyticsError> {
    *total = total
        .checked_add(amount)
        .ok_or_else(|| AnalyticsError::Overflow(group()))?;
    Ok(())
}

pub fn calculate_total_revenue(transactions: &[Transaction]) -> Result<Decimal, AnalyticsError> {
    let mut total = Decimal::ZERO;
    for tx in transactions {
        add_money(&mut total, amount_of(tx)?, || "total revenue".to_string())?;
    }
    Ok(round_money(total))
}

pub fn region_wise_sales(transactions: &[Transaction]) -> Result<Vec<RegionStats>, AnalyticsError> {
    let mut groups: HashMap<&str, Tally> = HashMap::new();
    for tx in transactions {
        let entry = groups.entry(tx.region.as_str()).or_default();
        add_money(&mut entry.amount, amount_of(tx)?, || format!("region '{}'", tx.region))?;
        entry.count += 1;
    }

    let mut grand_total = Decimal::ZERO;
    for tally in groups.values() {
        add_money(&mut grand_total, tally.amount, || "all regions".to_string())?;
    }

    // Rank on exact totals so sub-cent differences survive rounding
    let mut ranked: Vec<(&str, Tally)> = groups.into_iter().collect();
    ranked.sort_by(|a, b| desc_then_key((a.1.amount, a.0), (b.1.amount, b.0)));

    Ok(ranked
        .into_iter()
        .map(|(region, tally)| {
            let percentage = if grand_total.is_zero() {
                Decimal::ZERO
            } else {
                (tally.amount / grand_total * Decimal::ONE_HUNDRED).round_dp(2)
            };
            RegionStats {
                region: region.to_string(),
                total_sales: round_money(tally.amount),
                transaction_count: tally.count,
                percentage,
            }
        })
        .collect())
}

fn product_tallies(
    transactions: &[Transaction],
) -> Result<Vec<(&str, ProductTally)>, AnalyticsError> {
    let mut groups: HashMap<&str, ProductTally> = HashMap::new();
    for tx in transactions {
        let entry = groups.entry(tx.product_name.as_str()).or_default();
        entry.quantity = entry
            .quantity
            .checked_add(tx.quantity)
            .ok_or_else(|| AnalyticsError::Overflow(format!("quantity of '{}'", tx.product_name)))?;
        add_money(&mut entry.revenue, amount_of(tx)?, || format!("product '{}'", tx.product_name))?;
    }
    Ok(groups.into_iter().collect())
}

fn to_product_sales(ranked: Vec<(&str, ProductTally)>) -> Vec<ProductSales> {
    ranked
        .into_iter()
        .map(|(name, tally)| ProductSales {
            name: name.to_string(),
            total_quantity: tally.quantity,
            total_revenue: round_money(tally.revenue),
        })
        .collect()
}

/// Every product ranked by quantity sold, highest first.
pub fn product_sales(transactions: &[Transaction]) -> Result<Vec<ProductSales>, AnalyticsError> {
    let mut ranked = product_tallies(transactions)?;
    ranked.sort_by(|a, b| desc_then_key((a.1.quantity, a.0), (b.1.quantity, b.0)));
    Ok(to_product_sales(ranked))
}

pub fn top_selling_products(
    transactions: &[Transaction],
    n: usize,
) -> Result<Vec<ProductSales>, AnalyticsError> {
    let mut products = product_sales(transactions)?;
    products.truncate(n);
    Ok(products)
}

/// The `n` products with the smallest quantity sold, lowest first.
pub fn low_performing_products(
    transactions: &[Transaction],
    n: usize,
) -> Result<Vec<ProductSales>, AnalyticsError> {
    let mut ranked = product_tallies(transactions)?;
    ranked.sort_by(|a, b| a.1.quantity.cmp(&b.1.quantity).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(n);
    Ok(to_product_sales(ranked))
}

pub fn customer_analysis(
    transactions: &[Transaction],
) -> Result<Vec<CustomerStats>, AnalyticsError> {
    let mut groups: HashMap<&str, CustomerTally> = HashMap::new();
    for tx in transactions {
        let entry = groups.entry(tx.customer_id.as_str()).or_default();
        add_money(&mut entry.spent, amount_of(tx)?, || format!("customer '{}'", tx.customer_id))?;
        entry.count += 1;
        entry.products.insert(tx.product_name.as_str());
    }

    let mut ranked: Vec<(&str, CustomerTally)> = groups.into_iter().collect();
    ranked.sort_by(|a, b| desc_then_key((a.1.spent, a.0), (b.1.spent, b.0)));

    Ok(ranked
        .into_iter()
        .map(|(customer_id, tally)| CustomerStats {
            customer_id: customer_id.to_string(),
            total_spent: round_money(tally.spent),
            purchase_count: tally.count,
            // count is at least one for every group
            average_order_value: round_money(tally.spent / Decimal::from(tally.count)),
            products_bought: tally.products.into_iter().map(str::to_string).collect(),
        })
        .collect())
}

fn day_tallies(transactions: &[Transaction]) -> Result<BTreeMap<&str, DayTally>, AnalyticsError> {
    let mut days: BTreeMap<&str, DayTally> = BTreeMap::new();
    for tx in transactions {
        let entry = days.entry(tx.date.as_str()).or_default();
        add_money(&mut entry.revenue, amount_of(tx)?, || format!("date '{}'", tx.date))?;
        entry.count += 1;
        entry.customers.insert(tx.customer_id.as_str());
    }
    Ok(days)
}

fn to_daily_sales(date: &str, tally: DayTally) -> DailySales {
    DailySales {
        date: date.to_string(),
        total_revenue: round_money(tally.revenue),
        transaction_count: tally.count,
        unique_customers: tally.customers.len(),
    }
}

pub fn daily_sales_trend(transactions: &[Transaction]) -> Result<Vec<DailySales>, AnalyticsError> {
    Ok(day_tallies(transactions)?
        .into_iter()
        .map(|(date, tally)| to_daily_sales(date, tally))
        .collect())
}

/// The day with the highest exact revenue; the earliest date wins a tie.
pub fn best_selling_day(
    transactions: &[Transaction],
) -> Result<Option<DailySales>, AnalyticsError> {
    let best = day_tallies(transactions)?
        .into_iter()
        .reduce(|best, day| if day.1.revenue > best.1.revenue { day } else { best });
    Ok(best.map(|(date, tally)| to_daily_sales(date, tally)))
}
