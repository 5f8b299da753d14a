//! Aggregate views over a validated set of transactions.
//!
//! Every function here is a pure function of its input slice: each call builds
//! its own grouping from scratch, so the views can be computed in any order.

pub mod aggregate;


pub use aggregate::{
    best_selling_day, calculate_total_revenue, customer_analysis, daily_sales_trend,
    low_performing_products, product_sales, region_wise_sales, top_selling_products,
    CustomerStats, DailySales, ProductSales, RegionStats, DEFAULT_TOP_N,
};
