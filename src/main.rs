use salesdesk::{
    analytics::{
        calculate_total_revenue, customer_analysis, daily_sales_trend, region_wise_sales,
        top_selling_products, DEFAULT_TOP_N,
    },
    catalog::{load_catalog, Catalog, DEFAULT_CATALOG_URL},
    enrichment::{enrich_sales_data, matched_count},
    output::{save_enriched, save_report},
    parse_transactions, read_sales_lines,
    report::{format_currency, render_report},
    validate_and_filter, CatalogError, FilterOptions, ReportError,
};

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Cleans a pipe-delimited sales feed, enriches it from the product catalog
/// and writes an analytics report.
#[derive(Debug, Parser)]
#[command(name = "salesdesk", version)]
struct Args {
    /// Pipe-delimited sales feed, first line is a header
    #[arg(long, default_value = "data/sales_data.txt")]
    input: PathBuf,

    #[arg(long, default_value = "data/enriched_sales_data.txt")]
    enriched_output: PathBuf,

    #[arg(long, default_value = "output/sales_report.txt")]
    report_output: PathBuf,

    #[arg(long, default_value = DEFAULT_CATALOG_URL)]
    catalog_url: String,

    /// Read the catalog from a local JSON file instead of the URL
    #[arg(long)]
    catalog_file: Option<PathBuf>,

    #[arg(long, default_value_t = 10)]
    catalog_timeout_secs: u64,

    /// Keep only transactions from this region
    #[arg(long)]
    region: Option<String>,

    /// Keep only transactions whose amount is at least this value
    #[arg(long)]
    min_amount: Option<Decimal>,

    /// Keep only transactions whose amount is at most this value
    #[arg(long)]
    max_amount: Option<Decimal>,

    /// Number of top products to log
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top: usize,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("SALESDESK_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn local_catalog(path: &Path) -> Catalog {
    let loaded = File::open(path)
        .map_err(CatalogError::from)
        .and_then(Catalog::from_reader);
    match loaded {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(
                "Catalog file '{}' unusable, continuing without enrichment: {}",
                path.display(),
                e
            );
            Catalog::new()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    info!("[1/10] Reading sales data from {}", args.input.display());
    let raw_lines = read_sales_lines(&args.input)?;

    info!("[2/10] Parsing transactions");
    let transactions = parse_transactions(&raw_lines);
    info!(parsed = transactions.len(), "Parsed records");

    let filters = FilterOptions {
        region: args.region.clone(),
        min_amount: args.min_amount,
        max_amount: args.max_amount,
    };
    info!("[3/10] Filter options: {:?}", filters);

    info!("[4/10] Validating transactions");
    let (valid, invalid, summary) = validate_and_filter(&transactions, &filters);
    info!(
        total = summary.total_input,
        invalid,
        after_region = summary.after_region_filter,
        after_amount = summary.after_amount_filter,
        final_count = summary.final_count,
        "Validation summary"
    );
    info!("Available regions: {:?}", summary.available_regions);
    if let Some((min, max)) = summary.amount_range {
        info!("Transaction amount range: {} to {}", min, max);
    }
    for (reason, count) in summary.rejections_by_reason() {
        info!(count, "Rejected: {}", reason);
    }

    info!("[5/10] Performing analysis");
    let total_revenue = calculate_total_revenue(&valid).context("computing total revenue")?;
    let regions = region_wise_sales(&valid).context("computing region sales")?;
    let top_products = top_selling_products(&valid, args.top).context("ranking products")?;
    let customers = customer_analysis(&valid).context("analysing customers")?;
    let trend = daily_sales_trend(&valid).context("computing the daily trend")?;
    info!(
        total_revenue = %format_currency(total_revenue),
        regions = regions.len(),
        customers = customers.len(),
        days = trend.len(),
        "Analysis complete"
    );
    for product in &top_products {
        info!(
            quantity = product.total_quantity,
            revenue = %format_currency(product.total_revenue),
            "Top product: {}",
            product.name
        );
    }

    info!("[6/10] Fetching product catalog");
    let catalog = match &args.catalog_file {
        Some(path) => local_catalog(path),
        None => {
            let timeout = Duration::from_secs(args.catalog_timeout_secs);
            load_catalog(&args.catalog_url, timeout).await
        }
    };

    info!("[7/10] Enriching sales data");
    let enriched = enrich_sales_data(&valid, &catalog);
    info!("Enriched {}/{} transactions", matched_count(&enriched), enriched.len());

    info!("[8/10] Saving enriched data");
    save_enriched(&args.enriched_output, &enriched)
        .with_context(|| format!("writing {}", args.enriched_output.display()))?;

    info!("[9/10] Generating report");
    let report = match render_report(&valid, &enriched, chrono::Local::now().naive_local()) {
        Ok(report) => report,
        Err(ReportError::NoData) => {
            warn!("No valid transactions, writing an empty report");
            ReportError::NoData.to_string()
        }
        Err(e) => return Err(e.into()),
    };
    save_report(&args.report_output, &report)
        .with_context(|| format!("writing {}", args.report_output.display()))?;

    info!(
        "[10/10] Done: {} and {}",
        args.enriched_output.display(),
        args.report_output.display()
    );
    Ok(())
}
