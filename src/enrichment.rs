use crate::catalog::Catalog;
use crate::transaction::Transaction;

/// A transaction joined with whatever the catalog knows about its product.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTransaction {
    pub transaction: Transaction,
    pub api_category: Option<String>,
    pub api_brand: Option<String>,
    pub api_rating: Option<f64>,
    pub api_match: bool,
}

impl EnrichedTransaction {
    pub fn new(transaction: &Transaction, catalog: &Catalog) -> Self {
        match catalog.get(&transaction.product_id) {
            Some(entry) => Self {
                transaction: transaction.clone(),
                api_category: entry.category.clone(),
                api_brand: entry.brand.clone(),
                api_rating: entry.rating,
                api_match: true,
            },
            None => Self {
                transaction: transaction.clone(),
                api_category: None,
                api_brand: None,
                api_rating: None,
                api_match: false,
            },
        }
    }
}

/// Left-joins every transaction with the catalog by ProductID.
pub fn enrich_sales_data(
    transactions: &[Transaction],
    catalog: &Catalog,
) -> Vec<EnrichedTransaction> {
    transactions
        .iter()
        .map(|tx| EnrichedTransaction::new(tx, catalog))
        .collect()
}

pub fn matched_count(enriched: &[EnrichedTransaction]) -> usize {
    enriched.iter().filter(|e| e.api_match).count()
}
