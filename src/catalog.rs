use crate::error::CatalogError;
use crate::transaction::PRODUCT_ID_PREFIX;

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com/products?limit=100";

/// A product as served by the external catalog.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProductRecord {
    pub id: u64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProductListing {
    #[serde(default)]
    products: Vec<ProductRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub rating: Option<f64>,
}

/// Product metadata keyed by feed ProductID (`"P1"` for catalog id 1).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_products<I>(products: I) -> Self
    where
        I: IntoIterator<Item = ProductRecord>,
    {
        let mut catalog = Self::new();
        for product in products {
            catalog.insert(
                product_key(product.id),
                CatalogEntry {
                    category: product.category,
                    brand: product.brand,
                    rating: product.rating,
                },
            );
        }
        catalog
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let listing: ProductListing = serde_json::from_str(json)?;
        Ok(Self::from_products(listing.products))
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, CatalogError> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Self::from_json_str(&json)
    }

    pub fn insert(&mut self, product_id: String, entry: CatalogEntry) -> Option<CatalogEntry> {
        self.entries.insert(product_id, entry)
    }

    pub fn get(&self, product_id: &str) -> Option<&CatalogEntry> {
        self.entries.get(product_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn product_key(id: u64) -> String {
    format!("{}{}", PRODUCT_ID_PREFIX, id)
}

pub async fn fetch_products(
    url: &str,
    timeout: Duration,
) -> Result<Vec<ProductRecord>, CatalogError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Status(status));
    }

    let body = response.text().await?;
    let listing: ProductListing = serde_json::from_str(&body)?;
    Ok(listing.products)
}

/// Fetches the catalog, falling back to an empty one on any failure.
pub async fn load_catalog(url: &str, timeout: Duration) -> Catalog {
    match fetch_products(url, timeout).await {
        Ok(products) => {
            info!(count = products.len(), "Fetched products from catalog");
            Catalog::from_products(products)
        }
        Err(e) => {
            warn!("Catalog unavailable, continuing without enrichment: {}", e);
            Catalog::new()
        }
    }
}
