use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product page being watched for restocks.
///
/// `name` is the unique key; `locator` is the CSS selector of the element
/// whose presence means the product can be bought (usually "Add to Cart").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackedProduct {
    pub name: String,
    pub url: String,
    #[serde(alias = "selector")]
    pub locator: String,
}

impl TrackedProduct {
    pub fn new(name: impl Into<String>, url: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            locator: locator.into(),
        }
    }
}

/// Last known availability of one product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockState {
    pub product_name: String,
    pub is_in_stock: bool,
    pub last_checked: Option<DateTime<Utc>>,
}

impl StockState {
    /// Every product starts out of stock and unchecked.
    pub fn initial(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            is_in_stock: false,
            last_checked: None,
        }
    }
}

/// Restock announcement for a single false to true edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockNotification {
    pub product_name: String,
    pub url: String,
}

impl StockNotification {
    pub fn for_product(product: &TrackedProduct) -> Self {
        Self {
            product_name: product.name.clone(),
            url: product.url.clone(),
        }
    }

    pub fn message(&self) -> String {
        format!("{} is in stock: {}", self.product_name, self.url)
    }
}
