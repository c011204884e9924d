use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::Instant;

use crate::element_finder;
use crate::models::{StockNotification, TrackedProduct};
use crate::plugins::traits::Notifier;
use crate::scraper::PageFetcher;
use crate::stock_state::{StockStateStore, Transition};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductCheckResult {
    pub product_name: String,
    pub success: bool,
    pub transition: Option<Transition>,
    pub notified: bool,
    pub error: Option<String>,
}

/// Summary of one pass over every tracked product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickReport {
    pub checked: usize,
    pub failed: usize,
    pub notifications_sent: usize,
    pub notify_failures: usize,
    pub results: Vec<ProductCheckResult>,
    pub total_time_ms: u64,
}

impl TickReport {
    pub fn transitions(&self) -> Vec<(String, Transition)> {
        self.results
            .iter()
            .filter_map(|r| r.transition.map(|t| (r.product_name.clone(), t)))
            .collect()
    }
}

/// Runs fetch, parse, transition and notify for each product in turn.
pub struct StockMonitor {
    products: Vec<TrackedProduct>,
    fetcher: Arc<dyn PageFetcher>,
    notifier: Arc<dyn Notifier>,
    store: StockStateStore,
}

impl StockMonitor {
    pub fn new(
        products: Vec<TrackedProduct>,
        fetcher: Arc<dyn PageFetcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let store = StockStateStore::new(&products);
        Self {
            products,
            fetcher,
            notifier,
            store,
        }
    }

    pub fn products(&self) -> &[TrackedProduct] {
        &self.products
    }

    pub fn store(&self) -> &StockStateStore {
        &self.store
    }

    /// Check every product once, in configured order.
    ///
    /// Failures are contained per product: a fetch or notify error is logged
    /// and recorded in the report, and the remaining products still run.
    pub async fn tick(&mut self) -> TickReport {
        let start_time = Instant::now();
        tracing::debug!("Stock check tick started for {} products", self.products.len());

        let mut report = TickReport::default();

        for index in 0..self.products.len() {
            let result = self.check_product(index).await;

            report.checked += 1;
            if !result.success {
                report.failed += 1;
            }
            if result.notified {
                report.notifications_sent += 1;
            } else if result.transition == Some(Transition::BecameInStock) {
                report.notify_failures += 1;
            }
            report.results.push(result);
        }

        report.total_time_ms = start_time.elapsed().as_millis() as u64;
        tracing::debug!(
            "Stock check tick finished: {} checked, {} failed, {} notified in {}ms",
            report.checked,
            report.failed,
            report.notifications_sent,
            report.total_time_ms
        );
        report
    }

    async fn check_product(&mut self, index: usize) -> ProductCheckResult {
        let product = &self.products[index];
        let mut result = ProductCheckResult {
            product_name: product.name.clone(),
            success: false,
            transition: None,
            notified: false,
            error: None,
        };

        let content = match self.fetcher.fetch(&product.url).await {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(product = %product.name, url = %product.url, "Failed to fetch product page: {}", e);
                result.error = Some(e.to_string());
                return result;
            }
        };

        let observed = element_finder::is_in_stock(&content, &product.locator);

        let transition = match self.store.evaluate(&product.name, observed) {
            Ok(transition) => transition,
            Err(e) => {
                tracing::error!(product = %product.name, "Failed to record stock state: {}", e);
                result.error = Some(e.to_string());
                return result;
            }
        };

        result.success = true;
        result.transition = Some(transition);

        match transition {
            Transition::BecameInStock => {
                tracing::info!(product = %product.name, url = %product.url, "{} is in stock", product.name);
                let notification = StockNotification::for_product(product);
                match self.notifier.notify(&notification).await {
                    Ok(()) => {
                        tracing::info!(product = %product.name, "Sent in-stock message via {}", self.notifier.name());
                        result.notified = true;
                    }
                    Err(e) => {
                        tracing::error!(product = %product.name, "Error sending in-stock message: {}", e);
                        result.error = Some(e.to_string());
                    }
                }
            }
            Transition::BecameOutOfStock => {
                tracing::warn!(product = %product.name, url = %product.url, "{} is out of stock", product.name);
            }
            Transition::Unchanged => {
                tracing::debug!(
                    product = %product.name,
                    in_stock = observed,
                    "No change for {} using locator '{}'",
                    product.name,
                    product.locator
                );
            }
        }

        result
    }
}
