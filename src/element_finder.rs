//! Availability detection from raw product page markup.
//!
//! A product is considered purchasable when its locator (a CSS selector,
//! typically the "Add to Cart" button) matches at least one element.

use scraper::{Html, Selector};

use crate::utils::error::AppError;

/// Returns `true` iff `locator` matches at least one element in `content`.
///
/// Never fails: empty or malformed markup simply has no matches, and an
/// unparseable locator is treated as matching nothing.
pub fn is_in_stock(content: &str, locator: &str) -> bool {
    count_matches(content, locator) > 0
}

/// Number of elements in `content` matched by `locator`.
pub fn count_matches(content: &str, locator: &str) -> usize {
    if content.trim().is_empty() {
        return 0;
    }

    let selector = match Selector::parse(locator) {
        Ok(selector) => selector,
        Err(e) => {
            tracing::debug!("Locator '{}' could not be parsed: {:?}", locator, e);
            return 0;
        }
    };

    let document = Html::parse_document(content);
    document.select(&selector).count()
}

/// Reject locators that would silently never match because they do not parse.
pub fn validate_locator(locator: &str) -> Result<(), AppError> {
    if locator.trim().is_empty() {
        return Err(AppError::Validation("locator must not be empty".to_string()));
    }

    Selector::parse(locator)
        .map(|_| ())
        .map_err(|e| AppError::Validation(format!("invalid CSS selector '{}': {:?}", locator, e)))
}
