use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{StockState, TrackedProduct};
use crate::utils::error::{AppError, Result};

/// Outcome of feeding one observation into the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Transition {
    /// false -> true; the only notify-worthy edge.
    BecameInStock,
    /// true -> false
    BecameOutOfStock,
    Unchanged,
}

/// Last known availability for every tracked product.
///
/// Holds exactly one entry per configured product. Owned by a single
/// monitor, so `&mut self` is the only write path.
#[derive(Debug, Clone, Default)]
pub struct StockStateStore {
    states: HashMap<String, StockState>,
}

impl StockStateStore {
    pub fn new<'a>(products: impl IntoIterator<Item = &'a TrackedProduct>) -> Self {
        let states = products
            .into_iter()
            .map(|p| (p.name.clone(), StockState::initial(p.name.clone())))
            .collect();
        Self { states }
    }

    /// Record `observed` for `product_name` and report the edge it produced.
    pub fn evaluate(&mut self, product_name: &str, observed: bool) -> Result<Transition> {
        let state = self.states.get_mut(product_name).ok_or_else(|| AppError::NotFound {
            resource: format!("product '{}'", product_name),
        })?;

        let transition = match (state.is_in_stock, observed) {
            (false, true) => Transition::BecameInStock,
            (true, false) => Transition::BecameOutOfStock,
            _ => Transition::Unchanged,
        };

        state.is_in_stock = observed;
        state.last_checked = Some(Utc::now());

        Ok(transition)
    }

    pub fn get(&self, product_name: &str) -> Option<&StockState> {
        self.states.get(product_name)
    }

    pub fn is_in_stock(&self, product_name: &str) -> bool {
        self.get(product_name).is_some_and(|s| s.is_in_stock)
    }

    pub fn snapshot(&self) -> Vec<StockState> {
        let mut states: Vec<StockState> = self.states.values().cloned().collect();
        states.sort_by(|a, b| a.product_name.cmp(&b.product_name));
        states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
