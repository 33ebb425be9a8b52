//! Reward catalog with weighted random draws.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use trophy_common::RewardItem;

use super::CatalogError;

/// Immutable set of collectible rewards.
pub struct RewardCatalog {
    items: Vec<RewardItem>,
    /// Present when at least one item declares a weight.
    weights: Option<WeightedIndex<u32>>,
}

impl RewardCatalog {
    /// Build a catalog. Items without a weight count as weight 1 when any
    /// other item has one; if none has a weight the draw is uniform.
    pub fn new(items: Vec<RewardItem>) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::NoRewards);
        }

        let weights = if items.iter().any(|item| item.weight.is_some()) {
            let index = WeightedIndex::new(items.iter().map(|item| item.weight.unwrap_or(1)))
                .map_err(|e| CatalogError::InvalidWeights(e.to_string()))?;
            Some(index)
        } else {
            None
        };

        tracing::info!(
            "Loaded {} rewards ({})",
            items.len(),
            if weights.is_some() { "weighted" } else { "uniform" }
        );

        Ok(Self { items, weights })
    }

    pub fn items(&self) -> &[RewardItem] {
        &self.items
    }

    /// Draw one reward using the thread-local generator.
    pub fn draw_one(&self) -> &RewardItem {
        self.draw_with(&mut rand::thread_rng())
    }

    /// Draw one reward using the given generator.
    pub fn draw_with<R: Rng>(&self, rng: &mut R) -> &RewardItem {
        let index = match &self.weights {
            Some(weights) => weights.sample(rng),
            None => rng.gen_range(0..self.items.len()),
        };
        &self.items[index]
    }
}
