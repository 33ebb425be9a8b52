//! Collectible reward items.

use serde::{Deserialize, Serialize};

/// A collectible image that can be awarded to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardItem {
    /// Display name shown in the caption
    pub name: String,
    /// Rarity label shown in the caption (e.g., "Legendary")
    pub rarity: String,
    /// Remote location of the image bytes
    pub image_url: String,
    /// Relative drop weight. When no item in a catalog has a weight,
    /// draws are uniform.
    #[serde(default)]
    pub weight: Option<u32>,
}

impl RewardItem {
    pub fn new(name: &str, rarity: &str, image_url: &str) -> Self {
        Self {
            name: name.to_string(),
            rarity: rarity.to_string(),
            image_url: image_url.to_string(),
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Caption sent together with the image.
    pub fn caption(&self) -> String {
        format!("Name: {}\nRarity: {}", self.name, self.rarity)
    }
}

/// Built-in catalog used when the configuration does not provide one.
pub fn default_rewards() -> Vec<RewardItem> {
    vec![
        RewardItem::new(
            "Champions Cup",
            "Legendary",
            "https://drive.google.com/uc?id=1FZk4xHETsJ4-sEwqmnrFppQbhVG3XmYr",
        )
        .with_weight(5),
        RewardItem::new(
            "Victory Trophy",
            "Rare",
            "https://drive.google.com/uc?id=1oHXPJ7oZZEVIDn3U6rmt3fuXIRnEx7bc",
        )
        .with_weight(20),
        RewardItem::new(
            "Sports Medal",
            "Common",
            "https://drive.google.com/uc?id=1OQARcGCd78UhraR1NyUpcJcdqhhUvsQ3",
        )
        .with_weight(75),
    ]
}
