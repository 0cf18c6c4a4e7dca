//! Carbon-credit wallet and store purchases.
//!
//! Credits are earned from badges and spent on locked species or the
//! growth booster. Failed purchases never change the wallet.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::sim::Species;

/// Something that can be bought in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreItem {
    /// Unlocks a species for planting.
    Species(Species),
    /// Halves the default growth duration.
    GrowthBooster,
}

impl StoreItem {
    /// Every item the store offers.
    pub fn catalogue() -> Vec<StoreItem> {
        let mut items: Vec<_> = Species::ALL
            .into_iter()
            .filter(|s| s.requires_purchase())
            .map(StoreItem::Species)
            .collect();
        items.push(StoreItem::GrowthBooster);
        items
    }

    pub fn price(self) -> u32 {
        match self {
            StoreItem::Species(_) => 20,
            StoreItem::GrowthBooster => 50,
        }
    }

    pub fn label(self) -> String {
        match self {
            StoreItem::Species(species) => format!("{} Tree", species.label()),
            StoreItem::GrowthBooster => "Growth Booster".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Wallet {
    credits: u32,
    unlocked: BTreeSet<Species>,
}

impl Wallet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn credits(&self) -> u32 {
        self.credits
    }

    pub fn earn(&mut self, amount: u32) {
        self.credits = self.credits.saturating_add(amount);
    }

    /// Whether a species may be planted.
    pub fn is_unlocked(&self, species: Species) -> bool {
        !species.requires_purchase() || self.unlocked.contains(&species)
    }

    /// Buy an item. Species can only be bought once; the booster any number
    /// of times.
    pub fn purchase(&mut self, item: StoreItem) -> Result<()> {
        if let StoreItem::Species(species) = item {
            if self.is_unlocked(species) {
                return Err(Error::AlreadyPurchased(item));
            }
        }
        let price = item.price();
        if self.credits < price {
            return Err(Error::InsufficientCredits { price, available: self.credits });
        }

        self.credits -= price;
        if let StoreItem::Species(species) = item {
            self.unlocked.insert(species);
        }
        log::info!("purchased {} for {} credits ({} left)", item.label(), price, self.credits);
        Ok(())
    }
}
