//! Badge evaluator: records each badge at most once per session.

use std::collections::BTreeSet;

use crate::sim::Aggregates;
use super::catalogue::{Badge, BadgeThresholds};

/// A badge earned during this evaluation, with its one-time reward.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BadgeAward {
    pub badge: Badge,
    pub credits: u32,
}

impl BadgeAward {
    pub fn message(&self) -> String {
        format!(
            "Congratulations, you've unlocked \"{}\" and earned {} credits! Check out the store.",
            self.badge.title(),
            self.credits
        )
    }
}

#[derive(Clone, Debug)]
pub struct BadgeEvaluator {
    thresholds: BadgeThresholds,
    achieved: BTreeSet<Badge>,
}

impl BadgeEvaluator {
    pub fn new(thresholds: BadgeThresholds) -> Self {
        Self {
            thresholds,
            achieved: BTreeSet::new(),
        }
    }

    /// Test every badge not yet achieved; newly met ones are recorded and
    /// returned in catalogue order.
    pub fn evaluate(&mut self, agg: &Aggregates) -> Vec<BadgeAward> {
        let mut awards = Vec::new();
        for badge in Badge::ALL {
            if self.achieved.contains(&badge) || !badge.is_met(agg, &self.thresholds) {
                continue;
            }
            self.achieved.insert(badge);
            log::info!("badge earned: {}", badge.title());
            awards.push(BadgeAward { badge, credits: badge.credits() });
        }
        awards
    }

    pub fn is_achieved(&self, badge: Badge) -> bool {
        self.achieved.contains(&badge)
    }

    pub fn achieved(&self) -> impl Iterator<Item = Badge> + '_ {
        self.achieved.iter().copied()
    }
}
