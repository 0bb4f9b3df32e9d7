//! Weight → price. Every price in the ledger comes from [`PriceSchedule::price_for`].

use crate::domain::model::Weight;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RATE_PER_KG: f64 = 2.5;
pub const DEFAULT_MINIMUM_CHARGE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSchedule {
    pub rate_per_kg: f64,
    pub minimum_charge: f64,
}

impl Default for PriceSchedule {
    fn default() -> Self {
        Self {
            rate_per_kg: DEFAULT_RATE_PER_KG,
            minimum_charge: DEFAULT_MINIMUM_CHARGE,
        }
    }
}

impl PriceSchedule {
    /// Zero, negative and non-finite weights price at 0. Otherwise the per-kilo rate
    /// applies, never below the minimum charge, rounded to cents.
    pub fn price_for(&self, weight_kg: f64) -> f64 {
        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            return 0.0;
        }
        let raw = (weight_kg * self.rate_per_kg).max(self.minimum_charge);
        (raw * 100.0).round() / 100.0
    }

    pub fn price_for_weight(&self, weight: &Weight) -> f64 {
        match weight {
            Weight::Kg(kg) => self.price_for(*kg),
            Weight::Unclear => 0.0,
        }
    }
}

/// Price under the default schedule.
pub fn price_for(weight_kg: f64) -> f64 {
    PriceSchedule::default().price_for(weight_kg)
}
