//! Pet balancing table
//!
//! Per-stage rates and thresholds. Serializable so a balancing file can
//! replace the defaults without code changes.

use serde::{Deserialize, Serialize};

use super::state::PetStage;

/// Per-hour growth of the three base stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatRates {
    pub hunger: f32,
    pub dirt: f32,
    pub boredom: f32,
}

impl StatRates {
    const ZERO: StatRates = StatRates {
        hunger: 0.0,
        dirt: 0.0,
        boredom: 0.0,
    };
}

/// Stat values above which a stat counts toward sickness
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SicknessThresholds {
    pub hunger: f32,
    pub dirt: f32,
    pub boredom: f32,
}

/// Balancing configuration for the pet engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Balancing {
    pub slime_rates: StatRates,
    pub teen_rates: StatRates,
    pub adult_rates: StatRates,

    /// Chance of a poop per elapsed whole hour
    pub slime_poop_chance: f64,
    pub teen_poop_chance: f64,
    pub adult_poop_chance: f64,
    /// Poops on screen never exceed this
    pub max_poop: u32,
    /// Extra dirt per hour for each uncleaned poop
    pub dirt_per_poop: f32,

    pub sickness_thresholds: SicknessThresholds,
    /// Hunger at or above this kills the pet
    pub starvation_threshold: f32,

    /// Hours spent in a stage before evolving
    pub egg_hours: f64,
    pub slime_hours: f64,
    pub teen_hours: f64,

    pub feed_power: f32,
    pub clean_power: f32,
    pub play_power: f32,

    /// Urgency notification threshold, separate from the sickness thresholds
    pub alert_threshold: f32,
}

impl Default for Balancing {
    fn default() -> Self {
        Self {
            slime_rates: StatRates {
                hunger: 8.0,
                dirt: 5.0,
                boredom: 6.0,
            },
            teen_rates: StatRates {
                hunger: 6.0,
                dirt: 4.0,
                boredom: 5.0,
            },
            adult_rates: StatRates {
                hunger: 4.0,
                dirt: 3.0,
                boredom: 4.0,
            },

            slime_poop_chance: 0.3,
            teen_poop_chance: 0.2,
            adult_poop_chance: 0.15,
            max_poop: 4,
            dirt_per_poop: 2.0,

            sickness_thresholds: SicknessThresholds {
                hunger: 80.0,
                dirt: 75.0,
                boredom: 85.0,
            },
            starvation_threshold: 100.0,

            egg_hours: 1.0,
            slime_hours: 24.0,
            teen_hours: 72.0,

            feed_power: 30.0,
            clean_power: 25.0,
            play_power: 25.0,

            alert_threshold: 80.0,
        }
    }
}

impl Balancing {
    /// Stat growth for a stage (zero for Egg and Dead)
    pub fn rates(&self, stage: PetStage) -> StatRates {
        match stage {
            PetStage::Slime => self.slime_rates,
            PetStage::Teen => self.teen_rates,
            PetStage::Adult => self.adult_rates,
            PetStage::Egg | PetStage::Dead => StatRates::ZERO,
        }
    }

    pub fn poop_chance(&self, stage: PetStage) -> f64 {
        match stage {
            PetStage::Slime => self.slime_poop_chance,
            PetStage::Teen => self.teen_poop_chance,
            PetStage::Adult => self.adult_poop_chance,
            PetStage::Egg | PetStage::Dead => 0.0,
        }
    }

    /// Hours in `stage` before evolving; `None` when the stage never evolves
    pub fn stage_duration(&self, stage: PetStage) -> Option<f64> {
        match stage {
            PetStage::Egg => Some(self.egg_hours),
            PetStage::Slime => Some(self.slime_hours),
            PetStage::Teen => Some(self.teen_hours),
            PetStage::Adult | PetStage::Dead => None,
        }
    }
}
