//! Pet data model
//!
//! Only the base stats are stored. Happiness and sickness are always derived
//! from them so the two can never drift apart.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::balancing::Balancing;

/// Life cycle phase. Progression is linear; `Dead` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PetStage {
    Egg,
    Slime,
    Teen,
    Adult,
    Dead,
}

impl PetStage {
    /// The stage this one evolves into (Adult is stable, Dead is terminal)
    pub fn next(self) -> Option<PetStage> {
        match self {
            PetStage::Egg => Some(PetStage::Slime),
            PetStage::Slime => Some(PetStage::Teen),
            PetStage::Teen => Some(PetStage::Adult),
            PetStage::Adult | PetStage::Dead => None,
        }
    }

    /// Whether care actions (feed/clean/play) apply
    pub fn accepts_care(self) -> bool {
        !matches!(self, PetStage::Egg | PetStage::Dead)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PetStage::Egg => "Egg",
            PetStage::Slime => "Slime",
            PetStage::Teen => "Teen",
            PetStage::Adult => "Adult",
            PetStage::Dead => "Dead",
        }
    }
}

/// Derived health condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sickness {
    None,
    Sick,
    Berserk,
}

/// Lifetime care counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PetCounters {
    pub times_fed: u32,
    pub times_played: u32,
    pub poops_cleaned: u32,
    pub runs_played: u32,
}

/// Owned items: item id -> count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub food: BTreeMap<String, u32>,
    pub toys: BTreeMap<String, u32>,
}

/// Persisted pet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetState {
    pub id: String,
    pub name: String,
    pub stage: PetStage,
    /// 0 = full, 100 = starving
    pub hunger: f32,
    /// 0 = spotless, 100 = filthy
    pub dirt: f32,
    /// 0 = entertained, 100 = bored stiff
    pub boredom: f32,
    pub hp: f32,
    pub poop_count: u32,
    /// Fractional hours not yet spent on poop trials
    #[serde(default)]
    pub poop_clock_hours: f64,
    /// Total age in hours (never resets)
    pub age_hours: f64,
    /// Hours spent in the current stage
    pub stage_age_hours: f64,
    pub counters: PetCounters,
    pub coins: u32,
    pub inventory: Inventory,
    /// Unix ms of birth
    pub born_at: i64,
    /// Unix ms of the last `update_pet_state`
    pub last_update: i64,
    #[serde(default)]
    pub died_at: Option<i64>,
}

impl PetState {
    /// A fresh egg
    pub fn new(id: impl Into<String>, name: impl Into<String>, now: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stage: PetStage::Egg,
            hunger: 0.0,
            dirt: 0.0,
            boredom: 0.0,
            hp: 100.0,
            poop_count: 0,
            poop_clock_hours: 0.0,
            age_hours: 0.0,
            stage_age_hours: 0.0,
            counters: PetCounters::default(),
            coins: 0,
            inventory: Inventory::default(),
            born_at: now,
            last_update: now,
            died_at: None,
        }
    }

    /// `100 - mean(hunger, dirt, boredom)`, clamped to [0, 100]
    pub fn happiness(&self) -> f32 {
        let mean = (self.hunger + self.dirt + self.boredom) / 3.0;
        (100.0 - mean).clamp(0.0, 100.0)
    }

    /// Count of stats above their sickness threshold: 0 none, 1-2 sick, 3 berserk
    pub fn sickness(&self, balancing: &Balancing) -> Sickness {
        if self.stage == PetStage::Dead {
            return Sickness::None;
        }
        let t = &balancing.sickness_thresholds;
        let exceeded = [
            self.hunger > t.hunger,
            self.dirt > t.dirt,
            self.boredom > t.boredom,
        ]
        .into_iter()
        .filter(|&over| over)
        .count();
        match exceeded {
            0 => Sickness::None,
            1 | 2 => Sickness::Sick,
            _ => Sickness::Berserk,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.stage != PetStage::Dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happiness_derivation() {
        let mut pet = PetState::new("p1", "Blob", 0);
        assert_eq!(pet.happiness(), 100.0);
        pet.hunger = 60.0;
        pet.dirt = 30.0;
        pet.boredom = 0.0;
        assert_eq!(pet.happiness(), 70.0);
    }

    #[test]
    fn test_sickness_counts_thresholds() {
        let balancing = Balancing::default();
        let mut pet = PetState::new("p1", "Blob", 0);
        pet.stage = PetStage::Slime;
        pet.hunger = 90.0;
        assert_eq!(pet.sickness(&balancing), Sickness::Sick);
        pet.dirt = 90.0;
        assert_eq!(pet.sickness(&balancing), Sickness::Sick);
        pet.boredom = 90.0;
        assert_eq!(pet.sickness(&balancing), Sickness::Berserk);
        pet.stage = PetStage::Dead;
        assert_eq!(pet.sickness(&balancing), Sickness::None);
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(PetStage::Egg.next(), Some(PetStage::Slime));
        assert_eq!(PetStage::Adult.next(), None);
        assert_eq!(PetStage::Dead.next(), None);
        assert!(PetStage::Egg < PetStage::Adult);
    }
}
