//! Virtual pet
//!
//! The pet lives between runs. `engine` holds the pure growth rules,
//! `service` wraps them with persistence, inventory and coins.

pub mod balancing;
pub mod engine;
pub mod service;
pub mod state;

use serde::{Deserialize, Serialize};

pub use balancing::Balancing;
pub use engine::{
    PetAlert, clean_poop, feed_pet, get_pet_buffs, pet_alerts, play_with_pet, update_pet_state,
};
pub use service::{ItemKind, PetError, PetService, ShopItem};
pub use state::{PetStage, PetState, Sickness};

/// Gameplay modifiers applied at run start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PetBuffs {
    pub score_multiplier: f32,
    pub starting_shield: bool,
    pub extra_lives: u8,
}

impl Default for PetBuffs {
    /// No pet, no bonus
    fn default() -> Self {
        Self {
            score_multiplier: 1.0,
            starting_shield: false,
            extra_lives: 0,
        }
    }
}
