//! Pet service
//!
//! Every public operation loads the pet, catches it up to `now`, applies the
//! change and saves it back before returning. Nothing is written lazily, so
//! two quick taps on "buy" can never both spend the same coins.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use thiserror::Error;

use super::PetBuffs;
use super::balancing::Balancing;
use super::engine::{
    PetAlert, clean_poop, feed_pet, get_pet_buffs, pet_alerts, play_with_pet, update_pet_state,
};
use super::state::{PetStage, PetState};
use crate::persistence::{KeyValueStore, ProfileStore, StorageError};

/// Storage key for the pet
pub const PET_STORAGE_KEY: &str = "pet";

/// Pet service errors
#[derive(Error, Debug)]
pub enum PetError {
    #[error("No pet adopted")]
    NoPet,

    #[error("A living pet is already adopted")]
    AlreadyAdopted,

    #[error("Pet cannot be cared for while {0:?}")]
    CannotCare(PetStage),

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Item {0} is not a {1:?}")]
    WrongItemKind(String, ItemKind),

    #[error("Out of {0}")]
    OutOfStock(String),

    #[error("Not enough coins: need {needed}, have {have}")]
    InsufficientCoins { needed: u32, have: u32 },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Food,
    Toy,
}

/// Shop catalog entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShopItem {
    pub id: &'static str,
    pub kind: ItemKind,
    pub price: u32,
    /// Stat reduction per use
    pub power: f32,
    /// Uses granted per purchase
    pub uses: u32,
}

const CATALOG: &[ShopItem] = &[
    ShopItem {
        id: "apple",
        kind: ItemKind::Food,
        price: 5,
        power: 20.0,
        uses: 1,
    },
    ShopItem {
        id: "cake",
        kind: ItemKind::Food,
        price: 12,
        power: 45.0,
        uses: 1,
    },
    ShopItem {
        id: "ball",
        kind: ItemKind::Toy,
        price: 8,
        power: 20.0,
        uses: 3,
    },
    ShopItem {
        id: "yarn",
        kind: ItemKind::Toy,
        price: 15,
        power: 35.0,
        uses: 2,
    },
];

pub fn catalog() -> &'static [ShopItem] {
    CATALOG
}

fn find_item(id: &str, kind: ItemKind) -> Result<&'static ShopItem, PetError> {
    let item = CATALOG
        .iter()
        .find(|item| item.id == id)
        .ok_or_else(|| PetError::UnknownItem(id.to_string()))?;
    if item.kind != kind {
        return Err(PetError::WrongItemKind(id.to_string(), kind));
    }
    Ok(item)
}

/// Take one use of `id` out of an inventory bucket
fn consume(bucket: &mut std::collections::BTreeMap<String, u32>, id: &str) -> Result<(), PetError> {
    match bucket.get_mut(id) {
        Some(count) if *count > 0 => {
            *count -= 1;
            if *count == 0 {
                bucket.remove(id);
            }
            Ok(())
        }
        _ => Err(PetError::OutOfStock(id.to_string())),
    }
}

/// Persistence-backed pet operations
pub struct PetService {
    balancing: Balancing,
    rng: Pcg32,
}

impl PetService {
    pub fn new(balancing: Balancing, seed: u64) -> Self {
        Self {
            balancing,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn balancing(&self) -> &Balancing {
        &self.balancing
    }

    /// Load, catch up and save. `None` when no pet was ever adopted.
    pub fn load<S: KeyValueStore>(
        &mut self,
        store: &ProfileStore<S>,
        now: i64,
    ) -> Result<Option<PetState>, PetError> {
        let Some(pet) = store.load::<PetState>(PET_STORAGE_KEY) else {
            return Ok(None);
        };
        let pet = update_pet_state(&pet, now, &self.balancing, &mut self.rng);
        store.save(PET_STORAGE_KEY, &pet)?;
        Ok(Some(pet))
    }

    /// Adopt a new egg. A dead pet's coins and inventory carry over.
    pub fn adopt<S: KeyValueStore>(
        &mut self,
        store: &ProfileStore<S>,
        name: &str,
        now: i64,
    ) -> Result<PetState, PetError> {
        let previous = self.load(store, now)?;
        if previous.as_ref().is_some_and(PetState::is_alive) {
            return Err(PetError::AlreadyAdopted);
        }

        let mut pet = PetState::new(format!("pet-{now}"), name, now);
        if let Some(old) = previous {
            pet.coins = old.coins;
            pet.inventory = old.inventory;
        }
        store.save(PET_STORAGE_KEY, &pet)?;
        log::info!("Adopted {}", pet.name);
        Ok(pet)
    }

    /// Load-before/save-after wrapper used by every mutating operation
    fn mutate<S, F>(&mut self, store: &ProfileStore<S>, now: i64, f: F) -> Result<PetState, PetError>
    where
        S: KeyValueStore,
        F: FnOnce(&mut PetState, &Balancing) -> Result<(), PetError>,
    {
        let mut pet = self.load(store, now)?.ok_or(PetError::NoPet)?;
        f(&mut pet, &self.balancing)?;
        store.save(PET_STORAGE_KEY, &pet)?;
        Ok(pet)
    }

    fn require_care(pet: &PetState) -> Result<(), PetError> {
        if pet.stage.accepts_care() {
            Ok(())
        } else {
            Err(PetError::CannotCare(pet.stage))
        }
    }

    /// Feed one food item from the inventory
    pub fn feed<S: KeyValueStore>(
        &mut self,
        store: &ProfileStore<S>,
        food_id: &str,
        now: i64,
    ) -> Result<PetState, PetError> {
        let item = find_item(food_id, ItemKind::Food)?;
        self.mutate(store, now, |pet, _| {
            Self::require_care(pet)?;
            consume(&mut pet.inventory.food, food_id)?;
            *pet = feed_pet(pet, item.power);
            Ok(())
        })
    }

    /// Clean one poop; free
    pub fn clean<S: KeyValueStore>(
        &mut self,
        store: &ProfileStore<S>,
        now: i64,
    ) -> Result<PetState, PetError> {
        self.mutate(store, now, |pet, balancing| {
            Self::require_care(pet)?;
            *pet = clean_poop(pet, balancing.clean_power);
            Ok(())
        })
    }

    /// Play using one use of a toy, or bare-handed when `toy_id` is `None`
    pub fn play<S: KeyValueStore>(
        &mut self,
        store: &ProfileStore<S>,
        toy_id: Option<&str>,
        now: i64,
    ) -> Result<PetState, PetError> {
        let power = match toy_id {
            Some(id) => Some(find_item(id, ItemKind::Toy)?.power),
            None => None,
        };
        self.mutate(store, now, |pet, balancing| {
            Self::require_care(pet)?;
            if let Some(id) = toy_id {
                consume(&mut pet.inventory.toys, id)?;
            }
            *pet = play_with_pet(pet, power.unwrap_or(balancing.play_power));
            Ok(())
        })
    }

    /// Spend coins on a catalog item
    pub fn buy<S: KeyValueStore>(
        &mut self,
        store: &ProfileStore<S>,
        item_id: &str,
        now: i64,
    ) -> Result<PetState, PetError> {
        let item = CATALOG
            .iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| PetError::UnknownItem(item_id.to_string()))?;
        self.mutate(store, now, |pet, _| {
            if pet.coins < item.price {
                return Err(PetError::InsufficientCoins {
                    needed: item.price,
                    have: pet.coins,
                });
            }
            pet.coins -= item.price;
            let bucket = match item.kind {
                ItemKind::Food => &mut pet.inventory.food,
                ItemKind::Toy => &mut pet.inventory.toys,
            };
            *bucket.entry(item.id.to_string()).or_insert(0) += item.uses;
            log::info!("Bought {} for {} coins", item.id, item.price);
            Ok(())
        })
    }

    /// Credit coins earned in a run
    pub fn award_coins<S: KeyValueStore>(
        &mut self,
        store: &ProfileStore<S>,
        coins: u32,
        now: i64,
    ) -> Result<PetState, PetError> {
        self.mutate(store, now, |pet, _| {
            pet.coins = pet.coins.saturating_add(coins);
            pet.counters.runs_played += 1;
            Ok(())
        })
    }

    /// Buffs for the next run; neutral without a pet. A failed catch-up
    /// save only costs the write, the loaded pet still counts.
    pub fn buffs<S: KeyValueStore>(&mut self, store: &ProfileStore<S>, now: i64) -> PetBuffs {
        let Some(pet) = store.load::<PetState>(PET_STORAGE_KEY) else {
            return PetBuffs::default();
        };
        let pet = update_pet_state(&pet, now, &self.balancing, &mut self.rng);
        if let Err(e) = store.save(PET_STORAGE_KEY, &pet) {
            log::warn!("Failed to save pet before run: {e}");
        }
        get_pet_buffs(&pet)
    }

    pub fn alerts<S: KeyValueStore>(
        &mut self,
        store: &ProfileStore<S>,
        now: i64,
    ) -> Result<Vec<PetAlert>, PetError> {
        let pet = self.load(store, now)?.ok_or(PetError::NoPet)?;
        Ok(pet_alerts(&pet, &self.balancing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    const HOUR: i64 = 3_600_000;

    fn setup() -> (PetService, ProfileStore<MemoryStore>) {
        (
            PetService::new(Balancing::default(), 42),
            ProfileStore::in_memory(),
        )
    }

    /// Adopt and hatch a pet so it accepts care
    fn hatched(service: &mut PetService, store: &ProfileStore<MemoryStore>) -> PetState {
        service.adopt(store, "Blob", 0).unwrap();
        let pet = service.load(store, 2 * HOUR).unwrap().unwrap();
        assert_eq!(pet.stage, PetStage::Slime);
        pet
    }

    #[test]
    fn test_load_without_pet() {
        let (mut service, store) = setup();
        assert!(service.load(&store, 0).unwrap().is_none());
        assert!(matches!(service.clean(&store, 0), Err(PetError::NoPet)));
        assert_eq!(service.buffs(&store, 0), PetBuffs::default());
    }

    #[test]
    fn test_load_catches_up_and_saves() {
        let (mut service, store) = setup();
        service.adopt(&store, "Blob", 0).unwrap();
        let pet = service.load(&store, 3 * HOUR).unwrap().unwrap();
        let stored: PetState = store.load(PET_STORAGE_KEY).unwrap();
        assert_eq!(stored, pet);
        assert_eq!(stored.last_update, 3 * HOUR);
    }

    #[test]
    fn test_adopt_refuses_second_living_pet() {
        let (mut service, store) = setup();
        service.adopt(&store, "Blob", 0).unwrap();
        assert!(matches!(
            service.adopt(&store, "Other", 10),
            Err(PetError::AlreadyAdopted)
        ));
    }

    #[test]
    fn test_adopt_after_death_keeps_coins() {
        let (mut service, store) = setup();
        let mut pet = hatched(&mut service, &store);
        pet.coins = 40;
        pet.hunger = 100.0;
        store.save(PET_STORAGE_KEY, &pet).unwrap();

        let dead = service.load(&store, 2 * HOUR + 1).unwrap().unwrap();
        assert_eq!(dead.stage, PetStage::Dead);

        let fresh = service.adopt(&store, "Blob II", 3 * HOUR).unwrap();
        assert_eq!(fresh.stage, PetStage::Egg);
        assert_eq!(fresh.coins, 40);
    }

    #[test]
    fn test_buy_then_feed_consumes_inventory() {
        let (mut service, store) = setup();
        hatched(&mut service, &store);
        service.award_coins(&store, 12, 2 * HOUR).unwrap();

        let pet = service.buy(&store, "apple", 2 * HOUR).unwrap();
        assert_eq!(pet.coins, 7);
        assert_eq!(pet.inventory.food.get("apple"), Some(&1));

        let pet = service.feed(&store, "apple", 2 * HOUR).unwrap();
        assert!(pet.inventory.food.get("apple").is_none());
        assert_eq!(pet.counters.times_fed, 1);

        assert!(matches!(
            service.feed(&store, "apple", 2 * HOUR),
            Err(PetError::OutOfStock(_))
        ));
    }

    #[test]
    fn test_double_buy_cannot_overspend() {
        let (mut service, store) = setup();
        hatched(&mut service, &store);
        service.award_coins(&store, 5, 2 * HOUR).unwrap();

        service.buy(&store, "apple", 2 * HOUR).unwrap();
        let second = service.buy(&store, "apple", 2 * HOUR);
        assert!(matches!(
            second,
            Err(PetError::InsufficientCoins { needed: 5, have: 0 })
        ));
        let stored: PetState = store.load(PET_STORAGE_KEY).unwrap();
        assert_eq!(stored.coins, 0);
        assert_eq!(stored.inventory.food.get("apple"), Some(&1));
    }

    #[test]
    fn test_toy_uses() {
        let (mut service, store) = setup();
        hatched(&mut service, &store);
        service.award_coins(&store, 8, 2 * HOUR).unwrap();
        service.buy(&store, "ball", 2 * HOUR).unwrap();
        for _ in 0..3 {
            service.play(&store, Some("ball"), 2 * HOUR).unwrap();
        }
        assert!(matches!(
            service.play(&store, Some("ball"), 2 * HOUR),
            Err(PetError::OutOfStock(_))
        ));
        // Bare-handed play always works
        let pet = service.play(&store, None, 2 * HOUR).unwrap();
        assert_eq!(pet.counters.times_played, 4);
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let (mut service, store) = setup();
        hatched(&mut service, &store);
        assert!(matches!(
            service.feed(&store, "ball", 2 * HOUR),
            Err(PetError::WrongItemKind(..))
        ));
        assert!(matches!(
            service.buy(&store, "sushi", 2 * HOUR),
            Err(PetError::UnknownItem(_))
        ));
    }

    #[test]
    fn test_egg_cannot_be_cared_for() {
        let (mut service, store) = setup();
        service.adopt(&store, "Blob", 0).unwrap();
        assert!(matches!(
            service.clean(&store, 10),
            Err(PetError::CannotCare(PetStage::Egg))
        ));
    }

    #[test]
    fn test_failed_save_surfaces_error() {
        let (mut service, store) = setup();
        hatched(&mut service, &store);
        store.backend().set_reject_writes(true);
        assert!(matches!(
            service.clean(&store, 2 * HOUR),
            Err(PetError::Storage(_))
        ));
    }

    #[test]
    fn test_buffs_survive_failed_catch_up_save() {
        let (mut service, store) = setup();
        let mut pet = PetState::new("p", "Blob", 0);
        pet.stage = PetStage::Adult;
        store.save(PET_STORAGE_KEY, &pet).unwrap();
        store.backend().set_reject_writes(true);

        let buffs = service.buffs(&store, 0);
        assert_eq!(buffs, get_pet_buffs(&pet));
        assert!(buffs.starting_shield);
        assert!(buffs.score_multiplier > 1.0);
    }
}
