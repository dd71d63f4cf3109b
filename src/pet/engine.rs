//! Pet growth engine
//!
//! Pure state transitions. Every function takes the pet by reference and
//! returns the next pet; randomness is injected so callers control the seed.
//! Nothing in here touches storage or the clock.

use rand::Rng;

use super::PetBuffs;
use super::balancing::Balancing;
use super::state::{PetStage, PetState, Sickness};

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Stage multiplier tier before happiness scaling
fn stage_tier(stage: PetStage) -> Option<f32> {
    match stage {
        PetStage::Slime => Some(1.0),
        PetStage::Teen => Some(1.2),
        PetStage::Adult => Some(1.5),
        PetStage::Egg | PetStage::Dead => None,
    }
}

fn clamp_stat(v: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, 100.0) } else { 0.0 }
}

/// Advance a pet to `now` (unix ms)
pub fn update_pet_state<R: Rng>(
    pet: &PetState,
    now: i64,
    balancing: &Balancing,
    rng: &mut R,
) -> PetState {
    let mut next = pet.clone();
    if pet.stage == PetStage::Dead {
        next.last_update = now.max(pet.last_update);
        return next;
    }

    let elapsed_ms = (now - pet.last_update).max(0);
    let hours = elapsed_ms as f64 / MS_PER_HOUR;
    next.last_update = now.max(pet.last_update);
    next.age_hours += hours;
    next.stage_age_hours += hours;

    if pet.stage != PetStage::Egg {
        let rates = balancing.rates(pet.stage);
        let h = hours as f32;
        next.hunger = clamp_stat(next.hunger + rates.hunger * h);
        next.boredom = clamp_stat(next.boredom + rates.boredom * h);

        // One Bernoulli trial per elapsed whole hour; partial hours carry over
        next.poop_clock_hours += hours;
        let whole_hours = next.poop_clock_hours.floor();
        next.poop_clock_hours -= whole_hours;
        let chance = balancing.poop_chance(pet.stage).clamp(0.0, 1.0);
        for _ in 0..whole_hours as u64 {
            if next.poop_count >= balancing.max_poop {
                break;
            }
            if rng.random_bool(chance) {
                next.poop_count += 1;
            }
        }

        let poop_dirt = next.poop_count as f32 * balancing.dirt_per_poop * h;
        next.dirt = clamp_stat(next.dirt + rates.dirt * h + poop_dirt);

        let starving = next.hunger >= balancing.starvation_threshold;
        if starving || next.sickness(balancing) == Sickness::Berserk {
            log::info!(
                "Pet {} died ({})",
                next.name,
                if starving { "starvation" } else { "berserk" }
            );
            next.stage = PetStage::Dead;
            next.hp = 0.0;
            next.died_at = Some(now);
            return next;
        }
    }

    let evolved = balancing
        .stage_duration(next.stage)
        .filter(|&duration| next.stage_age_hours > duration)
        .and(next.stage.next());
    if let Some(evolved) = evolved {
        log::info!(
            "Pet {} evolved {} -> {}",
            next.name,
            next.stage.as_str(),
            evolved.as_str()
        );
        next.stage = evolved;
        next.stage_age_hours = 0.0;
    }

    next
}

/// Lower hunger by `power`
pub fn feed_pet(pet: &PetState, power: f32) -> PetState {
    if !pet.stage.accepts_care() {
        return pet.clone();
    }
    let mut next = pet.clone();
    next.hunger = clamp_stat(next.hunger - power.max(0.0));
    next.counters.times_fed += 1;
    next
}

/// Remove one poop and lower dirt by `power`
pub fn clean_poop(pet: &PetState, power: f32) -> PetState {
    if !pet.stage.accepts_care() || pet.poop_count == 0 {
        return pet.clone();
    }
    let mut next = pet.clone();
    next.dirt = clamp_stat(next.dirt - power.max(0.0));
    next.poop_count -= 1;
    next.counters.poops_cleaned += 1;
    next
}

/// Lower boredom by `power`
pub fn play_with_pet(pet: &PetState, power: f32) -> PetState {
    if !pet.stage.accepts_care() {
        return pet.clone();
    }
    let mut next = pet.clone();
    next.boredom = clamp_stat(next.boredom - power.max(0.0));
    next.counters.times_played += 1;
    next
}

/// Gameplay modifiers granted by the pet for the next run
pub fn get_pet_buffs(pet: &PetState) -> PetBuffs {
    let Some(tier) = stage_tier(pet.stage) else {
        return PetBuffs::default();
    };
    let happiness = pet.happiness();
    let adult = pet.stage == PetStage::Adult;
    PetBuffs {
        score_multiplier: tier * happiness / 100.0,
        starting_shield: adult && happiness > 80.0,
        extra_lives: u8::from(adult && happiness > 90.0),
    }
}

/// Something the owner should take care of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetAlert {
    Hungry,
    Dirty,
    Bored,
    Poop(u32),
    Sick,
    Berserk,
    Dead,
}

/// Notification list for the pet screen. Uses `alert_threshold`, which is
/// intentionally independent of the sickness thresholds.
pub fn pet_alerts(pet: &PetState, balancing: &Balancing) -> Vec<PetAlert> {
    match pet.stage {
        PetStage::Dead => return vec![PetAlert::Dead],
        PetStage::Egg => return Vec::new(),
        _ => {}
    }

    let threshold = balancing.alert_threshold;
    let mut alerts = Vec::new();
    if pet.hunger >= threshold {
        alerts.push(PetAlert::Hungry);
    }
    if pet.dirt >= threshold {
        alerts.push(PetAlert::Dirty);
    }
    if pet.boredom >= threshold {
        alerts.push(PetAlert::Bored);
    }
    if pet.poop_count > 0 {
        alerts.push(PetAlert::Poop(pet.poop_count));
    }
    match pet.sickness(balancing) {
        Sickness::Sick => alerts.push(PetAlert::Sick),
        Sickness::Berserk => alerts.push(PetAlert::Berserk),
        Sickness::None => {}
    }
    alerts
}
