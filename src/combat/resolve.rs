//! Stochastic resolution of single strikes and heals.
//!
//! Resolvers draw from the injected generator in a fixed order so a seeded run replays exactly:
//! a strike draws the dodge roll, then (on a hit) the damage roll; a heal draws the crit roll.

use rand::Rng;
use serde::Serialize;

use crate::combat::config::FightConfig;
use crate::combat::entities::{Healer, Tank};
use crate::combat::targeting::select_heal_target;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrikeOutcome {
    /// Damage after mitigation and rounding. Zero on a miss.
    pub damage: f64,
    pub missed: bool,
    pub died: bool,
}

/// Resolve one strike against `tank`, mutating its health on a hit.
pub fn resolve_strike<R: Rng + ?Sized>(
    tank: &mut Tank,
    config: &FightConfig,
    rng: &mut R,
) -> StrikeOutcome {
    if rng.gen::<f64>() < tank.dodge_chance {
        return StrikeOutcome {
            damage: 0.0,
            missed: true,
            died: false,
        };
    }

    let raw = config.strike_damage(rng.gen::<f64>());
    let damage = (raw * (1.0 - tank.mitigation)).round();
    tank.current_health -= damage;
    StrikeOutcome {
        damage,
        missed: false,
        died: tank.is_dead(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealOutcome {
    pub amount: f64,
    /// Cast time of the healer's next spell, before reaction delay.
    pub next_cast_time: f64,
    pub target: usize,
    pub crit: bool,
}

/// Compute the amount of one heal. Does not touch any tank; see [apply_heal].
pub fn resolve_heal<R: Rng + ?Sized>(
    healer: &Healer,
    config: &FightConfig,
    rng: &mut R,
) -> HealOutcome {
    let mut amount = healer.base_heal(config);
    let mut next_cast_time = healer.cast_time();
    let crit = rng.gen::<f64>() < healer.crit_chance(config);
    if crit {
        amount *= config.crit_multiplier;
        if let Some(reduction) = healer.class.grace_reduction() {
            next_cast_time = (next_cast_time - reduction).max(0.0);
        }
    }
    HealOutcome {
        amount,
        next_cast_time,
        target: select_heal_target(healer),
        crit,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HealApplication {
    /// The full heal, including the wasted part.
    pub raw: f64,
    pub overheal: f64,
}

impl HealApplication {
    pub fn effective(&self) -> f64 {
        self.raw - self.overheal
    }
}

/// Add `amount` to the tank, clamping at max health and reporting the excess as overheal.
pub fn apply_heal(tank: &mut Tank, amount: f64) -> HealApplication {
    tank.current_health += amount;
    let mut overheal = 0.0;
    if tank.current_health > tank.max_health {
        overheal = tank.current_health - tank.max_health;
        tank.current_health = tank.max_health;
    }
    HealApplication {
        raw: amount,
        overheal,
    }
}
