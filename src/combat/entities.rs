use std::fmt;

use crate::combat::config::FightConfig;
use crate::combat::targeting::HealTargeting;
use crate::data::spells::{HealerClass, SpellProfile};
use crate::error::ConfigurationError;

/// A damage-soaking target of the boss strike. Reused across trials; [Tank::reset] restores
/// full health at the start of each one.
#[derive(Debug, Clone, PartialEq)]
pub struct Tank {
    pub index: usize,
    pub name: String,
    pub max_health: f64,
    pub current_health: f64,
    pub dodge_chance: f64,
    pub mitigation: f64,
    pub uses_healthstone: bool,
    last_healthstone: Option<f64>,
}

impl Tank {
    pub fn new(
        index: usize,
        name: impl Into<String>,
        max_health: f64,
        dodge_chance: f64,
        mitigation: f64,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            max_health,
            current_health: max_health,
            dodge_chance,
            mitigation,
            uses_healthstone: false,
            last_healthstone: None,
        }
    }

    pub fn with_healthstone(mut self, uses_healthstone: bool) -> Self {
        self.uses_healthstone = uses_healthstone;
        self
    }

    pub fn reset(&mut self) {
        self.current_health = self.max_health;
        self.last_healthstone = None;
    }

    pub fn is_dead(&self) -> bool {
        self.current_health <= 0.0
    }

    pub fn health_fraction(&self) -> f64 {
        self.current_health / self.max_health
    }

    /// Whether a healthstone should be used right now.
    pub fn wants_healthstone(&self, now: f64, config: &FightConfig) -> bool {
        self.uses_healthstone
            && !self.is_dead()
            && self.health_fraction() <= config.healthstone.threshold
            && self
                .last_healthstone
                .map_or(true, |used_at| now - used_at >= config.healthstone.cooldown)
    }

    pub(crate) fn mark_healthstone(&mut self, now: f64) {
        self.last_healthstone = Some(now);
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.max_health.is_finite() && self.max_health > 0.0) {
            return Err(ConfigurationError::NonPositiveHealth {
                name: self.name.clone(),
                max_health: self.max_health,
            });
        }
        for (field, value) in [
            ("dodge_chance", self.dodge_chance),
            ("mitigation", self.mitigation),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::ProbabilityOutOfRange {
                    name: self.name.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Tank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} / {})",
            self.name, self.current_health, self.max_health
        )
    }
}

/// A healer casting one spell on one tank for the whole fight.
#[derive(Debug, Clone, PartialEq)]
pub struct Healer {
    pub index: usize,
    pub class: HealerClass,
    pub spell: SpellProfile,
    pub targeting: HealTargeting,
    pub bonus_healing: f64,
}

impl Healer {
    pub fn new(
        index: usize,
        class: HealerClass,
        spell: SpellProfile,
        tank: usize,
        bonus_healing: f64,
    ) -> Self {
        Self {
            index,
            class,
            spell,
            targeting: HealTargeting::Assigned(tank),
            bonus_healing,
        }
    }

    pub fn assigned_tank(&self) -> usize {
        self.targeting.select()
    }

    pub fn cast_time(&self) -> f64 {
        self.spell.cast_time
    }

    /// Cast time after every reduction a crit can grant.
    pub fn shortest_cast_time(&self) -> f64 {
        let reduction = self.class.grace_reduction().unwrap_or(0.0);
        (self.cast_time() - reduction).max(0.0)
    }

    pub fn crit_chance(&self, config: &FightConfig) -> f64 {
        (config.base_crit_chance + self.class.crit_bonus()).clamp(0.0, 1.0)
    }

    /// Bonus healing from gear, raid buffs and class stats.
    pub fn total_bonus_healing(&self, config: &FightConfig) -> f64 {
        self.bonus_healing + config.buffs.bonus_healing() + self.class.class_bonus_healing(config)
    }

    /// Non-critical heal amount. Deterministic for a given config.
    pub fn base_heal(&self, config: &FightConfig) -> f64 {
        self.spell.base_heal * self.class.heal_multiplier(config)
            + self.spell.coefficient * self.total_bonus_healing(config)
    }

    pub fn mana_cost(&self, config: &FightConfig) -> f64 {
        self.spell.mana_cost * self.class.mana_multiplier(config)
    }

    pub fn label(&self) -> String {
        format!("Healer #{} ({} {})", self.index + 1, self.class, self.spell.id)
    }
}

pub fn shortest_cast_time(healers: &[Healer]) -> Option<f64> {
    healers
        .iter()
        .map(Healer::shortest_cast_time)
        .min_by(f64::total_cmp)
}

/// Tanks, healers and the rules they fight under. Built once, then reused for every trial.
#[derive(Debug, Clone, PartialEq)]
pub struct Encounter {
    pub config: FightConfig,
    pub tanks: Vec<Tank>,
    pub healers: Vec<Healer>,
}

impl Encounter {
    /// Validates the fight rules, the tanks and every healer assignment. Indices are
    /// renumbered to match list positions.
    pub fn new(
        config: FightConfig,
        mut tanks: Vec<Tank>,
        mut healers: Vec<Healer>,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        if tanks.is_empty() {
            return Err(ConfigurationError::NoTanks);
        }
        for (index, tank) in tanks.iter_mut().enumerate() {
            tank.index = index;
            tank.validate()?;
            tank.reset();
        }
        for (index, healer) in healers.iter_mut().enumerate() {
            healer.index = index;
            let tank = healer.assigned_tank();
            if tank >= tanks.len() {
                return Err(ConfigurationError::AssignmentOutOfRange {
                    healer: index,
                    tank,
                    tank_count: tanks.len(),
                });
            }
            if !(healer.bonus_healing.is_finite() && healer.bonus_healing >= 0.0) {
                return Err(ConfigurationError::InvalidBonusHealing {
                    healer: index,
                    value: healer.bonus_healing,
                });
            }
        }
        if let Some(shortest) = shortest_cast_time(&healers) {
            config.check_cast_time(shortest)?;
        }
        Ok(Self {
            config,
            tanks,
            healers,
        })
    }

    pub fn tank_names(&self) -> Vec<String> {
        self.tanks.iter().map(|tank| tank.name.clone()).collect()
    }

    pub fn healers_on(&self, tank: usize) -> impl Iterator<Item = &Healer> {
        self.healers
            .iter()
            .filter(move |healer| healer.assigned_tank() == tank)
    }
}
