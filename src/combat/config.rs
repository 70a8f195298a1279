//! Fight rules passed explicitly into the loop and resolvers.
//!
//! Every field has a default matching the Patchwerk reference encounter, so a roster file only
//! needs a `fight:` section for the values it wants to change.

use serde::{Deserialize, Serialize};

use crate::combat::targeting::StrikeTargeting;
use crate::error::ConfigurationError;

pub const DEFAULT_FIGHT_LENGTH: f64 = 60.0 * 4.0;
pub const DEFAULT_STRIKE_INTERVAL: f64 = 1.2;
pub const DEFAULT_STRIKE_DAMAGE_MIN: f64 = 22_000.0;
pub const DEFAULT_STRIKE_DAMAGE_MAX: f64 = 29_000.0;
pub const DEFAULT_REACTION_TIME: f64 = 0.2;
pub const DEFAULT_CRIT_CHANCE: f64 = 0.13;
pub const DEFAULT_CRIT_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_TIME_QUANTUM: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FightConfig {
    /// Seconds until the boss is considered defeated.
    pub fight_length: f64,
    /// Fixed cadence between strikes.
    pub strike_interval: f64,
    pub strike_damage_min: f64,
    pub strike_damage_max: f64,
    /// Upper bound of the uniform delay added after every cast.
    pub reaction_time: f64,
    pub base_crit_chance: f64,
    pub crit_multiplier: f64,
    /// Scheduled times are rounded to this resolution. Zero keeps full precision.
    pub time_quantum: f64,
    pub strike_targeting: StrikeTargeting,
    pub buffs: RaidBuffs,
    pub talents: HolyTalents,
    pub healthstone: HealthstoneConfig,
}

impl Default for FightConfig {
    fn default() -> Self {
        Self {
            fight_length: DEFAULT_FIGHT_LENGTH,
            strike_interval: DEFAULT_STRIKE_INTERVAL,
            strike_damage_min: DEFAULT_STRIKE_DAMAGE_MIN,
            strike_damage_max: DEFAULT_STRIKE_DAMAGE_MAX,
            reaction_time: DEFAULT_REACTION_TIME,
            base_crit_chance: DEFAULT_CRIT_CHANCE,
            crit_multiplier: DEFAULT_CRIT_MULTIPLIER,
            time_quantum: DEFAULT_TIME_QUANTUM,
            strike_targeting: StrikeTargeting::default(),
            buffs: RaidBuffs::default(),
            talents: HolyTalents::default(),
            healthstone: HealthstoneConfig::default(),
        }
    }
}

/// Raid-wide healing buffs. All of them add flat bonus healing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaidBuffs {
    pub amplify_magic: bool,
    pub magic_attunement: bool,
    /// Spirit used by spiritual guidance.
    pub spirit: f64,
}

impl Default for RaidBuffs {
    fn default() -> Self {
        Self {
            amplify_magic: true,
            magic_attunement: true,
            spirit: 350.0,
        }
    }
}

impl RaidBuffs {
    pub const AMPLIFY_MAGIC_BONUS: f64 = 150.0;
    pub const MAGIC_ATTUNEMENT_BONUS: f64 = 75.0;

    pub fn bonus_healing(&self) -> f64 {
        let mut bonus = 0.0;
        if self.amplify_magic {
            bonus += Self::AMPLIFY_MAGIC_BONUS;
        }
        if self.magic_attunement {
            bonus += Self::MAGIC_ATTUNEMENT_BONUS;
        }
        bonus
    }
}

/// Priest holy talent points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolyTalents {
    /// 0..=3, each point is 5% less mana per heal.
    pub improved_healing: u8,
    /// 0..=5, up to +10% base healing.
    pub spiritual_healing: u8,
    /// 0..=5, up to 25% of spirit as bonus healing.
    pub spiritual_guidance: u8,
}

impl Default for HolyTalents {
    fn default() -> Self {
        Self {
            improved_healing: 3,
            spiritual_healing: 5,
            spiritual_guidance: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthstoneConfig {
    pub amount: f64,
    /// Used once health falls to this fraction of max health or below.
    pub threshold: f64,
    pub cooldown: f64,
}

impl Default for HealthstoneConfig {
    fn default() -> Self {
        Self {
            amount: 1440.0,
            threshold: 0.2,
            cooldown: 120.0,
        }
    }
}

fn invalid(field: &'static str, value: f64, reason: &'static str) -> ConfigurationError {
    ConfigurationError::InvalidFight {
        field,
        value,
        reason,
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, value, "must be within [0, 1]"))
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be a finite non-negative number"))
    }
}

impl FightConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check_non_negative("fight_length", self.fight_length)?;
        if !(self.strike_interval.is_finite() && self.strike_interval > 0.0) {
            return Err(invalid(
                "strike_interval",
                self.strike_interval,
                "must be positive",
            ));
        }
        check_non_negative("strike_damage_min", self.strike_damage_min)?;
        check_non_negative("strike_damage_max", self.strike_damage_max)?;
        if self.strike_damage_max < self.strike_damage_min {
            return Err(invalid(
                "strike_damage_max",
                self.strike_damage_max,
                "must not be below strike_damage_min",
            ));
        }
        check_non_negative("reaction_time", self.reaction_time)?;
        check_probability("base_crit_chance", self.base_crit_chance)?;
        if !(self.crit_multiplier.is_finite() && self.crit_multiplier >= 1.0) {
            return Err(invalid(
                "crit_multiplier",
                self.crit_multiplier,
                "must be at least 1",
            ));
        }
        check_non_negative("time_quantum", self.time_quantum)?;
        if self.time_quantum > 0.0 {
            if !self.time_quantum.recip().is_finite() {
                return Err(invalid(
                    "time_quantum",
                    self.time_quantum,
                    "is too small to round to",
                ));
            }
            if self.time_quantum * 2.0 >= self.strike_interval {
                return Err(invalid(
                    "time_quantum",
                    self.time_quantum,
                    "must be below half of strike_interval",
                ));
            }
        }
        check_non_negative("buffs.spirit", self.buffs.spirit)?;
        if self.talents.improved_healing > 3 {
            return Err(invalid(
                "talents.improved_healing",
                f64::from(self.talents.improved_healing),
                "has at most 3 points",
            ));
        }
        if self.talents.spiritual_healing > 5 {
            return Err(invalid(
                "talents.spiritual_healing",
                f64::from(self.talents.spiritual_healing),
                "has at most 5 points",
            ));
        }
        if self.talents.spiritual_guidance > 5 {
            return Err(invalid(
                "talents.spiritual_guidance",
                f64::from(self.talents.spiritual_guidance),
                "has at most 5 points",
            ));
        }
        check_non_negative("healthstone.amount", self.healthstone.amount)?;
        check_probability("healthstone.threshold", self.healthstone.threshold)?;
        check_non_negative("healthstone.cooldown", self.healthstone.cooldown)?;
        Ok(())
    }

    /// Rejects a quantum that could round a healer's shortest cast back onto the current instant.
    pub fn check_cast_time(&self, cast_time: f64) -> Result<(), ConfigurationError> {
        if self.time_quantum > 0.0 && self.time_quantum * 2.0 > cast_time {
            return Err(invalid(
                "time_quantum",
                self.time_quantum,
                "must be at most half of the shortest cast time",
            ));
        }
        Ok(())
    }

    /// Time of an event `delay` seconds after `now`, quantized. Always later than `now` when a
    /// quantum is set.
    pub fn schedule_after(&self, now: f64, delay: f64) -> f64 {
        let time = self.quantize(now + delay);
        if self.time_quantum > 0.0 {
            time.max(now + self.time_quantum)
        } else {
            time
        }
    }

    /// Round a scheduled time to [FightConfig::time_quantum].
    pub fn quantize(&self, time: f64) -> f64 {
        if self.time_quantum > 0.0 {
            let scale = 1.0 / self.time_quantum;
            (time * scale).round() / scale
        } else {
            time
        }
    }

    /// Raw strike damage for a uniform `sample` in `[0, 1)`.
    pub fn strike_damage(&self, sample: f64) -> f64 {
        self.strike_damage_min + sample * (self.strike_damage_max - self.strike_damage_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(FightConfig::default().validate().is_ok());
    }

    #[test]
    fn quantize_rounds_to_tenths() {
        let config = FightConfig::default();
        assert_eq!(config.quantize(1.2000000000000002), 1.2);
        assert_eq!(config.quantize(2.46), 2.5);
        assert_eq!(config.quantize(0.04), 0.0);
    }

    #[test]
    fn zero_quantum_keeps_precision() {
        let config = FightConfig {
            time_quantum: 0.0,
            ..FightConfig::default()
        };
        assert_eq!(config.quantize(1.23456), 1.23456);
    }

    #[test]
    fn inverted_damage_range_is_rejected() {
        let config = FightConfig {
            strike_damage_min: 30_000.0,
            ..FightConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidFight {
                field: "strike_damage_max",
                ..
            })
        ));
    }

    #[test]
    fn zero_strike_interval_is_rejected() {
        let config = FightConfig {
            strike_interval: 0.0,
            ..FightConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn coarse_or_degenerate_quantum_is_rejected() {
        for quantum in [6.0, 0.6, 1e-310] {
            let config = FightConfig {
                time_quantum: quantum,
                ..FightConfig::default()
            };
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigurationError::InvalidFight {
                        field: "time_quantum",
                        ..
                    })
                ),
                "quantum {quantum} should be rejected"
            );
        }
    }

    #[test]
    fn quantum_must_fit_twice_in_a_cast() {
        let config = FightConfig {
            strike_interval: 10.0,
            time_quantum: 1.5,
            ..FightConfig::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.check_cast_time(2.5).is_err());
        assert!(config.check_cast_time(3.0).is_ok());
        assert!(FightConfig::default().check_cast_time(1.5).is_ok());
    }

    #[test]
    fn scheduled_time_always_advances() {
        let config = FightConfig {
            time_quantum: 6.0,
            ..FightConfig::default()
        };
        assert_eq!(config.quantize(1.2), 0.0);
        assert_eq!(config.schedule_after(0.0, 1.2), 6.0);
        assert_eq!(FightConfig::default().schedule_after(1.2, 1.2), 2.4);
        let exact = FightConfig {
            time_quantum: 0.0,
            ..FightConfig::default()
        };
        assert_eq!(exact.schedule_after(1.0, 0.25), 1.25);
    }

    #[test]
    fn raid_buffs_stack_flat_bonus() {
        assert_eq!(RaidBuffs::default().bonus_healing(), 225.0);
        let none = RaidBuffs {
            amplify_magic: false,
            magic_attunement: false,
            spirit: 0.0,
        };
        assert_eq!(none.bonus_healing(), 0.0);
    }

    #[test]
    fn partial_yaml_section_keeps_defaults() {
        let config: FightConfig =
            serde_yaml::from_str("fight_length: 60\nstrike_targeting: lowest_health\n")
                .expect("fight section should parse");
        assert_eq!(config.fight_length, 60.0);
        assert_eq!(config.strike_targeting, StrikeTargeting::LowestHealth);
        assert_eq!(config.strike_interval, DEFAULT_STRIKE_INTERVAL);
        assert_eq!(config.talents, HolyTalents::default());
    }
}
