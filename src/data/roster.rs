//! Tank and healer rosters, loaded from YAML or JSON.
//!
//! ```yaml
//! fight:
//!   fight_length: 240
//! tanks:
//!   - { name: Doodoobear, max_health: 11000, dodge_chance: 0.25, mitigation: 0.75 }
//! healers:
//!   - { spell: h4, tank: 0, bonus_healing: 1160, class: priest }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::combat::entities::shortest_cast_time;
use crate::combat::{Encounter, FightConfig, Healer, Tank};
use crate::data::spells::{find_spell, spells_for, HealerClass};
use crate::error::{ConfigurationError, Error};

pub const DEFAULT_ROSTER_PATH: &str = "data/roster.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankDef {
    pub name: String,
    pub max_health: f64,
    pub dodge_chance: f64,
    pub mitigation: f64,
    #[serde(default)]
    pub healthstone: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealerDef {
    pub spell: String,
    /// Index into the roster's tank list.
    pub tank: usize,
    #[serde(default)]
    pub bonus_healing: f64,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub fight: FightConfig,
    pub tanks: Vec<TankDef>,
    #[serde(default)]
    pub healers: Vec<HealerDef>,
}

impl Default for Roster {
    /// Three off-tanks and ten priests: four casting Heal rank 4 on the bear, then Heal rank 2
    /// split four on the second tank and two on the third.
    fn default() -> Self {
        let tank = |name: &str, max_health: f64, dodge_chance: f64, mitigation: f64| TankDef {
            name: name.to_string(),
            max_health,
            dodge_chance,
            mitigation,
            healthstone: false,
        };
        let healers = (0..10)
            .map(|slot| HealerDef {
                spell: if slot < 4 { "h4" } else { "h2" }.to_string(),
                tank: match slot {
                    0..=3 => 0,
                    4..=7 => 1,
                    _ => 2,
                },
                bonus_healing: 1060.0,
                class: "priest".to_string(),
            })
            .collect();
        Self {
            fight: FightConfig::default(),
            tanks: vec![
                tank("Bearly", 11_000.0, 0.25, 0.75),
                tank("Zug Zug", 9498.0, 0.35, 0.7),
                tank("CTS", 9499.0, 0.35, 0.7),
            ],
            healers,
        }
    }
}

impl Roster {
    /// Every problem with the roster, in roster order. Empty when the roster is usable.
    pub fn issues(&self) -> Vec<ConfigurationError> {
        let mut issues = Vec::new();
        if let Err(err) = self.fight.validate() {
            issues.push(err);
        }
        if self.tanks.is_empty() {
            issues.push(ConfigurationError::NoTanks);
        }
        for tank in &self.tanks {
            if !(tank.max_health.is_finite() && tank.max_health > 0.0) {
                issues.push(ConfigurationError::NonPositiveHealth {
                    name: tank.name.clone(),
                    max_health: tank.max_health,
                });
            }
            for (field, value) in [
                ("dodge_chance", tank.dodge_chance),
                ("mitigation", tank.mitigation),
            ] {
                if !(0.0..=1.0).contains(&value) {
                    issues.push(ConfigurationError::ProbabilityOutOfRange {
                        name: tank.name.clone(),
                        field,
                        value,
                    });
                }
            }
        }
        let mut healers = Vec::with_capacity(self.healers.len());
        for (index, def) in self.healers.iter().enumerate() {
            match self.build_healer(index, def) {
                Ok(healer) => healers.push(healer),
                Err(err) => issues.push(err),
            }
        }
        if let Some(shortest) = shortest_cast_time(&healers) {
            if let Err(err) = self.fight.check_cast_time(shortest) {
                issues.push(err);
            }
        }
        issues
    }

    fn build_healer(&self, index: usize, def: &HealerDef) -> Result<Healer, ConfigurationError> {
        let class: HealerClass =
            def.class
                .parse()
                .map_err(|class| ConfigurationError::UnknownClass {
                    healer: index,
                    class,
                })?;
        let spell = find_spell(&def.spell, class).ok_or_else(|| ConfigurationError::UnknownSpell {
            healer: index,
            spell: def.spell.clone(),
            class: class.to_string(),
            known: spells_for(class)
                .map(|spell| spell.id)
                .collect::<Vec<_>>()
                .join(", "),
        })?;
        if def.tank >= self.tanks.len() {
            return Err(ConfigurationError::AssignmentOutOfRange {
                healer: index,
                tank: def.tank,
                tank_count: self.tanks.len(),
            });
        }
        if !(def.bonus_healing.is_finite() && def.bonus_healing >= 0.0) {
            return Err(ConfigurationError::InvalidBonusHealing {
                healer: index,
                value: def.bonus_healing,
            });
        }
        Ok(Healer::new(index, class, *spell, def.tank, def.bonus_healing))
    }

    /// Build the reusable encounter, failing on the first configuration problem.
    pub fn to_encounter(&self) -> Result<Encounter, ConfigurationError> {
        let tanks = self
            .tanks
            .iter()
            .enumerate()
            .map(|(index, def)| {
                Tank::new(
                    index,
                    def.name.clone(),
                    def.max_health,
                    def.dodge_chance,
                    def.mitigation,
                )
                .with_healthstone(def.healthstone)
            })
            .collect();
        let healers = self
            .healers
            .iter()
            .enumerate()
            .map(|(index, def)| self.build_healer(index, def))
            .collect::<Result<Vec<_>, _>>()?;
        Encounter::new(self.fight.clone(), tanks, healers)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}

/// Load a roster file. `.json` files are parsed as JSON, everything else as YAML.
pub fn load_roster(path: impl AsRef<Path>) -> Result<Roster, Error> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let roster = if is_json(path) {
        serde_json::from_str(&raw)?
    } else {
        serde_yaml::from_str(&raw)?
    };
    Ok(roster)
}

/// Load `path` when given; otherwise [DEFAULT_ROSTER_PATH] if it exists, else the built-in roster.
pub fn load_roster_or_default(path: Option<&Path>) -> Result<Roster, Error> {
    if let Some(path) = path {
        return load_roster(path);
    }
    let default_path = Path::new(DEFAULT_ROSTER_PATH);
    if default_path.exists() {
        info!(path = DEFAULT_ROSTER_PATH, "using default roster file");
        return load_roster(default_path);
    }
    info!("no roster file found, using built-in roster");
    Ok(Roster::default())
}
