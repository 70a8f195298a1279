//! Who gets hit and who gets healed.

use serde::{Deserialize, Serialize};

use crate::combat::entities::{Healer, Tank};

/// Strike target policy. Ties always go to the lowest tank index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrikeTargeting {
    /// The tank with the most current health takes the hit.
    #[default]
    HighestHealth,
    /// The tank with the least current health takes the hit.
    LowestHealth,
}

impl StrikeTargeting {
    /// Returns `None` only when `tanks` is empty.
    pub fn select(self, tanks: &[Tank]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, tank) in tanks.iter().enumerate() {
            let better = match best {
                None => true,
                Some((_, health)) => match self {
                    Self::HighestHealth => tank.current_health > health,
                    Self::LowestHealth => tank.current_health < health,
                },
            };
            if better {
                best = Some((index, tank.current_health));
            }
        }
        best.map(|(index, _)| index)
    }
}

/// Heal target policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealTargeting {
    /// Always heal the tank bound at construction.
    Assigned(usize),
}

impl HealTargeting {
    pub fn select(self) -> usize {
        match self {
            Self::Assigned(tank) => tank,
        }
    }
}

pub fn select_strike_target(tanks: &[Tank]) -> Option<usize> {
    StrikeTargeting::HighestHealth.select(tanks)
}

pub fn select_heal_target(healer: &Healer) -> usize {
    healer.targeting.select()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tanks(health: &[f64]) -> Vec<Tank> {
        health
            .iter()
            .enumerate()
            .map(|(index, hp)| {
                let mut tank = Tank::new(index, format!("T{index}"), 11_000.0, 0.0, 0.0);
                tank.current_health = *hp;
                tank
            })
            .collect()
    }

    #[test]
    fn highest_health_wins() {
        assert_eq!(select_strike_target(&tanks(&[8000.0, 9500.0, 9400.0])), Some(1));
    }

    #[test]
    fn exact_tie_goes_to_lowest_index() {
        assert_eq!(select_strike_target(&tanks(&[9000.0, 9000.0])), Some(0));
        assert_eq!(
            select_strike_target(&tanks(&[100.0, 9000.0, 9000.0])),
            Some(1)
        );
    }

    #[test]
    fn lowest_health_policy_mirrors_tie_rule() {
        let list = tanks(&[7000.0, 5000.0, 5000.0]);
        assert_eq!(StrikeTargeting::LowestHealth.select(&list), Some(1));
    }

    #[test]
    fn negative_health_is_still_comparable() {
        assert_eq!(select_strike_target(&tanks(&[-10.0, -5.0])), Some(1));
    }

    #[test]
    fn empty_roster_has_no_target() {
        assert_eq!(select_strike_target(&[]), None);
    }
}
