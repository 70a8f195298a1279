//! Reduction of many [TrialResult]s to the numbers a raid leader reads.
//!
//! Degenerate trials are excluded from the median they cannot inform: a trial with no raw
//! healing does not contribute to the overheal median, and a trial in which no damage (or no
//! strike) landed does not contribute to the damage (or hit) share medians. A median over no
//! trials is reported as zero.

use serde::Serialize;

use crate::combat::{Tank, TrialResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TankSummary {
    pub name: String,
    pub max_health: f64,
    pub median_damage_share: f64,
    pub median_hit_share: f64,
    /// Trials that ended with this tank dead.
    pub deaths: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialSummary {
    pub trials: usize,
    pub survived: usize,
    pub survival_rate: f64,
    pub median_overheal: f64,
    pub tanks: Vec<TankSummary>,
    pub mean_mana_spent: f64,
    pub mean_crits: f64,
    pub mean_healthstones: f64,
    /// Trials left out of the overheal median.
    pub trials_without_healing: usize,
    /// Trials left out of the damage share medians.
    pub trials_without_damage: usize,
    /// Trials left out of the hit share medians.
    pub trials_without_strikes: usize,
}

/// Median with the mean of the middle pair for even lengths. Sorts `values` in place.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

fn column_median<'a>(
    rows: impl Iterator<Item = &'a TrialResult>,
    column: impl Fn(&TrialResult) -> f64,
) -> f64 {
    let mut values: Vec<f64> = rows.map(column).collect();
    median(&mut values).unwrap_or(0.0)
}

pub fn summarize(tanks: &[Tank], results: &[TrialResult]) -> TrialSummary {
    let trials = results.len();
    let survived = results.iter().filter(|result| result.survived).count();

    let healed = || results.iter().filter(|result| result.total_raw_healing > 0.0);
    let damaged = || results.iter().filter(|result| result.total_damage > 0.0);
    let struck = || results.iter().filter(|result| result.strikes > 0);

    let tank_summaries = tanks
        .iter()
        .enumerate()
        .map(|(index, tank)| TankSummary {
            name: tank.name.clone(),
            max_health: tank.max_health,
            median_damage_share: column_median(damaged(), |result| {
                result.damage_share.get(index).copied().unwrap_or(0.0)
            }),
            median_hit_share: column_median(struck(), |result| {
                result.hit_share.get(index).copied().unwrap_or(0.0)
            }),
            deaths: results
                .iter()
                .filter(|result| result.dead_tank == Some(index))
                .count(),
        })
        .collect();

    TrialSummary {
        trials,
        survived,
        survival_rate: mean(survived as f64, trials),
        median_overheal: column_median(healed(), |result| result.overheal_fraction),
        tanks: tank_summaries,
        mean_mana_spent: mean(results.iter().map(|result| result.mana_spent).sum(), trials),
        mean_crits: mean(
            results.iter().map(|result| f64::from(result.crits)).sum(),
            trials,
        ),
        mean_healthstones: mean(
            results
                .iter()
                .map(|result| f64::from(result.healthstones_used))
                .sum(),
            trials,
        ),
        trials_without_healing: trials - healed().count(),
        trials_without_damage: trials - damaged().count(),
        trials_without_strikes: trials - struck().count(),
    }
}
