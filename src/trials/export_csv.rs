//! Per-trial CSV export for offline analysis.
//!
//! One row per trial: outcome columns, then `damage_share_<tank>` and `hit_share_<tank>`
//! for each tank in roster order.

use std::io;
use std::path::Path;

use crate::combat::TrialResult;
use crate::error::Error;

const FIXED_COLUMNS: [&str; 11] = [
    "trial",
    "survived",
    "ended_at",
    "dead_tank",
    "overheal_fraction",
    "total_damage",
    "strikes",
    "total_raw_healing",
    "casts",
    "crits",
    "mana_spent",
];

fn column_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

pub fn header(tank_names: &[String]) -> Vec<String> {
    let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    for name in tank_names {
        columns.push(format!("damage_share_{}", column_key(name)));
    }
    for name in tank_names {
        columns.push(format!("hit_share_{}", column_key(name)));
    }
    columns
}

fn row(index: usize, result: &TrialResult) -> Vec<String> {
    let mut cells = vec![
        index.to_string(),
        result.survived.to_string(),
        format!("{:.1}", result.ended_at),
        result
            .dead_tank
            .map(|tank| tank.to_string())
            .unwrap_or_default(),
        format!("{:.6}", result.overheal_fraction),
        format!("{:.0}", result.total_damage),
        result.strikes.to_string(),
        format!("{:.1}", result.total_raw_healing),
        result.casts.to_string(),
        result.crits.to_string(),
        format!("{:.1}", result.mana_spent),
    ];
    cells.extend(result.damage_share.iter().map(|share| format!("{share:.6}")));
    cells.extend(result.hit_share.iter().map(|share| format!("{share:.6}")));
    cells
}

pub fn write_trials<W: io::Write>(
    writer: W,
    tank_names: &[String],
    results: &[TrialResult],
) -> Result<(), Error> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(header(tank_names))?;
    for (index, result) in results.iter().enumerate() {
        csv.write_record(row(index, result))?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_trials_csv(
    path: impl AsRef<Path>,
    tank_names: &[String],
    results: &[TrialResult],
) -> Result<(), Error> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    write_trials(file, tank_names, results)
}
