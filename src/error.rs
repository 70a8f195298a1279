use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// An invalid roster or fight configuration. Raised before any trial runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("roster has no tanks")]
    NoTanks,
    #[error("tank '{name}' has non-positive max health {max_health}")]
    NonPositiveHealth { name: String, max_health: f64 },
    #[error("tank '{name}': {field} {value} is outside [0, 1]")]
    ProbabilityOutOfRange {
        name: String,
        field: &'static str,
        value: f64,
    },
    #[error("healer {healer} is assigned to tank {tank}, but only {tank_count} tank(s) are configured")]
    AssignmentOutOfRange {
        healer: usize,
        tank: usize,
        tank_count: usize,
    },
    #[error("healer {healer}: unknown class '{class}'")]
    UnknownClass { healer: usize, class: String },
    #[error("healer {healer}: spell '{spell}' is not available to class '{class}' (known: {known})")]
    UnknownSpell {
        healer: usize,
        spell: String,
        class: String,
        known: String,
    },
    #[error("healer {healer} has invalid bonus healing {value}")]
    InvalidBonusHealing { healer: usize, value: f64 },
    #[error("fight config: {field} {value} {reason}")]
    InvalidFight {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// An engine invariant was violated. These indicate a bug, not a fight outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("event queue drained before the fight reached a terminal state")]
    EmptyQueue,
    #[error("no tank available to receive a strike")]
    NoStrikeTarget,
    #[error("event references unknown healer {0}")]
    UnknownHealer(usize),
    #[error("heal targets unknown tank {0}")]
    UnknownTank(usize),
}

/// Errors surfaced to the command line: I/O around the engine plus the engine's own errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse roster YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse roster JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigurationError),
    #[error("simulation failed: {0}")]
    Engine(#[from] EngineError),
    #[error("failed to initialise logging: {0}")]
    Telemetry(String),
}
