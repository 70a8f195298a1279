pub mod config;
pub mod engine;
pub mod entities;
pub mod resolve;
pub mod rng;
pub mod scheduler;
pub mod targeting;

pub use config::{FightConfig, HealthstoneConfig, HolyTalents, RaidBuffs};
pub use engine::{
    serialize_events_json, simulate_trial, FightEvent, FightEventKind, FightState, TraceCollector,
    TraceMode, TrialResult,
};
pub use entities::{Encounter, Healer, Tank};
pub use resolve::{
    apply_heal, resolve_heal, resolve_strike, HealApplication, HealOutcome, StrikeOutcome,
};
pub use rng::SimRng;
pub use scheduler::{EventKind, EventQueue, ScheduledEvent};
pub use targeting::{select_heal_target, select_strike_target, HealTargeting, StrikeTargeting};
