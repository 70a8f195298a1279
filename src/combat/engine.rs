//! One trial of the fight: boss strikes on a fixed cadence, healers cast on their own clocks,
//! and the loop jumps from event to event until the clock runs out or a tank dies.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, trace};

use crate::combat::config::FightConfig;
use crate::combat::entities::{Encounter, Healer, Tank};
use crate::combat::resolve::{apply_heal, resolve_heal, resolve_strike};
use crate::combat::scheduler::{EventKind, EventQueue};
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    #[default]
    Off,
    Events,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FightEventKind {
    StrikeMissed {
        tank: usize,
    },
    StrikeHit {
        tank: usize,
        damage: f64,
        health_after: f64,
    },
    TankDied {
        tank: usize,
        overkill: f64,
    },
    Heal {
        healer: usize,
        tank: usize,
        amount: f64,
        overheal: f64,
        crit: bool,
    },
    Healthstone {
        tank: usize,
        amount: f64,
        overheal: f64,
    },
    FightEnded {
        survived: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FightEvent {
    pub time: f64,
    #[serde(flatten)]
    pub kind: FightEventKind,
}

/// Collects the event log of a trial when tracing is on; a no-op otherwise.
#[derive(Debug, Clone, Default)]
pub struct TraceCollector {
    mode: TraceMode,
    events: Vec<FightEvent>,
}

impl TraceCollector {
    pub fn new(mode: TraceMode) -> Self {
        Self {
            mode,
            events: Vec::new(),
        }
    }

    pub fn off() -> Self {
        Self::new(TraceMode::Off)
    }

    pub fn is_enabled(&self) -> bool {
        self.mode == TraceMode::Events
    }

    pub fn record(&mut self, time: f64, kind: FightEventKind) {
        if self.is_enabled() {
            self.events.push(FightEvent { time, kind });
        }
    }

    pub fn events(&self) -> &[FightEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<FightEvent> {
        self.events
    }
}

pub fn serialize_events_json(events: &[FightEvent]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(events)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FightState {
    Running,
    TankDied(usize),
    TimeExpired,
}

/// Outcome and bookkeeping of a single trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialResult {
    pub survived: bool,
    pub ended_at: f64,
    pub dead_tank: Option<usize>,
    /// Overhealing over raw healing. Zero when nothing was healed.
    pub overheal_fraction: f64,
    /// Per-tank share of damage taken. All zero when no damage landed.
    pub damage_share: Vec<f64>,
    /// Per-tank share of strikes received, misses included. All zero when nothing struck.
    pub hit_share: Vec<f64>,
    pub damage_taken: Vec<f64>,
    pub strikes_taken: Vec<u32>,
    pub total_damage: f64,
    pub strikes: u32,
    pub total_raw_healing: f64,
    pub total_overhealing: f64,
    pub casts: u32,
    pub crits: u32,
    pub mana_spent: f64,
    pub healthstones_used: u32,
    pub final_health: Vec<f64>,
}

fn fraction(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn shares(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    values.iter().map(|value| fraction(*value, total)).collect()
}

#[derive(Debug)]
struct Tally {
    damage_taken: Vec<f64>,
    strikes_taken: Vec<u32>,
    raw_healing: f64,
    overhealing: f64,
    casts: u32,
    crits: u32,
    mana_spent: f64,
    healthstones_used: u32,
}

impl Tally {
    fn new(tank_count: usize) -> Self {
        Self {
            damage_taken: vec![0.0; tank_count],
            strikes_taken: vec![0; tank_count],
            raw_healing: 0.0,
            overhealing: 0.0,
            casts: 0,
            crits: 0,
            mana_spent: 0.0,
            healthstones_used: 0,
        }
    }

    fn finish(self, state: FightState, ended_at: f64, tanks: &[Tank]) -> TrialResult {
        let strikes_f64: Vec<f64> = self.strikes_taken.iter().map(|n| f64::from(*n)).collect();
        let dead_tank = match state {
            FightState::TankDied(tank) => Some(tank),
            FightState::Running | FightState::TimeExpired => None,
        };
        TrialResult {
            survived: state == FightState::TimeExpired,
            ended_at,
            dead_tank,
            overheal_fraction: fraction(self.overhealing, self.raw_healing),
            damage_share: shares(&self.damage_taken),
            hit_share: shares(&strikes_f64),
            total_damage: self.damage_taken.iter().sum(),
            strikes: self.strikes_taken.iter().sum(),
            damage_taken: self.damage_taken,
            strikes_taken: self.strikes_taken,
            total_raw_healing: self.raw_healing,
            total_overhealing: self.overhealing,
            casts: self.casts,
            crits: self.crits,
            mana_spent: self.mana_spent,
            healthstones_used: self.healthstones_used,
            final_health: tanks.iter().map(|tank| tank.current_health).collect(),
        }
    }
}

/// Run one trial of `encounter`. Tanks are reset first, so the encounter can be reused.
pub fn simulate_trial<R: Rng + ?Sized>(
    encounter: &mut Encounter,
    rng: &mut R,
    collector: &mut TraceCollector,
) -> Result<TrialResult, EngineError> {
    let Encounter {
        config,
        tanks,
        healers,
    } = encounter;
    run_fight(config, tanks, healers, rng, collector)
}

fn run_fight<R: Rng + ?Sized>(
    config: &FightConfig,
    tanks: &mut [Tank],
    healers: &[Healer],
    rng: &mut R,
    collector: &mut TraceCollector,
) -> Result<TrialResult, EngineError> {
    for tank in tanks.iter_mut() {
        tank.reset();
    }

    let mut queue = EventQueue::with_capacity(healers.len() + 1);
    queue.push(0.0, EventKind::BossStrike);
    for (index, healer) in healers.iter().enumerate() {
        let start = config.quantize(rng.gen::<f64>() * healer.cast_time());
        trace!(healer = index, start, "first cast scheduled");
        queue.push(start, EventKind::HealerCast(index));
    }

    let mut tally = Tally::new(tanks.len());
    let mut state = FightState::Running;
    let mut now = 0.0;

    while state == FightState::Running {
        let event = queue.pop_earliest()?;
        if event.time >= config.fight_length {
            now = config.fight_length;
            state = FightState::TimeExpired;
            break;
        }
        now = event.time;
        trace!(time = now, sequence = event.sequence(), kind = ?event.kind, "event popped");

        match event.kind {
            EventKind::BossStrike => {
                let target = config
                    .strike_targeting
                    .select(tanks)
                    .ok_or(EngineError::NoStrikeTarget)?;
                let tank = &mut tanks[target];
                let outcome = resolve_strike(tank, config, rng);
                tally.damage_taken[target] += outcome.damage;
                tally.strikes_taken[target] += 1;
                trace!(
                    time = now,
                    tank = target,
                    damage = outcome.damage,
                    missed = outcome.missed,
                    "strike"
                );

                if outcome.missed {
                    collector.record(now, FightEventKind::StrikeMissed { tank: target });
                } else {
                    collector.record(
                        now,
                        FightEventKind::StrikeHit {
                            tank: target,
                            damage: outcome.damage,
                            health_after: tank.current_health,
                        },
                    );
                }

                if outcome.died {
                    collector.record(
                        now,
                        FightEventKind::TankDied {
                            tank: target,
                            overkill: -tank.current_health,
                        },
                    );
                    state = FightState::TankDied(target);
                    continue;
                }

                if tank.wants_healthstone(now, config) {
                    let applied = apply_heal(tank, config.healthstone.amount);
                    tank.mark_healthstone(now);
                    tally.healthstones_used += 1;
                    collector.record(
                        now,
                        FightEventKind::Healthstone {
                            tank: target,
                            amount: applied.raw,
                            overheal: applied.overheal,
                        },
                    );
                }

                queue.push(
                    config.schedule_after(now, config.strike_interval),
                    EventKind::BossStrike,
                );
            }
            EventKind::HealerCast(index) => {
                let healer = healers
                    .get(index)
                    .ok_or(EngineError::UnknownHealer(index))?;
                let heal = resolve_heal(healer, config, rng);
                let tank = tanks
                    .get_mut(heal.target)
                    .ok_or(EngineError::UnknownTank(heal.target))?;
                let applied = apply_heal(tank, heal.amount);

                tally.raw_healing += applied.raw;
                tally.overhealing += applied.overheal;
                tally.casts += 1;
                tally.mana_spent += healer.mana_cost(config);
                if heal.crit {
                    tally.crits += 1;
                }
                collector.record(
                    now,
                    FightEventKind::Heal {
                        healer: index,
                        tank: heal.target,
                        amount: applied.raw,
                        overheal: applied.overheal,
                        crit: heal.crit,
                    },
                );

                let reaction = rng.gen::<f64>() * config.reaction_time;
                queue.push(
                    config.schedule_after(now, heal.next_cast_time + reaction),
                    EventKind::HealerCast(index),
                );
            }
        }
    }

    let survived = state == FightState::TimeExpired;
    collector.record(now, FightEventKind::FightEnded { survived });
    debug!(survived, ended_at = now, pending = queue.len(), "trial finished");
    Ok(tally.finish(state, now, tanks))
}
