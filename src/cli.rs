use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::combat::{
    serialize_events_json, simulate_trial, Encounter, FightEvent, FightEventKind, SimRng,
    TraceCollector, TraceMode, TrialResult,
};
use crate::data::roster::{load_roster_or_default, DEFAULT_ROSTER_PATH};
use crate::error::Error;
use crate::parallel::WorkerPool;
use crate::telemetry;
use crate::trials::{run_trials_parallel, run_trials_seeded, write_trials_csv, TrialSummary};

#[derive(Parser, Debug)]
#[command(
    name = "hateful-strike",
    version,
    about = "Monte Carlo healing simulator for Patchwerk's Hateful Strike"
)]
pub struct Cli {
    /// Append logs to this file instead of stderr.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run many trials and report survival, overheal and damage distribution.
    Simulate {
        #[arg(long, default_value_t = 1000)]
        sims: usize,
        /// Roster file (.yaml/.yml or .json). Defaults to data/roster.yaml, then the built-in roster.
        #[arg(long)]
        roster: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        /// Spread trials across worker threads.
        #[arg(long)]
        parallel: bool,
        /// Worker threads for --parallel. Defaults to all cores.
        #[arg(long)]
        workers: Option<usize>,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
        /// Write one CSV row per trial to this path.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Run a single trial and print its event log.
    Trace {
        #[arg(long)]
        roster: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Check a roster file and list every problem found.
    Validate { path: Option<PathBuf> },
}

#[derive(Debug, Serialize)]
struct SimulationReport<'a> {
    seed: u64,
    #[serde(flatten)]
    summary: &'a TrialSummary,
}

pub fn run_with_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };

    if let Err(err) = telemetry::init_logging(cli.log_file.as_deref()) {
        eprintln!("{err}");
    }

    match cli.command {
        Command::Simulate {
            sims,
            roster,
            seed,
            parallel,
            workers,
            json,
            csv,
        } => handle_simulate(SimulateArgs {
            sims,
            roster,
            seed,
            parallel,
            workers,
            json,
            csv,
        }),
        Command::Trace { roster, seed, json } => handle_trace(roster.as_deref(), seed, json),
        Command::Validate { path } => handle_validate(path.as_deref()),
    }
}

/// Usage and configuration problems exit with 2, failures while running with 1.
fn exit_code(err: &Error) -> i32 {
    match err {
        Error::Read { .. } | Error::Yaml(_) | Error::Json(_) | Error::Config(_) => 2,
        Error::Write { .. } | Error::Csv(_) | Error::Engine(_) | Error::Telemetry(_) => 1,
    }
}

fn load_encounter(roster: Option<&Path>) -> Result<Encounter, Error> {
    let roster = load_roster_or_default(roster)?;
    Ok(roster.to_encounter()?)
}

fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        let seed = rand::random::<u64>();
        info!(seed, "no seed given, picked one at random");
        seed
    })
}

struct SimulateArgs {
    sims: usize,
    roster: Option<PathBuf>,
    seed: Option<u64>,
    parallel: bool,
    workers: Option<usize>,
    json: bool,
    csv: Option<PathBuf>,
}

fn handle_simulate(args: SimulateArgs) -> i32 {
    match simulate(&args) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("simulate failed: {err}");
            exit_code(&err)
        }
    }
}

fn simulate(args: &SimulateArgs) -> Result<(), Error> {
    let mut encounter = load_encounter(args.roster.as_deref())?;
    let seed = resolve_seed(args.seed);

    let run = if args.parallel {
        let pool = WorkerPool::with_workers(args.workers.unwrap_or(0));
        run_trials_parallel(&encounter, args.sims, seed, &pool)?
    } else {
        run_trials_seeded(&mut encounter, args.sims, seed)?
    };

    if let Some(path) = &args.csv {
        write_trials_csv(path, &encounter.tank_names(), &run.results)?;
        info!(path = %path.display(), rows = run.results.len(), "wrote trial csv");
    }

    if args.json {
        let report = SimulationReport {
            seed,
            summary: &run.summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_summary(&run.summary, seed));
    }
    Ok(())
}

fn percent(fraction: f64) -> f64 {
    fraction * 100.0
}

pub fn format_summary(summary: &TrialSummary, seed: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Trials: {} (seed {seed})", summary.trials);
    let _ = writeln!(
        out,
        "Number of times tanks survived: {} ({:.1}%)",
        summary.survived,
        percent(summary.survival_rate)
    );
    let _ = writeln!(
        out,
        "Overhealing percent: {:.2}%",
        percent(summary.median_overheal)
    );

    let _ = writeln!(out, "\nDAMAGE BREAKDOWN");
    for tank in &summary.tanks {
        let _ = writeln!(
            out,
            "{}: {:.1}%",
            tank.name,
            percent(tank.median_damage_share)
        );
    }

    let _ = writeln!(out, "\nHATEFUL STRIKE BREAKDOWN");
    for tank in &summary.tanks {
        let _ = writeln!(out, "{}: {:.1}%", tank.name, percent(tank.median_hit_share));
    }

    let _ = writeln!(out, "\nDEATHS");
    for tank in &summary.tanks {
        let _ = writeln!(out, "{}: {}", tank.name, tank.deaths);
    }

    let _ = writeln!(
        out,
        "\nMean per trial: {:.0} mana, {:.1} crits, {:.2} healthstones",
        summary.mean_mana_spent, summary.mean_crits, summary.mean_healthstones
    );
    out
}

fn handle_trace(roster: Option<&Path>, seed: Option<u64>, json: bool) -> i32 {
    match trace_one(roster, seed, json) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("trace failed: {err}");
            exit_code(&err)
        }
    }
}

fn trace_one(roster: Option<&Path>, seed: Option<u64>, json: bool) -> Result<(), Error> {
    let mut encounter = load_encounter(roster)?;
    let seed = resolve_seed(seed);
    let mut rng = SimRng::seed_from_u64(seed);
    let mut collector = TraceCollector::new(TraceMode::Events);
    let result = simulate_trial(&mut encounter, &mut rng, &mut collector)?;

    let events = collector.into_events();
    if json {
        println!("{}", serialize_events_json(&events)?);
    } else {
        print!("{}", format_trace(&encounter, &events, &result));
    }
    Ok(())
}

pub fn format_trace(encounter: &Encounter, events: &[FightEvent], result: &TrialResult) -> String {
    let tank_name = |index: usize| {
        encounter
            .tanks
            .get(index)
            .map_or("<unknown tank>", |tank| tank.name.as_str())
    };
    let mut out = String::new();
    for event in events {
        let line = match &event.kind {
            FightEventKind::StrikeMissed { tank } => {
                format!("Hateful Strike misses {}", tank_name(*tank))
            }
            FightEventKind::StrikeHit {
                tank,
                damage,
                health_after,
            } => format!(
                "Hateful Strike hits {} for {damage:.0} ({health_after:.0} hp left)",
                tank_name(*tank)
            ),
            FightEventKind::TankDied { tank, overkill } => {
                format!("{} has DIED! ({overkill:.0} overkill)", tank_name(*tank))
            }
            FightEventKind::Heal {
                healer,
                tank,
                amount,
                overheal,
                crit,
            } => {
                let label = encounter
                    .healers
                    .get(*healer)
                    .map_or_else(|| format!("Healer #{}", healer + 1), |h| h.label());
                let crit = if *crit { ", crit" } else { "" };
                format!(
                    "{label} heals {} for {amount:.0} ({overheal:.0} overheal{crit})",
                    tank_name(*tank)
                )
            }
            FightEventKind::Healthstone {
                tank,
                amount,
                overheal,
            } => format!(
                "{} uses a healthstone for {amount:.0} ({overheal:.0} overheal)",
                tank_name(*tank)
            ),
            FightEventKind::FightEnded { survived } => {
                if *survived {
                    "Fight over: every tank survived".to_string()
                } else {
                    "Fight over: a tank died".to_string()
                }
            }
        };
        let _ = writeln!(out, "{:>6.1}s  {line}", event.time);
    }
    let _ = writeln!(
        out,
        "\n{} strikes, {} heals ({} crits), {:.0} mana, overheal {:.2}%",
        result.strikes,
        result.casts,
        result.crits,
        result.mana_spent,
        percent(result.overheal_fraction)
    );
    out
}

pub fn format_assignments(encounter: &Encounter) -> String {
    let mut out = String::new();
    for tank in &encounter.tanks {
        let healers: Vec<String> = encounter
            .healers_on(tank.index)
            .map(|healer| format!("{} {}", healer.class, healer.spell.id))
            .collect();
        let _ = writeln!(
            out,
            "{} ({:.0} hp): {} healer(s) [{}]",
            tank.name,
            tank.max_health,
            healers.len(),
            healers.join(", ")
        );
    }
    out
}

fn handle_validate(path: Option<&Path>) -> i32 {
    let shown = path.map_or_else(
        || DEFAULT_ROSTER_PATH.to_string(),
        |path| path.display().to_string(),
    );
    let roster = match load_roster_or_default(path) {
        Ok(roster) => roster,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return exit_code(&err);
        }
    };

    let issues = roster.issues();
    if issues.is_empty() {
        println!(
            "validation passed: {shown} ({} tanks, {} healers)",
            roster.tanks.len(),
            roster.healers.len()
        );
        if let Ok(encounter) = roster.to_encounter() {
            print!("{}", format_assignments(&encounter));
        }
        0
    } else {
        eprintln!("validation failed: {} issue(s)", issues.len());
        for issue in issues {
            eprintln!("- {issue}");
        }
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Roster;

    #[test]
    fn parses_simulate_flags() {
        let cli = Cli::try_parse_from([
            "hateful-strike",
            "simulate",
            "--sims",
            "50",
            "--seed",
            "9",
            "--parallel",
            "--workers",
            "2",
            "--json",
        ])
        .expect("parses");
        assert_eq!(
            cli.command,
            Command::Simulate {
                sims: 50,
                roster: None,
                seed: Some(9),
                parallel: true,
                workers: Some(2),
                json: true,
                csv: None,
            }
        );
    }

    #[test]
    fn simulate_defaults_to_a_thousand_trials() {
        let cli = Cli::try_parse_from(["hateful-strike", "simulate"]).expect("parses");
        assert!(matches!(cli.command, Command::Simulate { sims: 1000, .. }));
    }

    #[test]
    fn unknown_subcommand_is_a_usage_error() {
        assert_eq!(run_with_args(["hateful-strike", "optimize"]), 2);
    }

    #[test]
    fn summary_lists_every_tank_in_each_section() {
        let mut encounter = Roster::default().to_encounter().expect("valid roster");
        let run = run_trials_seeded(&mut encounter, 10, 3).expect("trials run");
        let text = format_summary(&run.summary, 3);
        assert!(text.contains("DAMAGE BREAKDOWN"));
        assert!(text.contains("HATEFUL STRIKE BREAKDOWN"));
        assert_eq!(text.matches("Zug Zug:").count(), 3);
    }

    #[test]
    fn assignments_list_healers_per_tank() {
        let encounter = Roster::default().to_encounter().expect("valid roster");
        let text = format_assignments(&encounter);
        assert!(text.contains("Bearly (11000 hp): 4 healer(s) [priest h4, priest h4"));
        assert!(text.contains("CTS (9499 hp): 2 healer(s) [priest h2, priest h2]"));
    }

    #[test]
    fn trace_ends_with_the_fight_result() {
        let mut encounter = Roster::default().to_encounter().expect("valid roster");
        let mut rng = SimRng::seed_from_u64(5);
        let mut collector = TraceCollector::new(TraceMode::Events);
        let result = simulate_trial(&mut encounter, &mut rng, &mut collector).expect("trial runs");
        let text = format_trace(&encounter, collector.events(), &result);
        assert!(text.contains("Fight over"));
        assert!(text.contains("Hateful Strike"));
    }
}
