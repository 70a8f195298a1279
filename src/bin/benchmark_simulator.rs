//! Run the trial engine for a fixed wall-clock budget and optionally append one line to a log
//! file for trend tracking.
//!
//! Usage:
//!   cargo run --release --bin benchmark_simulator
//!   cargo run --release --bin benchmark_simulator -- --log
//!
//! --log  Append one row to benchmark_log.csv (date, trials_per_sec, trials_per_min, strikes_per_sec, strikes_per_trial).

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::time::Instant;

use hateful_strike::combat::{simulate_trial, SimRng, TraceCollector};
use hateful_strike::data::Roster;

fn main() -> io::Result<()> {
    let log = std::env::args().any(|a| a == "--log");

    let mut encounter = match Roster::default().to_encounter() {
        Ok(encounter) => encounter,
        Err(err) => {
            eprintln!("built-in roster is invalid: {err}");
            std::process::exit(2);
        }
    };
    let mut collector = TraceCollector::off();

    // Run for at least this long or this many trials
    const MIN_DURATION_MS: u128 = 2000;
    const MIN_TRIALS: u64 = 500;

    let start = Instant::now();
    let mut trials: u64 = 0;
    let mut strikes: u64 = 0;
    while start.elapsed().as_millis() < MIN_DURATION_MS || trials < MIN_TRIALS {
        let mut rng = SimRng::for_trial(7, trials as usize);
        match simulate_trial(&mut encounter, &mut rng, &mut collector) {
            Ok(result) => strikes += u64::from(result.strikes),
            Err(err) => {
                eprintln!("trial {trials} failed: {err}");
                std::process::exit(1);
            }
        }
        trials += 1;
    }
    let elapsed_secs = start.elapsed().as_secs_f64();

    let trials_per_sec = trials as f64 / elapsed_secs;
    let trials_per_min = trials_per_sec * 60.0;
    let strikes_per_sec = strikes as f64 / elapsed_secs;
    let strikes_per_trial = strikes as f64 / trials as f64;

    println!("Simulator benchmark (built-in roster):");
    println!("  Trials:        {}", trials);
    println!("  Duration:      {:.2} s", elapsed_secs);
    println!("  Trials/s:      {:.2}", trials_per_sec);
    println!("  Trials/min:    {:.2}", trials_per_min);
    println!("  Strikes/s:     {:.2}", strikes_per_sec);
    println!("  Strikes/trial: {:.2}", strikes_per_trial);

    if log {
        let date = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let line = format!(
            "{},{:.4},{:.4},{:.4},{:.2}\n",
            date, trials_per_sec, trials_per_min, strikes_per_sec, strikes_per_trial
        );
        let path = "benchmark_log.csv";
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if file.metadata().map(|m| m.len() == 0).unwrap_or(true) {
            file.write_all(
                b"date,trials_per_sec,trials_per_min,strikes_per_sec,strikes_per_trial\n",
            )?;
        }
        file.write_all(line.as_bytes())?;
        file.flush()?;
        println!("Appended to {}", path);
    }
    Ok(())
}
