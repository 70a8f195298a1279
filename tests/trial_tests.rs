use hateful_strike::combat::{FightConfig, SimRng};
use hateful_strike::data::{Roster, TankDef};
use hateful_strike::parallel::WorkerPool;
use hateful_strike::trials::{run_trials, run_trials_parallel, run_trials_seeded, write_trials_csv};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn single_tank_roster(max_health: f64, mitigation: f64) -> Roster {
    Roster {
        fight: FightConfig {
            fight_length: 30.0,
            ..FightConfig::default()
        },
        tanks: vec![TankDef {
            name: "Solo".to_string(),
            max_health,
            dodge_chance: 0.0,
            mitigation,
            healthstone: false,
        }],
        healers: Vec::new(),
    }
}

#[test]
fn survival_rate_matches_result_count() {
    let mut encounter = Roster::default().to_encounter().expect("valid roster");
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let run = run_trials(&mut encounter, 40, &mut rng).expect("trials run");
    assert_eq!(run.results.len(), 40);
    let survived = run.results.iter().filter(|result| result.survived).count();
    assert_eq!(run.summary.survived, survived);
    assert!((run.summary.survival_rate - survived as f64 / 40.0).abs() < 1e-12);
    assert_eq!(run.summary.tanks.len(), 3);
    let deaths: usize = run.summary.tanks.iter().map(|tank| tank.deaths).sum();
    assert_eq!(deaths, 40 - survived);
}

#[test]
fn parallel_run_matches_seeded_sequential_run() {
    let mut encounter = Roster::default().to_encounter().expect("valid roster");
    let sequential = run_trials_seeded(&mut encounter, 64, 99).expect("trials run");
    let parallel = run_trials_parallel(&encounter, 64, 99, &WorkerPool::with_workers(3))
        .expect("trials run");
    assert_eq!(sequential.results, parallel.results);
    assert_eq!(sequential.summary, parallel.summary);
}

#[test]
fn seeded_trial_uses_its_own_stream() {
    let mut encounter = Roster::default().to_encounter().expect("valid roster");
    let run = run_trials_seeded(&mut encounter, 5, 1000).expect("trials run");
    let mut replay = Roster::default().to_encounter().expect("valid roster");
    let mut rng = SimRng::for_trial(1000, 3);
    let single = run_trials(&mut replay, 1, &mut rng).expect("trials run");
    assert_eq!(run.results[3], single.results[0]);
}

#[test]
fn unkillable_tank_always_survives() {
    let mut encounter = single_tank_roster(1000.0, 1.0)
        .to_encounter()
        .expect("valid roster");
    let run = run_trials_seeded(&mut encounter, 20, 3).expect("trials run");
    assert_eq!(run.summary.survival_rate, 1.0);
    assert_eq!(run.summary.median_overheal, 0.0);
    assert_eq!(run.summary.trials_without_healing, 20);
    // every strike lands, none of them hurts
    assert_eq!(run.summary.trials_without_damage, 20);
    assert_eq!(run.summary.tanks[0].median_hit_share, 1.0);
}

#[test]
fn fragile_tank_never_survives() {
    let mut encounter = single_tank_roster(100.0, 0.0)
        .to_encounter()
        .expect("valid roster");
    let run = run_trials_seeded(&mut encounter, 20, 4).expect("trials run");
    assert_eq!(run.summary.survived, 0);
    assert_eq!(run.summary.tanks[0].deaths, 20);
    assert_eq!(run.summary.tanks[0].median_damage_share, 1.0);
}

#[test]
fn csv_export_writes_header_and_rows() {
    let mut encounter = Roster::default().to_encounter().expect("valid roster");
    let run = run_trials_seeded(&mut encounter, 12, 5).expect("trials run");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("trials.csv");
    write_trials_csv(&path, &encounter.tank_names(), &run.results).expect("csv written");

    let mut reader = csv::Reader::from_path(&path).expect("csv readable");
    let headers = reader.headers().expect("header row").clone();
    assert!(headers.iter().any(|column| column == "damage_share_zug_zug"));
    assert_eq!(reader.records().count(), 12);
}
