use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_hateful-strike")
}

const ROSTER: &str = r#"
tanks:
  - { name: Doodoobear, max_health: 11000, dodge_chance: 0.25, mitigation: 0.75 }
  - { name: Cowchoppar, max_health: 9900, dodge_chance: 0.35, mitigation: 0.7 }
healers:
  - { spell: h4, tank: 0, bonus_healing: 1160, class: priest }
  - { spell: ht4, tank: 0, bonus_healing: 1030, class: druid }
  - { spell: h2, tank: 1, bonus_healing: 1100, class: priest }
  - { spell: hw7, tank: 1, bonus_healing: 900, class: shaman }
"#;

fn write_roster(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("fixture should be written");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("binary should run")
}

#[test]
fn simulate_command_emits_json_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let roster = write_roster(dir.path(), "roster.yaml", ROSTER);
    let output = run(&[
        "simulate",
        "--sims",
        "20",
        "--seed",
        "5",
        "--json",
        "--roster",
        roster.to_str().expect("utf8 path"),
    ]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("simulate should emit json");
    assert_eq!(payload["trials"], 20);
    assert_eq!(payload["seed"], 5);
    assert_eq!(payload["tanks"].as_array().map(Vec::len), Some(2));
    assert!(payload["survival_rate"].is_number());
}

#[test]
fn parallel_flag_does_not_change_the_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let roster = write_roster(dir.path(), "roster.yaml", ROSTER);
    let roster = roster.to_str().expect("utf8 path");
    let base = ["simulate", "--sims", "30", "--seed", "12", "--json", "--roster", roster];

    let sequential = run(&base);
    let mut parallel_args = base.to_vec();
    parallel_args.extend(["--parallel", "--workers", "2"]);
    let parallel = run(&parallel_args);

    assert_eq!(sequential.status.code(), Some(0));
    assert_eq!(parallel.status.code(), Some(0));
    assert_eq!(sequential.stdout, parallel.stdout);
}

#[test]
fn simulate_text_report_has_breakdowns_and_csv() {
    let dir = tempfile::tempdir().expect("tempdir");
    let roster = write_roster(dir.path(), "roster.yaml", ROSTER);
    let csv_path = dir.path().join("trials.csv");
    let output = run(&[
        "simulate",
        "--sims",
        "10",
        "--seed",
        "1",
        "--roster",
        roster.to_str().expect("utf8 path"),
        "--csv",
        csv_path.to_str().expect("utf8 path"),
    ]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DAMAGE BREAKDOWN"));
    assert!(stdout.contains("HATEFUL STRIKE BREAKDOWN"));
    assert!(stdout.contains("Cowchoppar:"));
    let csv = fs::read_to_string(&csv_path).expect("csv written");
    assert_eq!(csv.lines().count(), 11);
}

#[test]
fn trace_command_emits_json_events() {
    let dir = tempfile::tempdir().expect("tempdir");
    let roster = write_roster(dir.path(), "roster.json", &{
        let value: serde_json::Value = serde_yaml::from_str(ROSTER).expect("yaml fixture");
        value.to_string()
    });
    let output = run(&[
        "trace",
        "--seed",
        "3",
        "--json",
        "--roster",
        roster.to_str().expect("utf8 path"),
    ]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let events: serde_json::Value = serde_json::from_str(&stdout).expect("trace should emit json");
    let events = events.as_array().expect("array of events");
    assert_eq!(events[0]["time"], 0.0);
    assert_eq!(
        events.last().map(|event| event["event"].clone()),
        Some(serde_json::Value::from("fight_ended"))
    );
}

#[test]
fn validate_command_reports_every_issue() {
    let dir = tempfile::tempdir().expect("tempdir");
    let broken = ROSTER
        .replace("class: shaman", "class: paladin")
        .replace("tank: 1, bonus_healing: 1100", "tank: 7, bonus_healing: 1100");
    let roster = write_roster(dir.path(), "broken.yaml", &broken);
    let output = run(&["validate", roster.to_str().expect("utf8 path")]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("validation failed: 2 issue(s)"));
}

#[test]
fn validate_command_accepts_good_roster() {
    let dir = tempfile::tempdir().expect("tempdir");
    let roster = write_roster(dir.path(), "roster.yaml", ROSTER);
    let output = run(&["validate", roster.to_str().expect("utf8 path")]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("validation passed"));
}

#[test]
fn missing_roster_is_a_configuration_error() {
    let output = run(&["simulate", "--roster", "no/such/roster.yaml"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no/such/roster.yaml"));
}

#[test]
fn unknown_command_is_a_usage_error() {
    let output = run(&["optimize"]);
    assert_eq!(output.status.code(), Some(2));
}
