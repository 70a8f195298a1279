use rand::Rng;
use rayon::prelude::*;
use tracing::info;

use crate::combat::{simulate_trial, Encounter, SimRng, TraceCollector, TrialResult};
use crate::error::EngineError;
use crate::parallel::WorkerPool;
use crate::trials::summary::{summarize, TrialSummary};

/// Every trial of a run, in execution order, plus their summary.
#[derive(Debug, Clone)]
pub struct TrialRun {
    pub results: Vec<TrialResult>,
    pub summary: TrialSummary,
}

fn finish(encounter: &Encounter, results: Vec<TrialResult>) -> TrialRun {
    let summary = summarize(&encounter.tanks, &results);
    info!(
        trials = summary.trials,
        survived = summary.survived,
        survival_rate = summary.survival_rate,
        median_overheal = summary.median_overheal,
        "trials complete"
    );
    TrialRun { results, summary }
}

/// Run `trials` fights back to back, all drawing from the one generator `rng`.
pub fn run_trials<R: Rng + ?Sized>(
    encounter: &mut Encounter,
    trials: usize,
    rng: &mut R,
) -> Result<TrialRun, EngineError> {
    info!(
        trials,
        tanks = encounter.tanks.len(),
        healers = encounter.healers.len(),
        "running trials"
    );
    let mut collector = TraceCollector::off();
    let mut results = Vec::with_capacity(trials);
    for _ in 0..trials {
        results.push(simulate_trial(encounter, rng, &mut collector)?);
    }
    Ok(finish(encounter, results))
}

/// Like [run_trials] but trial `i` gets its own generator seeded from `seed + i`.
/// Produces exactly what [run_trials_parallel] produces for the same seed.
pub fn run_trials_seeded(
    encounter: &mut Encounter,
    trials: usize,
    seed: u64,
) -> Result<TrialRun, EngineError> {
    info!(trials, seed, "running seeded trials");
    let mut collector = TraceCollector::off();
    let results = (0..trials)
        .map(|index| {
            let mut rng = SimRng::for_trial(seed, index);
            simulate_trial(encounter, &mut rng, &mut collector)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(finish(encounter, results))
}

/// Distributes trials across `pool` via Rayon. Each worker runs trials on its own copy of
/// the encounter. Results order matches trial index.
pub fn run_trials_parallel(
    encounter: &Encounter,
    trials: usize,
    seed: u64,
    pool: &WorkerPool,
) -> Result<TrialRun, EngineError> {
    info!(trials, seed, workers = pool.workers, "running parallel trials");
    let results = pool.install(|| {
        (0..trials)
            .into_par_iter()
            .map_init(
                || (encounter.clone(), TraceCollector::off()),
                |(local, collector), index| {
                    let mut rng = SimRng::for_trial(seed, index);
                    simulate_trial(local, &mut rng, collector)
                },
            )
            .collect::<Result<Vec<_>, _>>()
    })?;
    Ok(finish(encounter, results))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::data::Roster;

    #[test]
    fn run_returns_one_result_per_trial() {
        let mut encounter = Roster::default().to_encounter().expect("valid roster");
        let mut rng = SimRng::seed_from_u64(17);
        let run = run_trials(&mut encounter, 25, &mut rng).expect("trials run");
        assert_eq!(run.results.len(), 25);
        assert_eq!(run.summary.trials, 25);
        let survived = run.results.iter().filter(|result| result.survived).count();
        assert_eq!(run.summary.survived, survived);
        assert_eq!(run.summary.survival_rate, survived as f64 / 25.0);
    }

    #[test]
    fn zero_trials_is_an_empty_run() {
        let mut encounter = Roster::default().to_encounter().expect("valid roster");
        let run = run_trials_seeded(&mut encounter, 0, 1).expect("trials run");
        assert!(run.results.is_empty());
        assert_eq!(run.summary.survival_rate, 0.0);
    }
}
