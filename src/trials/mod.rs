pub mod export_csv;
pub mod monte_carlo;
pub mod summary;

pub use export_csv::write_trials_csv;
pub use monte_carlo::{run_trials, run_trials_parallel, run_trials_seeded, TrialRun};
pub use summary::{median, summarize, TankSummary, TrialSummary};
