pub mod cli;
pub mod combat;
pub mod data;
pub mod error;
pub mod parallel;
pub mod telemetry;
pub mod trials;

pub use error::{ConfigurationError, EngineError, Error};
