mod runner;
mod types;

pub use runner::Harvester;
pub use types::{RunSummary, Stage, TaskFailure, TaskOutcome};
