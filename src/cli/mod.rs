//! CLI commands

mod context;
mod run;
mod style;
mod tally;

pub use context::CommandContext;
pub use run::run_cycle;
pub use tally::{run_check_ci, run_tally};
