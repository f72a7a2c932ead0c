//! Scripted scenarios: RON-defined action lists with verification

pub mod actions;
pub mod definition;
pub mod executor;
pub mod results;
pub mod verification;

pub use actions::ScenarioAction;
pub use definition::ScenarioDefinition;
pub use executor::{ScenarioExecutor, ScenarioExecutorConfig};
pub use results::{ExecutionReport, TickStats, Timings};
pub use verification::{VerificationCondition, VerificationResult};
