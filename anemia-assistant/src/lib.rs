pub mod config;
pub mod error;
pub mod input;
pub mod render;
pub mod repl;
pub mod session;
pub mod tasks;
pub mod workflow;

pub use error::{AssistantError, Result};
pub use session::{ClinicalSession, StepOutcome};
pub use workflow::{build_anemia_workflow, create_flow_runner};
