pub mod stage_task;
pub mod types;

pub use stage_task::{StageTask, next_action_for};
pub use types::{StageDecision, session_keys};
