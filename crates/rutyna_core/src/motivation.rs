use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything the external text generator is allowed to know.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MotivationRequest {
    pub tasks_completed: u32,
    pub total_tasks: u32,
    pub streak: u32,
}

#[derive(Debug, Error)]
pub enum MotivationError {
    #[error("no motivation source configured")]
    Unconfigured,
    #[error("motivation backend failed: {0}")]
    Backend(String),
}

/// External text-generation adapters implement this trait. Failures are
/// non-fatal and must never touch tracker state.
pub trait MotivationSource: Send + Sync {
    fn generate(&self, request: MotivationRequest) -> Result<String, MotivationError>;
}
