use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Done,
    Missed,
    Skipped,
}

/// A single recorded event against a task on one calendar day.
///
/// Non-chained tasks carry at most one completion per `(task_id, date)` pair;
/// chained tasks accumulate one per cooldown-gated repetition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Completion {
    pub id: String,
    /// Weak reference into the task catalog; the ledger cascades removal.
    pub task_id: String,
    pub date: NaiveDate,
    pub status: CompletionStatus,
    /// Precise instant, recorded only for chained-task repetitions where the
    /// cooldown math needs it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}
