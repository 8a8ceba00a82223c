use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::DateSpan;
use crate::completion::{Completion, CompletionStatus};
use crate::cooldown;
use crate::task::{Task, TaskKind};

/// What a toggle attempt did. `Blocked` is the cooldown no-op, not an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    /// A new completion was appended.
    Recorded,
    /// An existing completion changed status in place, id preserved.
    Updated,
    /// The existing same-status completion was removed (toggled off).
    Cleared,
    /// A chained repetition was rejected by an active cooldown.
    Blocked,
}

/// Owner of the completion collection. Every mutation is a single `&mut self`
/// call: fully applied or fully rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionLedger {
    completions: Vec<Completion>,
}

impl CompletionLedger {
    pub fn new(completions: Vec<Completion>) -> Self {
        Self { completions }
    }

    pub fn completions(&self) -> &[Completion] {
        &self.completions
    }

    pub fn for_task(&self, task_id: &str) -> Vec<Completion> {
        self.completions
            .iter()
            .filter(|completion| completion.task_id == task_id)
            .cloned()
            .collect()
    }

    pub fn for_date(&self, date: NaiveDate) -> Vec<Completion> {
        self.completions
            .iter()
            .filter(|completion| completion.date == date)
            .cloned()
            .collect()
    }

    pub fn for_task_on(&self, task_id: &str, date: NaiveDate) -> Vec<Completion> {
        self.completions
            .iter()
            .filter(|completion| completion.task_id == task_id && completion.date == date)
            .cloned()
            .collect()
    }

    /// Point query; meaningful for non-chained tasks, which hold at most one
    /// completion per `(task, day)`.
    pub fn find(&self, task_id: &str, date: NaiveDate) -> Option<&Completion> {
        self.completions
            .iter()
            .find(|completion| completion.task_id == task_id && completion.date == date)
    }

    pub fn in_span(&self, span: &DateSpan) -> Vec<Completion> {
        self.completions
            .iter()
            .filter(|completion| span.contains(completion.date))
            .cloned()
            .collect()
    }

    /// Record, flip, or clear a completion for the task on the given day.
    ///
    /// Chained tasks append an independent `done` repetition stamped with
    /// `now`, unless the cooldown gate is closed; they never remove or
    /// replace. Everything else follows replace-or-remove semantics on the
    /// single `(task, day)` slot.
    pub fn toggle(
        &mut self,
        task: &Task,
        date: NaiveDate,
        status: CompletionStatus,
        now: DateTime<Utc>,
    ) -> ToggleOutcome {
        match task.kind {
            TaskKind::Chained { .. } => {
                let today = self.for_task_on(&task.id, date);
                if cooldown::is_blocked(task, &today, now) {
                    return ToggleOutcome::Blocked;
                }
                self.completions.push(Completion {
                    id: new_id(),
                    task_id: task.id.clone(),
                    date,
                    status: CompletionStatus::Done,
                    completed_at: Some(now),
                });
                ToggleOutcome::Recorded
            }
            TaskKind::Normal | TaskKind::Streak => {
                let slot = self
                    .completions
                    .iter()
                    .position(|completion| completion.task_id == task.id && completion.date == date);
                match slot {
                    Some(pos) if self.completions[pos].status == status => {
                        self.completions.remove(pos);
                        ToggleOutcome::Cleared
                    }
                    Some(pos) => {
                        self.completions[pos].status = status;
                        ToggleOutcome::Updated
                    }
                    None => {
                        self.completions.push(Completion {
                            id: new_id(),
                            task_id: task.id.clone(),
                            date,
                            status,
                            completed_at: None,
                        });
                        ToggleOutcome::Recorded
                    }
                }
            }
        }
    }

    /// Cascade for task deletion; returns how many completions went with it.
    pub fn remove_task(&mut self, task_id: &str) -> usize {
        let before = self.completions.len();
        self.completions
            .retain(|completion| completion.task_id != task_id);
        before - self.completions.len()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
