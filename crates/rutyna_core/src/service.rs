use anyhow::{anyhow, ensure, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use crate::calendar::DateSpan;
use crate::completion::{Completion, CompletionStatus};
use crate::cooldown;
use crate::ledger::{CompletionLedger, ToggleOutcome};
use crate::motivation::{MotivationError, MotivationRequest, MotivationSource};
use crate::note::{self, Note};
use crate::progress;
use crate::schedule;
use crate::stats::{self, DayCount};
use crate::store::{Snapshot, SnapshotStore};
use crate::streak::{self, StreakSummary};
use crate::task::{Task, TaskDraft};

/// Read-side summary of one task for one calendar day.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaskDigest {
    pub task: Task,
    pub streak: StreakSummary,
    pub progress: f64,
    /// Done completions recorded on the digest day.
    pub completed_today: u32,
    /// Finite per-day goal for chained tasks; `None` means unbounded (or not
    /// chained at all).
    pub daily_goal: Option<u32>,
    pub on_cooldown: bool,
    pub cooldown_ends_at: Option<DateTime<Utc>>,
}

/// Everything a daily view needs in one read.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayDigest {
    pub date: NaiveDate,
    pub entries: Vec<TaskDigest>,
    pub note: Option<Note>,
}

#[derive(Debug, Clone, Default)]
struct TrackerState {
    tasks: Vec<Task>,
    ledger: CompletionLedger,
    notes: Vec<Note>,
}

impl TrackerState {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            tasks: snapshot.tasks,
            ledger: CompletionLedger::new(snapshot.completions),
            notes: snapshot.notes,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            completions: self.ledger.completions().to_vec(),
            notes: self.notes.clone(),
        }
    }

    fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }
}

pub struct TrackerService {
    store: Box<dyn SnapshotStore>,
    state: RwLock<TrackerState>,
    motivation: Option<Box<dyn MotivationSource>>,
}

pub struct TrackerServiceBuilder {
    store: Option<Box<dyn SnapshotStore>>,
    motivation: Option<Box<dyn MotivationSource>>,
}

impl TrackerServiceBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            motivation: None,
        }
    }

    pub fn with_store(mut self, store: impl SnapshotStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_motivation_source(mut self, source: impl MotivationSource + 'static) -> Self {
        self.motivation = Some(Box::new(source));
        self
    }

    pub fn build(self) -> Result<TrackerService> {
        let store = self
            .store
            .ok_or_else(|| anyhow!("no snapshot store configured"))?;
        let snapshot = store.load().context("loading tracker snapshot")?;
        Ok(TrackerService {
            state: RwLock::new(TrackerState::from_snapshot(snapshot)),
            store,
            motivation: self.motivation,
        })
    }
}

impl TrackerService {
    pub fn builder() -> TrackerServiceBuilder {
        TrackerServiceBuilder::new()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.read().tasks.clone()
    }

    pub fn task(&self, task_id: &str) -> Result<Task> {
        self.state
            .read()
            .task(task_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown task `{task_id}`"))
    }

    pub fn add_task(&self, draft: TaskDraft, now: DateTime<Utc>) -> Result<Task> {
        ensure!(
            !draft.active_days.is_empty(),
            "a task needs at least one active weekday"
        );
        let task = draft.into_task(Uuid::new_v4().to_string(), now);
        let stored = task.clone();
        self.mutate(move |state| {
            state.tasks.push(stored);
            Ok(())
        })?;
        tracing::debug!(task = %task.id, name = %task.name, "task added");
        Ok(task)
    }

    /// Full-replace edit; the id must already exist.
    pub fn update_task(&self, task: Task) -> Result<()> {
        ensure!(
            !task.active_days.is_empty(),
            "a task needs at least one active weekday"
        );
        let task_id = task.id.clone();
        self.mutate(move |state| {
            let slot = state
                .tasks
                .iter_mut()
                .find(|candidate| candidate.id == task.id)
                .ok_or_else(|| anyhow!("unknown task `{}`", task.id))?;
            *slot = task;
            Ok(())
        })?;
        tracing::debug!(task = %task_id, "task replaced");
        Ok(())
    }

    /// Removes the task and every completion referencing it, so no orphan can
    /// remain.
    pub fn delete_task(&self, task_id: &str) -> Result<()> {
        let removed = self.mutate(|state| {
            let before = state.tasks.len();
            state.tasks.retain(|task| task.id != task_id);
            ensure!(state.tasks.len() < before, "unknown task `{task_id}`");
            Ok(state.ledger.remove_task(task_id))
        })?;
        tracing::debug!(task = task_id, completions = removed, "task deleted");
        Ok(())
    }

    pub fn toggle_completion(
        &self,
        task_id: &str,
        date: NaiveDate,
        status: CompletionStatus,
        now: DateTime<Utc>,
    ) -> Result<ToggleOutcome> {
        let outcome = self.mutate(|state| {
            let task = state
                .task(task_id)
                .cloned()
                .ok_or_else(|| anyhow!("unknown task `{task_id}`"))?;
            Ok(state.ledger.toggle(&task, date, status, now))
        })?;
        tracing::debug!(task = task_id, %date, ?outcome, "completion toggled");
        Ok(outcome)
    }

    pub fn completions(&self) -> Vec<Completion> {
        self.state.read().ledger.completions().to_vec()
    }

    pub fn completions_for_date(&self, date: NaiveDate) -> Vec<Completion> {
        self.state.read().ledger.for_date(date)
    }

    pub fn completions_for_task(&self, task_id: &str) -> Vec<Completion> {
        self.state.read().ledger.for_task(task_id)
    }

    pub fn note_for(&self, date: NaiveDate) -> Option<Note> {
        note::note_for(&self.state.read().notes, date).cloned()
    }

    /// Empty text deletes the day's note.
    pub fn upsert_note(&self, date: NaiveDate, text: &str) -> Result<()> {
        self.mutate(|state| {
            note::upsert_note(&mut state.notes, date, text);
            Ok(())
        })
    }

    /// Tasks due on the given day: weekday-eligible and inside their window.
    pub fn due_tasks(&self, date: NaiveDate) -> Vec<Task> {
        self.state
            .read()
            .tasks
            .iter()
            .filter(|task| schedule::is_scheduled(task, date))
            .cloned()
            .collect()
    }

    pub fn streak_for(&self, task_id: &str, today: NaiveDate) -> Result<StreakSummary> {
        let state = self.state.read();
        let task = state
            .task(task_id)
            .ok_or_else(|| anyhow!("unknown task `{task_id}`"))?;
        Ok(streak::calculate_streak(
            task,
            state.ledger.completions(),
            today,
        ))
    }

    pub fn progress_for(&self, task_id: &str) -> Result<f64> {
        let state = self.state.read();
        let task = state
            .task(task_id)
            .ok_or_else(|| anyhow!("unknown task `{task_id}`"))?;
        Ok(progress::progress(task, state.ledger.completions()))
    }

    /// Assembles the per-task summaries for `date`. Streaks are measured
    /// against `today` and the cooldown gate against `now`; both stay explicit
    /// so a digest for a past day is still deterministic.
    pub fn day_digest(&self, date: NaiveDate, today: NaiveDate, now: DateTime<Utc>) -> DayDigest {
        let state = self.state.read();
        let entries = state
            .tasks
            .iter()
            .filter(|task| schedule::is_scheduled(task, date))
            .map(|task| {
                let day_completions = state.ledger.for_task_on(&task.id, date);
                let completed_today = day_completions
                    .iter()
                    .filter(|completion| completion.status == CompletionStatus::Done)
                    .count() as u32;
                TaskDigest {
                    streak: streak::calculate_streak(task, state.ledger.completions(), today),
                    progress: progress::progress(task, state.ledger.completions()),
                    completed_today,
                    daily_goal: task
                        .cooldown()
                        .and_then(|cooldown| cooldown.occurrences_per_day()),
                    on_cooldown: cooldown::is_blocked(task, &day_completions, now),
                    cooldown_ends_at: cooldown::cooldown_ends_at(task, &day_completions),
                    task: task.clone(),
                }
            })
            .collect();
        DayDigest {
            date,
            entries,
            note: note::note_for(&state.notes, date).cloned(),
        }
    }

    pub fn daily_done_counts(&self, span: &DateSpan, task_id: Option<&str>) -> Vec<DayCount> {
        stats::daily_done_counts(self.state.read().ledger.completions(), span, task_id)
    }

    pub fn recent_done_counts(&self, today: NaiveDate, days: u32) -> Vec<DayCount> {
        stats::recent_done_counts(self.state.read().ledger.completions(), today, days)
    }

    pub fn total_done(&self) -> usize {
        stats::total_done(self.state.read().ledger.completions())
    }

    pub fn best_longest_streak(&self, today: NaiveDate) -> u32 {
        let state = self.state.read();
        stats::best_longest_streak(&state.tasks, state.ledger.completions(), today)
    }

    /// One motivational sentence for the day. The external call happens
    /// outside any lock and its failure never touches tracker state.
    pub fn daily_motivation(&self, date: NaiveDate, today: NaiveDate) -> Result<String> {
        let request = {
            let state = self.state.read();
            let total_tasks = state
                .tasks
                .iter()
                .filter(|task| schedule::is_scheduled(task, date))
                .count() as u32;
            let tasks_completed = state
                .ledger
                .for_date(date)
                .iter()
                .filter(|completion| completion.status == CompletionStatus::Done)
                .count() as u32;
            let streak = stats::best_current_streak(&state.tasks, state.ledger.completions(), today);
            MotivationRequest {
                tasks_completed,
                total_tasks,
                streak,
            }
        };
        let source = self
            .motivation
            .as_deref()
            .ok_or(MotivationError::Unconfigured)?;
        let message = source
            .generate(request)
            .context("generating daily motivation")?;
        Ok(message)
    }

    /// Applies `op` to a staged copy of the state and persists the result
    /// before it becomes visible, so a failed save leaves both memory and
    /// store untouched.
    fn mutate<T>(&self, op: impl FnOnce(&mut TrackerState) -> Result<T>) -> Result<T> {
        let mut state = self.state.write();
        let mut staged = state.clone();
        let value = op(&mut staged)?;
        self.store
            .save(&staged.snapshot())
            .context("persisting tracker snapshot")?;
        *state = staged;
        Ok(value)
    }
}
