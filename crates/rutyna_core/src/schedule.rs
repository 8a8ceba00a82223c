use chrono::NaiveDate;

use crate::calendar::{self, DateSpan};
use crate::task::{Cadence, RepeatPeriod, Task, TaskKind};

/// Whether the task is due on the given calendar day: its weekday must be in
/// the task's eligible set, and the day must fall inside the active window
/// when one is configured. Chained tasks are gated identically regardless of
/// cadence.
pub fn is_scheduled(task: &Task, date: NaiveDate) -> bool {
    if let Some(window) = &task.window {
        if !window.contains(date) {
            return false;
        }
    }
    task.is_active_on(date)
}

/// Number of scheduled occurrences inside the inclusive span. An inverted
/// span counts as zero rather than erroring.
pub fn count_scheduled_occurrences(task: &Task, span: &DateSpan) -> u64 {
    if !span.is_ordered() {
        return 0;
    }
    let eligible = span.days().filter(|day| is_scheduled(task, *day)).count() as u64;

    match task.kind {
        TaskKind::Chained { cooldown } => {
            // A zero or absent cooldown counts as one occurrence per eligible
            // day; the unbounded goal has no finite representation here.
            let per_day = cooldown
                .and_then(|cooldown| cooldown.occurrences_per_day())
                .unwrap_or(1);
            eligible * u64::from(per_day)
        }
        TaskKind::Normal | TaskKind::Streak => match task.cadence {
            Cadence::Every(repeat) => {
                let multiplier = match repeat.period {
                    RepeatPeriod::Day => eligible,
                    RepeatPeriod::Week => (span.len_days() as u64).div_ceil(7),
                    RepeatPeriod::Month => u64::from(calendar::month_span(span.start, span.end)),
                };
                u64::from(repeat.count) * multiplier
            }
            // No structured rule: fall back to plain weekday eligibility.
            Cadence::Daily | Cadence::Weekly => eligible,
        },
    }
}
