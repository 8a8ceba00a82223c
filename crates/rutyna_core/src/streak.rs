use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::completion::{Completion, CompletionStatus};
use crate::task::{Cadence, RepeatPeriod, Task};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreakSummary {
    /// Length of the run ending in the current or previous period.
    pub current: u32,
    /// Longest run anywhere in history, independent of recency.
    pub longest: u32,
    /// Most recent raw completion day, before any deduplication.
    pub last_completion: Option<NaiveDate>,
}

enum Continuity {
    Daily,
    Weekly,
}

fn continuity(task: &Task) -> Continuity {
    match task.effective_cadence() {
        Cadence::Weekly => Continuity::Weekly,
        Cadence::Every(repeat) if repeat.period == RepeatPeriod::Week => Continuity::Weekly,
        _ => Continuity::Daily,
    }
}

/// Streak state for a task given the full completion history. `today` is an
/// explicit parameter so results are deterministic and testable.
///
/// Only `Streak` and `Chained` tasks are tracked; everything else is all-zero.
pub fn calculate_streak(task: &Task, completions: &[Completion], today: NaiveDate) -> StreakSummary {
    if !task.is_streak_tracked() {
        return StreakSummary::default();
    }

    let mut days: Vec<NaiveDate> = completions
        .iter()
        .filter(|completion| {
            completion.task_id == task.id && completion.status == CompletionStatus::Done
        })
        .map(|completion| completion.date)
        .collect();
    if days.is_empty() {
        return StreakSummary::default();
    }
    let last_completion = days.iter().copied().max();

    // Several completions on one day (routine for chained tasks) count as a
    // single day of continuity.
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let (current, longest) = match continuity(task) {
        Continuity::Daily => runs(&days, today, |day| calendar::shift_days(day, -1)),
        Continuity::Weekly => {
            let mut weeks: Vec<NaiveDate> = days.iter().map(|day| calendar::week_start(*day)).collect();
            weeks.dedup();
            runs(&weeks, calendar::week_start(today), |week| {
                calendar::shift_weeks(week, -1)
            })
        }
    };

    StreakSummary {
        current,
        longest,
        last_completion,
    }
}

/// Run lengths over a deduplicated, descending period list.
///
/// The current run is anchored at `anchor` (today, or this week's start) with
/// a one-period grace: a run ending in the previous period still counts, so an
/// unfinished current period does not zero it out. Each step backward must
/// land exactly one period earlier; any gap terminates the walk.
fn runs(
    entries: &[NaiveDate],
    anchor: NaiveDate,
    step_back: impl Fn(NaiveDate) -> NaiveDate,
) -> (u32, u32) {
    let grace = step_back(anchor);
    let mut current = 0u32;
    if let Some(start) = entries
        .iter()
        .position(|entry| *entry == anchor || *entry == grace)
    {
        current = 1;
        let mut expected = step_back(entries[start]);
        for entry in &entries[start + 1..] {
            if *entry != expected {
                break;
            }
            current += 1;
            expected = step_back(expected);
        }
    }

    let mut longest = 1u32;
    let mut run = 1u32;
    for pair in entries.windows(2) {
        if step_back(pair[0]) == pair[1] {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
    }

    (current, longest)
}
