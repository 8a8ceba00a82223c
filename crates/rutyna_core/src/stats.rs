use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{self, DateSpan};
use crate::completion::{Completion, CompletionStatus};
use crate::streak;
use crate::task::{Task, TaskKind};

/// Done-completion tally for one calendar day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: u32,
}

/// Zero-filled per-day `done` counts across the span, optionally restricted
/// to one task. Backs heatmap-style views.
pub fn daily_done_counts(
    completions: &[Completion],
    span: &DateSpan,
    task_id: Option<&str>,
) -> Vec<DayCount> {
    let mut by_date: HashMap<NaiveDate, u32> = HashMap::new();
    for completion in completions {
        if completion.status != CompletionStatus::Done {
            continue;
        }
        if let Some(id) = task_id {
            if completion.task_id != id {
                continue;
            }
        }
        *by_date.entry(completion.date).or_insert(0) += 1;
    }
    span.days()
        .map(|date| DayCount {
            date,
            count: by_date.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Per-day counts for the trailing window ending on `today`.
pub fn recent_done_counts(completions: &[Completion], today: NaiveDate, days: u32) -> Vec<DayCount> {
    if days == 0 {
        return Vec::new();
    }
    let span = DateSpan::new(calendar::shift_days(today, -i64::from(days - 1)), today);
    daily_done_counts(completions, &span, None)
}

pub fn total_done(completions: &[Completion]) -> usize {
    completions
        .iter()
        .filter(|completion| completion.status == CompletionStatus::Done)
        .count()
}

/// Longest historical streak across every streak-tracked task.
pub fn best_longest_streak(tasks: &[Task], completions: &[Completion], today: NaiveDate) -> u32 {
    tasks
        .iter()
        .filter(|task| task.is_streak_tracked())
        .map(|task| streak::calculate_streak(task, completions, today).longest)
        .max()
        .unwrap_or(0)
}

/// Best live streak across `Streak`-variant tasks; the number fed to the
/// motivation generator.
pub fn best_current_streak(tasks: &[Task], completions: &[Completion], today: NaiveDate) -> u32 {
    tasks
        .iter()
        .filter(|task| matches!(task.kind, TaskKind::Streak))
        .map(|task| streak::calculate_streak(task, completions, today).current)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{DateTime, Utc};

    use super::*;
    use crate::calendar::DayOfWeek;
    use crate::task::Cadence;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    fn done(task_id: &str, day: NaiveDate) -> Completion {
        Completion {
            id: format!("{task_id}-{day}"),
            task_id: task_id.into(),
            date: day,
            status: CompletionStatus::Done,
            completed_at: None,
        }
    }

    fn task(id: &str, kind: TaskKind) -> Task {
        Task {
            id: id.into(),
            name: id.into(),
            kind,
            cadence: Cadence::Daily,
            active_days: BTreeSet::from([DayOfWeek::Mon]),
            created_at: DateTime::<Utc>::MIN_UTC,
            window: None,
        }
    }

    #[test]
    fn counts_are_zero_filled_across_the_span() {
        let completions = vec![
            done("a", date(20)),
            done("b", date(20)),
            done("a", date(22)),
        ];
        let span = DateSpan::new(date(20), date(23));
        let counts = daily_done_counts(&completions, &span, None);
        let tallies: Vec<u32> = counts.iter().map(|day| day.count).collect();
        assert_eq!(tallies, vec![2, 0, 1, 0]);
    }

    #[test]
    fn task_filter_and_status_filter_apply() {
        let mut missed = done("a", date(21));
        missed.status = CompletionStatus::Missed;
        let completions = vec![done("a", date(20)), done("b", date(20)), missed];

        let span = DateSpan::new(date(20), date(21));
        let counts = daily_done_counts(&completions, &span, Some("a"));
        let tallies: Vec<u32> = counts.iter().map(|day| day.count).collect();
        assert_eq!(tallies, vec![1, 0]);

        assert_eq!(total_done(&completions), 2);
    }

    #[test]
    fn recent_counts_cover_the_trailing_window() {
        let completions = vec![done("a", date(24))];
        let counts = recent_done_counts(&completions, date(26), 7);
        assert_eq!(counts.len(), 7);
        assert_eq!(counts[0].date, date(20));
        assert_eq!(counts[4].count, 1);
        assert!(recent_done_counts(&completions, date(26), 0).is_empty());
    }

    #[test]
    fn best_streaks_respect_variant_boundaries() {
        let tasks = vec![
            task("s", TaskKind::Streak),
            task("c", TaskKind::Chained { cooldown: None }),
            task("n", TaskKind::Normal),
        ];
        let today = date(22);
        // The chained task has the longer history, the streak task the live run.
        let completions = vec![
            done("c", date(15)),
            done("c", date(16)),
            done("c", date(17)),
            done("s", date(21)),
            done("s", date(22)),
            done("n", date(18)),
            done("n", date(19)),
            done("n", date(20)),
            done("n", date(21)),
        ];

        assert_eq!(best_longest_streak(&tasks, &completions, today), 3);
        // Normal tasks never contribute, chained tasks are excluded from the
        // motivation number.
        assert_eq!(best_current_streak(&tasks, &completions, today), 2);
    }
}
