use crate::completion::{Completion, CompletionStatus};
use crate::schedule;
use crate::task::Task;

/// Percent of scheduled occurrences completed inside the task's active
/// window. Zero when the window is absent, inverted, or schedules nothing.
///
/// Deliberately unclamped above 100: over-completion is meaningful to the
/// caller, who may clamp for display.
pub fn progress(task: &Task, completions: &[Completion]) -> f64 {
    let Some(window) = task.window else {
        return 0.0;
    };
    if !window.is_ordered() {
        return 0.0;
    }
    let scheduled = schedule::count_scheduled_occurrences(task, &window);
    if scheduled == 0 {
        return 0.0;
    }
    let done = completions
        .iter()
        .filter(|completion| {
            completion.task_id == task.id
                && completion.status == CompletionStatus::Done
                && window.contains(completion.date)
        })
        .count();
    done as f64 / scheduled as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{DateTime, NaiveDate, Utc};

    use super::*;
    use crate::calendar::{DateSpan, DayOfWeek};
    use crate::task::{Cadence, Cooldown, TaskKind};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    fn monday_task(window: Option<DateSpan>) -> Task {
        Task {
            id: "t".into(),
            name: "Review".into(),
            kind: TaskKind::Normal,
            cadence: Cadence::Daily,
            active_days: BTreeSet::from([DayOfWeek::Mon]),
            created_at: DateTime::<Utc>::MIN_UTC,
            window,
        }
    }

    fn done_on(day: NaiveDate) -> Completion {
        Completion {
            id: "c".into(),
            task_id: "t".into(),
            date: day,
            status: CompletionStatus::Done,
            completed_at: None,
        }
    }

    #[test]
    fn single_slot_window_reaches_one_hundred() {
        // 2025-10-20 through 10-24 contains exactly one Monday.
        let task = monday_task(Some(DateSpan::new(date(20), date(24))));
        assert_eq!(progress(&task, &[done_on(date(20))]), 100.0);
        assert_eq!(progress(&task, &[]), 0.0);
    }

    #[test]
    fn unbounded_or_inverted_windows_report_zero() {
        let unbounded = monday_task(None);
        assert_eq!(progress(&unbounded, &[done_on(date(20))]), 0.0);

        let inverted = monday_task(Some(DateSpan::new(date(24), date(20))));
        assert_eq!(progress(&inverted, &[done_on(date(20))]), 0.0);
    }

    #[test]
    fn completions_outside_the_window_do_not_count() {
        let task = monday_task(Some(DateSpan::new(date(20), date(24))));
        assert_eq!(progress(&task, &[done_on(date(27))]), 0.0);
    }

    #[test]
    fn over_completion_exceeds_one_hundred() {
        let mut task = monday_task(Some(DateSpan::new(date(20), date(24))));
        task.kind = TaskKind::Chained { cooldown: None };
        // One scheduled slot (the unbounded sentinel), two repetitions.
        let completions = vec![done_on(date(20)), done_on(date(20))];
        assert_eq!(progress(&task, &completions), 200.0);
    }

    #[test]
    fn zero_daily_goal_means_zero_progress() {
        let mut task = monday_task(Some(DateSpan::new(date(20), date(24))));
        task.kind = TaskKind::Chained {
            cooldown: Some(Cooldown {
                hours: 30,
                minutes: 0,
            }),
        };
        assert_eq!(progress(&task, &[done_on(date(20))]), 0.0);
    }
}
