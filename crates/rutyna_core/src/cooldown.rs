use chrono::{DateTime, Duration, Utc};

use crate::completion::Completion;
use crate::task::{Task, TaskKind};

/// Instant at which the next chained repetition becomes permitted, given the
/// task's completions for the current calendar day. `None` when nothing gates
/// it: the task is not chained, or no stamped completion exists today.
///
/// An absent cooldown configuration counts as a zero-length pause, so the
/// returned instant is already in the past.
pub fn cooldown_ends_at(task: &Task, day_completions: &[Completion]) -> Option<DateTime<Utc>> {
    let cooldown = match task.kind {
        TaskKind::Chained { cooldown } => cooldown,
        TaskKind::Normal | TaskKind::Streak => return None,
    };
    let latest = day_completions
        .iter()
        .filter(|completion| completion.task_id == task.id)
        .filter_map(|completion| completion.completed_at)
        .max()?;
    let pause = cooldown.map(|cooldown| cooldown.duration()).unwrap_or_else(Duration::zero);
    Some(latest + pause)
}

/// Whether a new repetition is currently blocked.
pub fn is_blocked(task: &Task, day_completions: &[Completion], now: DateTime<Utc>) -> bool {
    cooldown_ends_at(task, day_completions).is_some_and(|ends| now < ends)
}

/// Countdown until the gate opens, floored at zero.
pub fn remaining(task: &Task, day_completions: &[Completion], now: DateTime<Utc>) -> Duration {
    cooldown_ends_at(task, day_completions)
        .map(|ends| (ends - now).max(Duration::zero()))
        .unwrap_or_else(Duration::zero)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;

    use super::*;
    use crate::calendar::DayOfWeek;
    use crate::completion::CompletionStatus;
    use crate::task::{Cadence, Cooldown};

    fn chained(cooldown: Option<Cooldown>) -> Task {
        Task {
            id: "t".into(),
            name: "Hydrate".into(),
            kind: TaskKind::Chained { cooldown },
            cadence: Cadence::Daily,
            active_days: BTreeSet::from([DayOfWeek::Mon]),
            created_at: DateTime::<Utc>::MIN_UTC,
            window: None,
        }
    }

    fn completion_at(instant: &str) -> Completion {
        Completion {
            id: "c".into(),
            task_id: "t".into(),
            date: NaiveDate::from_ymd_opt(2025, 10, 20).unwrap(),
            status: CompletionStatus::Done,
            completed_at: Some(instant.parse().unwrap()),
        }
    }

    #[test]
    fn no_completions_means_no_cooldown() {
        let task = chained(Some(Cooldown {
            hours: 1,
            minutes: 30,
        }));
        assert_eq!(cooldown_ends_at(&task, &[]), None);
        assert!(!is_blocked(&task, &[], "2025-10-20T09:00:00Z".parse().unwrap()));
    }

    #[test]
    fn gate_opens_exactly_when_the_pause_elapses() {
        let task = chained(Some(Cooldown {
            hours: 1,
            minutes: 30,
        }));
        let completions = vec![completion_at("2025-10-20T08:00:00Z")];

        let ends = cooldown_ends_at(&task, &completions).unwrap();
        assert_eq!(ends, "2025-10-20T09:30:00Z".parse::<DateTime<Utc>>().unwrap());

        assert!(is_blocked(&task, &completions, "2025-10-20T09:00:00Z".parse().unwrap()));
        assert!(!is_blocked(&task, &completions, "2025-10-20T09:31:00Z".parse().unwrap()));
    }

    #[test]
    fn latest_repetition_drives_the_gate() {
        let task = chained(Some(Cooldown {
            hours: 0,
            minutes: 45,
        }));
        let completions = vec![
            completion_at("2025-10-20T06:00:00Z"),
            completion_at("2025-10-20T08:00:00Z"),
            completion_at("2025-10-20T07:00:00Z"),
        ];
        let ends = cooldown_ends_at(&task, &completions).unwrap();
        assert_eq!(ends, "2025-10-20T08:45:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn countdown_is_floored_at_zero() {
        let task = chained(Some(Cooldown {
            hours: 0,
            minutes: 10,
        }));
        let completions = vec![completion_at("2025-10-20T08:00:00Z")];
        let late: DateTime<Utc> = "2025-10-20T12:00:00Z".parse().unwrap();
        assert_eq!(remaining(&task, &completions, late), Duration::zero());

        let mid: DateTime<Utc> = "2025-10-20T08:04:00Z".parse().unwrap();
        assert_eq!(remaining(&task, &completions, mid), Duration::minutes(6));
    }

    #[test]
    fn missing_cooldown_never_blocks() {
        let task = chained(None);
        let completions = vec![completion_at("2025-10-20T08:00:00Z")];
        assert!(!is_blocked(&task, &completions, "2025-10-20T08:00:01Z".parse().unwrap()));
    }

    #[test]
    fn non_chained_tasks_have_no_gate() {
        let mut task = chained(Some(Cooldown {
            hours: 2,
            minutes: 0,
        }));
        task.kind = TaskKind::Streak;
        let completions = vec![completion_at("2025-10-20T08:00:00Z")];
        assert_eq!(cooldown_ends_at(&task, &completions), None);
    }
}
