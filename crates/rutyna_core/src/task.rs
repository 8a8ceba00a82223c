use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{DateSpan, DayOfWeek};

/// Behavioral category of a recurring task.
///
/// `Normal` is plain per-occurrence done/not-done, `Streak` additionally
/// tracks consecutive-period continuity, `Chained` may be completed several
/// times per day, each repetition gated by the cooldown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TaskKind {
    Normal,
    Streak,
    Chained {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cooldown: Option<Cooldown>,
    },
}

/// Minimum pause between two chained completions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cooldown {
    pub hours: u32,
    pub minutes: u32,
}

impl Cooldown {
    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.total_minutes()))
    }

    /// Completions that fit into one day, or `None` for a zero cooldown
    /// (unbounded repetitions).
    pub fn occurrences_per_day(&self) -> Option<u32> {
        match self.total_minutes() {
            0 => None,
            total => Some(24 * 60 / total),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RepeatPeriod {
    Day,
    Week,
    Month,
}

impl fmt::Display for RepeatPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self {
            RepeatPeriod::Day => "day",
            RepeatPeriod::Week => "week",
            RepeatPeriod::Month => "month",
        };
        f.write_str(unit)
    }
}

/// Structured repeat rule: `count` occurrences per `period`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repeat {
    pub count: u32,
    pub period: RepeatPeriod,
}

/// How often a task is due: a simple tag, or a structured repeat rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Weekly,
    Every(Repeat),
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cadence::Daily => f.write_str("daily"),
            Cadence::Weekly => f.write_str("weekly"),
            Cadence::Every(repeat) if repeat.count == 1 => match repeat.period {
                RepeatPeriod::Day => f.write_str("daily"),
                RepeatPeriod::Week => f.write_str("weekly"),
                RepeatPeriod::Month => f.write_str("monthly"),
            },
            Cadence::Every(repeat) => {
                write!(f, "{} times a {}", repeat.count, repeat.period)
            }
        }
    }
}

/// A recurring-activity definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub kind: TaskKind,
    pub cadence: Cadence,
    /// Weekdays on which the task is eligible. Never empty; the service
    /// rejects drafts without one.
    pub active_days: BTreeSet<DayOfWeek>,
    pub created_at: DateTime<Utc>,
    /// Inclusive tracking bounds; absent means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<DateSpan>,
}

impl Task {
    /// Streak accounting applies to `Streak` and `Chained` tasks only.
    pub fn is_streak_tracked(&self) -> bool {
        matches!(self.kind, TaskKind::Streak | TaskKind::Chained { .. })
    }

    pub fn cooldown(&self) -> Option<Cooldown> {
        match self.kind {
            TaskKind::Chained { cooldown } => cooldown,
            TaskKind::Normal | TaskKind::Streak => None,
        }
    }

    /// Chained tasks repeat daily regardless of their stored cadence.
    pub fn effective_cadence(&self) -> Cadence {
        if matches!(self.kind, TaskKind::Chained { .. }) {
            Cadence::Daily
        } else {
            self.cadence
        }
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.active_days.contains(&DayOfWeek::of(date))
    }
}

/// Caller-supplied fields of a new task; id and creation instant are assigned
/// by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub kind: TaskKind,
    pub cadence: Cadence,
    pub active_days: BTreeSet<DayOfWeek>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<DateSpan>,
}

impl TaskDraft {
    pub fn into_task(self, id: String, created_at: DateTime<Utc>) -> Task {
        Task {
            id,
            name: self.name,
            kind: self.kind,
            cadence: self.cadence,
            active_days: self.active_days,
            created_at,
            window: self.window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_derives_daily_occurrences() {
        let cooldown = Cooldown {
            hours: 1,
            minutes: 30,
        };
        assert_eq!(cooldown.total_minutes(), 90);
        assert_eq!(cooldown.occurrences_per_day(), Some(16));

        let unbounded = Cooldown {
            hours: 0,
            minutes: 0,
        };
        assert_eq!(unbounded.occurrences_per_day(), None);

        // A cooldown longer than a day leaves no room for a full repetition.
        let oversized = Cooldown {
            hours: 25,
            minutes: 0,
        };
        assert_eq!(oversized.occurrences_per_day(), Some(0));
    }

    #[test]
    fn chained_cadence_is_always_daily() {
        let task = Task {
            id: "t".into(),
            name: "Push-ups".into(),
            kind: TaskKind::Chained { cooldown: None },
            cadence: Cadence::Weekly,
            active_days: BTreeSet::from([DayOfWeek::Mon]),
            created_at: DateTime::<Utc>::MIN_UTC,
            window: None,
        };
        assert_eq!(task.effective_cadence(), Cadence::Daily);
        assert!(task.is_streak_tracked());
    }

    #[test]
    fn cadence_labels_read_naturally() {
        assert_eq!(Cadence::Daily.to_string(), "daily");
        assert_eq!(
            Cadence::Every(Repeat {
                count: 1,
                period: RepeatPeriod::Week,
            })
            .to_string(),
            "weekly"
        );
        assert_eq!(
            Cadence::Every(Repeat {
                count: 3,
                period: RepeatPeriod::Month,
            })
            .to_string(),
            "3 times a month"
        );
    }

    #[test]
    fn task_wire_form_uses_lowercase_tags_and_calendar_days() {
        let task = Task {
            id: "task-1".into(),
            name: "Read".into(),
            kind: TaskKind::Normal,
            cadence: Cadence::Daily,
            active_days: BTreeSet::from([DayOfWeek::Mon, DayOfWeek::Sun]),
            created_at: DateTime::<Utc>::MIN_UTC,
            window: Some(DateSpan::new(
                chrono::NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
                chrono::NaiveDate::from_ymd_opt(2025, 10, 31).unwrap(),
            )),
        };
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains(r#""type":"normal""#));
        assert!(json.contains(r#""cadence":"daily""#));
        assert!(json.contains(r#""active_days":["mon","sun"]"#));
        assert!(json.contains(r#""start":"2025-10-01""#));
    }
}
