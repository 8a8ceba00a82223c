use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use tracing::{debug, info, warn};

use rutyna_core::calendar::{self, DateSpan};
use rutyna_core::motivation::{MotivationError, MotivationRequest, MotivationSource};
use rutyna_core::service::TaskDigest;
use rutyna_core::store::JsonDirStore;
use rutyna_core::task::TaskKind;
use rutyna_core::TrackerService;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) data_root: PathBuf,
    pub(crate) date_override: Option<NaiveDate>,
}

impl AppConfig {
    /// `RUTYNA_ROOT` points at the store directory; `RUTYNA_DATE`
    /// (`YYYY-MM-DD`) pins the evaluation day, mainly for inspecting past
    /// state. Unparsable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(root) = std::env::var("RUTYNA_ROOT") {
            config.data_root = PathBuf::from(root);
        }
        if let Ok(date) = std::env::var("RUTYNA_DATE") {
            match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
                Ok(parsed) => config.date_override = Some(parsed),
                Err(err) => warn!(value = %date, %err, "ignoring RUTYNA_DATE"),
            }
        }
        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("rutyna-data"),
            date_override: None,
        }
    }
}

/// Offline stand-in for the external text generator; the shell stays useful
/// without a network backend.
struct CannedMotivation;

impl MotivationSource for CannedMotivation {
    fn generate(&self, request: MotivationRequest) -> Result<String, MotivationError> {
        let message = if request.total_tasks == 0 {
            "Nothing scheduled today. Rest, or get ahead.".to_string()
        } else if request.tasks_completed >= request.total_tasks {
            format!(
                "All {} tasks done. A streak of {} says this is no accident.",
                request.total_tasks, request.streak
            )
        } else if request.streak > 0 {
            format!(
                "{} of {} done, and a {}-day streak waiting on the rest.",
                request.tasks_completed, request.total_tasks, request.streak
            )
        } else {
            format!(
                "{} of {} done. One small completion restarts the chain.",
                request.tasks_completed, request.total_tasks
            )
        };
        Ok(message)
    }
}

pub fn run(config: AppConfig) -> Result<()> {
    info!(root = %config.data_root.display(), "starting rutyna");

    let service = TrackerService::builder()
        .with_store(JsonDirStore::new(&config.data_root))
        .with_motivation_source(CannedMotivation)
        .build()?;

    let now: DateTime<Utc> = Local::now().with_timezone(&Utc);
    let today = config
        .date_override
        .unwrap_or_else(|| Local::now().date_naive());
    debug!(%today, "rendering daily overview");

    let digest = service.day_digest(today, today, now);
    println!("Tasks for {}", today.format("%A, %B %-d, %Y"));
    if digest.entries.is_empty() {
        println!("  nothing scheduled");
    }
    for entry in &digest.entries {
        println!("  {}", format_entry(entry, now));
    }
    if let Some(note) = &digest.note {
        println!("  note: {}", note.text);
    }

    println!();
    println!("Last 7 days:");
    for day in service.recent_done_counts(today, 7) {
        println!(
            "  {}  {:>2}  {}",
            day.date.format("%a"),
            day.count,
            "#".repeat(day.count as usize)
        );
    }

    let trailing_year = DateSpan::new(calendar::shift_years(today, -1), today);
    let year_total: u32 = service
        .daily_done_counts(&trailing_year, None)
        .iter()
        .map(|day| day.count)
        .sum();
    println!();
    println!(
        "Completions: {} this year, {} all time. Longest streak: {} days.",
        year_total,
        service.total_done(),
        service.best_longest_streak(today)
    );

    match service.daily_motivation(today, today) {
        Ok(message) => println!("\n{message}"),
        Err(err) => println!("\nmotivation unavailable: {err:#}"),
    }

    Ok(())
}

fn format_entry(entry: &TaskDigest, now: DateTime<Utc>) -> String {
    let mark = if entry.completed_today > 0 { 'x' } else { ' ' };
    let mut line = format!("[{mark}] {}", entry.task.name);

    match entry.task.kind {
        TaskKind::Chained { .. } => {
            let goal = entry
                .daily_goal
                .map_or_else(|| "∞".to_string(), |goal| goal.to_string());
            line.push_str(&format!(" — chained, {}/{} today", entry.completed_today, goal));
        }
        TaskKind::Normal | TaskKind::Streak => {
            line.push_str(&format!(" — {}", entry.task.cadence));
        }
    }

    if entry.streak.current > 0 {
        line.push_str(&format!(", {}-day streak", entry.streak.current));
    }
    if entry.progress > 0.0 {
        line.push_str(&format!(", {:.0}%", entry.progress));
    }
    if entry.on_cooldown {
        if let Some(ends) = entry.cooldown_ends_at {
            line.push_str(&format!(", cooldown {}", format_countdown(ends - now)));
        }
    }
    line
}

fn format_countdown(left: Duration) -> String {
    let left = left.max(Duration::zero());
    let hours = left.num_hours();
    let minutes = left.num_minutes() % 60;
    let seconds = left.num_seconds() % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_formats_compactly() {
        assert_eq!(format_countdown(Duration::minutes(95)), "1h 35m");
        assert_eq!(format_countdown(Duration::seconds(130)), "2m 10s");
        assert_eq!(format_countdown(Duration::seconds(-5)), "0s");
    }

    #[test]
    fn canned_motivation_always_produces_a_message() {
        let source = CannedMotivation;
        for (completed, total, streak) in [(0, 0, 0), (1, 3, 2), (3, 3, 9), (0, 2, 0)] {
            let message = source
                .generate(MotivationRequest {
                    tasks_completed: completed,
                    total_tasks: total,
                    streak,
                })
                .expect("canned source cannot fail");
            assert!(!message.is_empty());
        }
    }
}
