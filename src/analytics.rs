//! Session-derived analytics.
//!
//! Everything here is a pure function of its arguments. Zero totals are
//! guarded in place and produce 0 rather than NaN.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::model::{Session, SubjectBreakdown};

pub const DEFAULT_WEAK_TOPIC_THRESHOLD: f64 = 60.0;
pub const DEFAULT_MASTERY_TARGET: f64 = 90.0;
pub const DEFAULT_HOURLY_IMPROVEMENT: f64 = 0.5;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceTrend {
    pub trend: Trend,
    /// Absolute change, rounded to a whole percent
    pub percentage: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyCategory {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl DifficultyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyCategory::Excellent => "excellent",
            DifficultyCategory::Good => "good",
            DifficultyCategory::Fair => "fair",
            DifficultyCategory::Poor => "poor",
        }
    }
}

impl std::fmt::Display for DifficultyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that carries a 0-100 accuracy score.
pub trait Scored {
    fn accuracy(&self) -> f64;
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TopicScore {
    pub name: String,
    pub accuracy: f64,
}

impl TopicScore {
    pub fn new(name: &str, accuracy: f64) -> Self {
        Self {
            name: name.to_string(),
            accuracy,
        }
    }
}

impl Scored for TopicScore {
    fn accuracy(&self) -> f64 {
        self.accuracy
    }
}

impl Scored for SubjectBreakdown {
    fn accuracy(&self) -> f64 {
        self.accuracy
    }
}

/// Inputs for [`generate_performance_summary`].
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct SummaryInput {
    pub overall_accuracy: f64,
    pub total_sessions: u32,
    pub streak: u32,
    /// Percentage points relative to the previous week
    pub week_over_week_improvement: f64,
}

/// Consecutive calendar days, ending today in local time, with at least one
/// session.
pub fn calculate_streak(sessions: &[Session]) -> u32 {
    calculate_streak_at(sessions, &Local::now())
}

/// Streak walk against an explicit clock. Days are taken in `now`'s time
/// zone and deduplicated before walking, so several sessions on one day
/// count once.
pub fn calculate_streak_at<Tz: TimeZone>(sessions: &[Session], now: &DateTime<Tz>) -> u32 {
    let today = now.date_naive();
    let mut days = session_days(sessions, &now.timezone());
    days.retain(|day| *day <= today);
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let mut streak: u32 = 0;
    for day in days {
        let offset = (today - day).num_days();
        if offset == i64::from(streak) {
            streak += 1;
        } else {
            break;
        }
    }

    streak
}

/// Longest run of consecutive session days anywhere in the history.
pub fn longest_streak<Tz: TimeZone>(sessions: &[Session], tz: &Tz) -> u32 {
    let mut days = session_days(sessions, tz);
    days.sort_unstable();
    days.dedup();

    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        run = match previous {
            Some(prev) if (day - prev).num_days() == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }

    longest
}

fn session_days<Tz: TimeZone>(sessions: &[Session], tz: &Tz) -> Vec<NaiveDate> {
    sessions
        .iter()
        .map(|session| session.date.with_timezone(tz).date_naive())
        .collect()
}

/// Whole-percent accuracy; 0 when nothing was attempted.
pub fn calculate_accuracy(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(correct) / f64::from(total) * 100.0).round() as u32
}

pub fn get_performance_trend(current: f64, previous: f64) -> PerformanceTrend {
    if previous == 0.0 {
        return PerformanceTrend {
            trend: Trend::Flat,
            percentage: 0,
        };
    }

    let change = (current - previous) / previous * 100.0;
    let trend = if change > 0.0 {
        Trend::Up
    } else if change < 0.0 {
        Trend::Down
    } else {
        Trend::Flat
    };

    PerformanceTrend {
        trend,
        percentage: change.abs().round() as u32,
    }
}

pub fn get_difficulty_category(accuracy: f64) -> DifficultyCategory {
    if accuracy >= 80.0 {
        DifficultyCategory::Excellent
    } else if accuracy >= 60.0 {
        DifficultyCategory::Good
    } else if accuracy >= 40.0 {
        DifficultyCategory::Fair
    } else {
        DifficultyCategory::Poor
    }
}

/// Topics under `threshold`, weakest first. Ties keep their input order.
pub fn get_weak_topics<T: Scored>(topics: &[T], threshold: f64) -> Vec<&T> {
    let mut weak: Vec<&T> = topics
        .iter()
        .filter(|topic| topic.accuracy() < threshold)
        .collect();
    weak.sort_by(|a, b| a.accuracy().total_cmp(&b.accuracy()));
    weak
}

/// Hours of practice needed to lift `current_accuracy` to `target_accuracy`
/// at `hourly_improvement` points per hour.
pub fn estimate_time_to_mastery(
    current_accuracy: f64,
    target_accuracy: f64,
    hourly_improvement: f64,
) -> Result<u32> {
    for (field, value) in [
        ("current_accuracy", current_accuracy),
        ("target_accuracy", target_accuracy),
    ] {
        if !value.is_finite() {
            return Err(ReportError::invalid_argument(
                field,
                format!("must be a finite number, got {}", value),
            ));
        }
    }
    if !hourly_improvement.is_finite() || hourly_improvement <= 0.0 {
        return Err(ReportError::invalid_argument(
            "hourly_improvement",
            format!("must be a positive number, got {}", hourly_improvement),
        ));
    }

    if current_accuracy >= target_accuracy {
        return Ok(0);
    }

    Ok(((target_accuracy - current_accuracy) / hourly_improvement).ceil() as u32)
}

pub fn format_study_time(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    let remainder = minutes % 60;
    if remainder == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, remainder)
    }
}

pub fn generate_performance_summary(data: &SummaryInput) -> String {
    if data.total_sessions == 0 {
        return "Start practicing to see your performance summary here!".to_string();
    }

    let accuracy = data.overall_accuracy.round();
    let mut summary = vec![format!(
        "You've completed {} {} with an overall accuracy of {}%.",
        data.total_sessions,
        if data.total_sessions == 1 { "session" } else { "sessions" },
        accuracy
    )];

    summary.push(
        match get_difficulty_category(data.overall_accuracy) {
            DifficultyCategory::Excellent => "That's excellent work!",
            DifficultyCategory::Good => "You're doing well.",
            DifficultyCategory::Fair => "There's solid room to grow.",
            DifficultyCategory::Poor => "Keep practicing to build your foundation.",
        }
        .to_string(),
    );

    if data.streak > 0 {
        summary.push(format!(
            "You're on a {}-day study streak.",
            data.streak
        ));
    }

    let improvement = data.week_over_week_improvement.round();
    if improvement > 0.0 {
        summary.push(format!("Your accuracy is up {}% from last week.", improvement));
    } else if improvement < 0.0 {
        summary.push(format!(
            "Your accuracy is down {}% from last week.",
            improvement.abs()
        ));
    } else {
        summary.push("Your accuracy held steady compared to last week.".to_string());
    }

    summary.join(" ")
}
