//! Student performance analytics and report exports.
//!
//! [`analytics`] holds the pure metric helpers (streaks, accuracy, trends,
//! weak topics, summaries). [`report`] turns an [`AnalyticsSnapshot`] into
//! PDF, CSV, JSON or a shareable text blurb and saves files through a
//! [`DownloadSink`].

pub mod analytics;
pub mod config;
pub mod download;
pub mod error;
pub mod model;
pub mod pdf;
pub mod report;

pub use analytics::{
    calculate_accuracy, calculate_streak, calculate_streak_at, estimate_time_to_mastery,
    format_study_time, generate_performance_summary, get_difficulty_category,
    get_performance_trend, get_weak_topics, longest_streak, DifficultyCategory, PerformanceTrend,
    Scored, SummaryInput, TopicScore, Trend,
};
pub use config::{PageLayout, ReportConfig};
pub use download::{Artifact, DirectorySink, DownloadSink, MemorySink, SavedFile};
pub use error::{ReportError, Result};
pub use model::{
    AnalyticsSnapshot, Difficulty, DifficultyBreakdown, DifficultyStats, Overview, PeerComparison,
    PeerMetric, Session, StudyGoal, SubjectBreakdown,
};
pub use report::{ReportContext, ReportEnvelope, ReportExporter, ReportFormat, ReportMetadata};
