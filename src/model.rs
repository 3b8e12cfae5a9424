use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single recorded practice session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub date: DateTime<Utc>,
    /// 0 to 100
    pub score: f64,
    pub questions_answered: u32,
    pub correct_answered: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_questions: u32,
    pub total_correct: u32,
    /// Percentage rendered upstream, e.g. "75.0"
    pub overall_accuracy: String,
    pub total_sessions: u32,
    /// Minutes
    pub total_study_time: u32,
    pub average_session_score: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct DifficultyStats {
    pub correct: u32,
    pub total: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct DifficultyBreakdown {
    pub easy: DifficultyStats,
    pub medium: DifficultyStats,
    pub hard: DifficultyStats,
}

impl DifficultyBreakdown {
    /// Buckets in easy, medium, hard order.
    pub fn buckets(&self) -> [(Difficulty, &DifficultyStats); 3] {
        [
            (Difficulty::Easy, &self.easy),
            (Difficulty::Medium, &self.medium),
            (Difficulty::Hard, &self.hard),
        ]
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectBreakdown {
    pub name: String,
    pub total_questions: u32,
    pub correct: u32,
    /// 0 to 100
    pub accuracy: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeerMetric {
    pub metric: String,
    pub student: f64,
    pub peer_average: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeerComparison {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile: Option<u32>,
    pub metrics: Vec<PeerMetric>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudyGoal {
    pub title: String,
    pub current: f64,
    pub target: f64,
    #[serde(default)]
    pub unit: String,
}

impl StudyGoal {
    /// Progress towards the target as a whole percentage, capped at 100.
    pub fn progress(&self) -> u32 {
        if self.target <= 0.0 {
            return 0;
        }
        ((self.current / self.target) * 100.0).round().clamp(0.0, 100.0) as u32
    }
}

/// Read-only aggregate of a student's practice history, as supplied by the
/// data service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub overview: Overview,
    pub difficulty_breakdown: DifficultyBreakdown,
    #[serde(default)]
    pub subject_breakdown: Vec<SubjectBreakdown>,
    #[serde(default)]
    pub recent_sessions: Vec<Session>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_comparison: Option<PeerComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_goals: Option<Vec<StudyGoal>>,
}

impl AnalyticsSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Peer comparison rows, or `None` when there is nothing to render.
    pub fn peer_metrics(&self) -> Option<&PeerComparison> {
        self.peer_comparison
            .as_ref()
            .filter(|peers| !peers.metrics.is_empty())
    }

    /// Study goals, or `None` when there is nothing to render.
    pub fn goals(&self) -> Option<&[StudyGoal]> {
        self.study_goals
            .as_deref()
            .filter(|goals| !goals.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT_JSON: &str = r#"{
        "overview": {
            "totalQuestions": 40,
            "totalCorrect": 30,
            "overallAccuracy": "75.0",
            "totalSessions": 4,
            "totalStudyTime": 95,
            "averageSessionScore": 74.5
        },
        "difficultyBreakdown": {
            "easy": { "correct": 15, "total": 16 },
            "medium": { "correct": 10, "total": 14 },
            "hard": { "correct": 5, "total": 10 }
        },
        "subjectBreakdown": [
            { "name": "Algebra", "totalQuestions": 20, "correct": 16, "accuracy": 80.0 }
        ],
        "recentSessions": [
            { "date": "2026-10-16T09:30:00Z", "score": 80.0, "questionsAnswered": 10, "correctAnswered": 8 }
        ]
    }"#;

    #[test]
    fn test_parse_snapshot_without_optional_sections() {
        let snapshot = AnalyticsSnapshot::from_json(SNAPSHOT_JSON).unwrap();

        assert_eq!(snapshot.overview.total_questions, 40);
        assert_eq!(snapshot.difficulty_breakdown.hard.total, 10);
        assert_eq!(snapshot.subject_breakdown[0].name, "Algebra");
        assert_eq!(snapshot.recent_sessions[0].correct_answered, 8);
        assert!(snapshot.peer_comparison.is_none());
        assert!(snapshot.study_goals.is_none());
    }

    #[test]
    fn test_absent_sections_are_not_serialized() {
        let snapshot = AnalyticsSnapshot::from_json(SNAPSHOT_JSON).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();

        assert!(!json.contains("peerComparison"));
        assert!(!json.contains("studyGoals"));
    }

    #[test]
    fn test_missing_overview_is_an_error() {
        let result = AnalyticsSnapshot::from_json(r#"{ "subjectBreakdown": [] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_optional_sections_render_as_absent() {
        let mut snapshot = AnalyticsSnapshot::from_json(SNAPSHOT_JSON).unwrap();
        snapshot.peer_comparison = Some(PeerComparison {
            percentile: None,
            metrics: vec![],
        });
        snapshot.study_goals = Some(vec![]);

        assert!(snapshot.peer_metrics().is_none());
        assert!(snapshot.goals().is_none());
    }

    #[test]
    fn test_goal_progress() {
        let goal = StudyGoal {
            title: "Weekly questions".to_string(),
            current: 45.0,
            target: 60.0,
            unit: "questions".to_string(),
        };
        assert_eq!(goal.progress(), 75);

        let overshoot = StudyGoal { current: 90.0, ..goal.clone() };
        assert_eq!(overshoot.progress(), 100);

        let no_target = StudyGoal { target: 0.0, ..goal };
        assert_eq!(no_target.progress(), 0);
    }
}
