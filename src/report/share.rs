use super::ReportContext;
use crate::analytics::{format_study_time, get_weak_topics, DEFAULT_WEAK_TOPIC_THRESHOLD};
use crate::model::{AnalyticsSnapshot, SubjectBreakdown};

/// Multi-line, emoji-annotated progress blurb.
pub fn render(snapshot: &AnalyticsSnapshot, ctx: &ReportContext<'_>) -> String {
    let overview = &snapshot.overview;
    let mut lines = vec![
        format!("📊 {}'s {} Progress", ctx.student_name, ctx.config.product_name),
        String::new(),
        format!("🎯 Accuracy: {}%", overview.overall_accuracy),
        format!(
            "✅ Questions: {} correct of {}",
            overview.total_correct, overview.total_questions
        ),
        format!("📚 Sessions: {}", overview.total_sessions),
        format!("⏱️ Study time: {}", format_study_time(overview.total_study_time)),
    ];

    if let Some(best) = strongest_subject(&snapshot.subject_breakdown) {
        lines.push(format!("🏆 Top subject: {} ({:.0}%)", best.name, best.accuracy));
    }

    if let Some(weakest) = get_weak_topics(&snapshot.subject_breakdown, DEFAULT_WEAK_TOPIC_THRESHOLD).first() {
        lines.push(format!("💪 Working on: {} ({:.0}%)", weakest.name, weakest.accuracy));
    }

    lines.push(String::new());
    lines.push(format!("Keep learning with {}! 🚀", ctx.config.product_name));
    lines.join("\n")
}

/// Highest accuracy; the earliest subject wins a tie.
fn strongest_subject(subjects: &[SubjectBreakdown]) -> Option<&SubjectBreakdown> {
    subjects.iter().fold(None, |best: Option<&SubjectBreakdown>, subject| match best {
        Some(current) if current.accuracy >= subject.accuracy => Some(current),
        _ => Some(subject),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::report::fixtures;

    #[test]
    fn test_summary_lines() {
        let config = ReportConfig::default();
        let ctx = ReportContext::new(&config, Some("Jane"), fixtures::generated_at());
        let mut snapshot = fixtures::snapshot();
        snapshot.subject_breakdown[1].accuracy = 45.0;

        let text = render(&snapshot, &ctx);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "📊 Jane's EduPulse Progress");
        assert!(lines.contains(&"🎯 Accuracy: 75.0%"));
        assert!(lines.contains(&"✅ Questions: 30 correct of 40"));
        assert!(lines.contains(&"⏱️ Study time: 1h 35m"));
        assert!(lines.contains(&"🏆 Top subject: Algebra (90%)"));
        assert!(lines.contains(&"💪 Working on: Geometry, Plane (45%)"));
        assert_eq!(*lines.last().unwrap(), "Keep learning with EduPulse! 🚀");
    }

    #[test]
    fn test_summary_without_subjects() {
        let config = ReportConfig::default();
        let ctx = ReportContext::new(&config, None, fixtures::generated_at());

        let text = render(&fixtures::empty_snapshot(), &ctx);

        assert!(text.starts_with("📊 Student's EduPulse Progress"));
        assert!(text.contains("⏱️ Study time: 0m"));
        assert!(!text.contains("Top subject"));
        assert!(!text.contains("Working on"));
    }

    #[test]
    fn test_strongest_subject_tie_keeps_first() {
        let mut subjects = fixtures::snapshot().subject_breakdown;
        subjects[1].accuracy = subjects[0].accuracy;
        assert_eq!(strongest_subject(&subjects).unwrap().name, "Algebra");
        assert!(strongest_subject(&[]).is_none());
    }
}
