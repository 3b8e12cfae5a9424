//! CSV reports.
//!
//! One block per section, separated by a blank line: a title line, a header
//! row, then data rows. Section order is fixed; peer comparison and study
//! goals are appended only when present.

use chrono::{Local, SecondsFormat};

use super::ReportContext;
use crate::analytics::{calculate_accuracy, format_study_time};
use crate::error::Result;
use crate::model::AnalyticsSnapshot;

pub fn render(snapshot: &AnalyticsSnapshot, ctx: &ReportContext<'_>) -> Result<String> {
    let mut out = String::new();

    write_block(
        &mut out,
        &[
            vec![ctx.title()],
            vec!["Student".to_string(), ctx.student_name.to_string()],
            vec![
                "Generated".to_string(),
                ctx.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            ],
        ],
    )?;

    let overview = &snapshot.overview;
    write_section(
        &mut out,
        "Overview",
        &["Metric", "Value"],
        vec![
            row(["Total Questions", &overview.total_questions.to_string()]),
            row(["Total Correct", &overview.total_correct.to_string()]),
            row(["Overall Accuracy", &format!("{}%", overview.overall_accuracy)]),
            row(["Total Sessions", &overview.total_sessions.to_string()]),
            row(["Total Study Time", &format_study_time(overview.total_study_time)]),
            row([
                "Average Session Score",
                &format!("{:.1}", overview.average_session_score),
            ]),
        ],
    )?;

    let difficulty_rows = snapshot
        .difficulty_breakdown
        .buckets()
        .iter()
        .map(|(difficulty, stats)| {
            row([
                difficulty.label(),
                &stats.correct.to_string(),
                &stats.total.to_string(),
                &percent(calculate_accuracy(stats.correct, stats.total)),
            ])
        })
        .collect();
    write_section(
        &mut out,
        "Difficulty Breakdown",
        &["Difficulty", "Correct", "Total", "Accuracy"],
        difficulty_rows,
    )?;

    let subject_rows = snapshot
        .subject_breakdown
        .iter()
        .map(|subject| {
            row([
                &subject.name,
                &subject.total_questions.to_string(),
                &subject.correct.to_string(),
                &format!("{:.0}%", subject.accuracy),
            ])
        })
        .collect();
    write_section(
        &mut out,
        "Subject Performance",
        &["Subject", "Questions", "Correct", "Accuracy"],
        subject_rows,
    )?;

    let session_rows = snapshot
        .recent_sessions
        .iter()
        .map(|session| {
            row([
                &session.date.with_timezone(&Local).format("%Y-%m-%d").to_string(),
                &format!("{:.0}", session.score),
                &session.questions_answered.to_string(),
                &session.correct_answered.to_string(),
                &percent(calculate_accuracy(
                    session.correct_answered,
                    session.questions_answered,
                )),
            ])
        })
        .collect();
    write_section(
        &mut out,
        "Recent Sessions",
        &["Date", "Score", "Questions", "Correct", "Accuracy"],
        session_rows,
    )?;

    if let Some(peers) = snapshot.peer_metrics() {
        let mut rows: Vec<Vec<String>> = peers
            .metrics
            .iter()
            .map(|metric| {
                row([
                    &metric.metric,
                    &format!("{:.1}", metric.student),
                    &format!("{:.1}", metric.peer_average),
                    &format!("{:+.1}", metric.student - metric.peer_average),
                ])
            })
            .collect();
        if let Some(percentile) = peers.percentile {
            rows.push(row(["Percentile", &percentile.to_string()]));
        }
        write_section(
            &mut out,
            "Peer Comparison",
            &["Metric", "You", "Peer Average", "Difference"],
            rows,
        )?;
    }

    if let Some(goals) = snapshot.goals() {
        let rows = goals
            .iter()
            .map(|goal| {
                row([
                    &goal.title,
                    &format!("{}", goal.current),
                    &format!("{}", goal.target),
                    &goal.unit,
                    &percent(goal.progress()),
                ])
            })
            .collect();
        write_section(
            &mut out,
            "Study Goals",
            &["Goal", "Current", "Target", "Unit", "Progress"],
            rows,
        )?;
    }

    Ok(out)
}

fn row<const N: usize>(fields: [&str; N]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

fn percent(value: u32) -> String {
    format!("{}%", value)
}

fn write_section(out: &mut String, title: &str, header: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
    let mut records = Vec::with_capacity(rows.len() + 2);
    records.push(vec![title.to_string()]);
    records.push(header.iter().map(|h| h.to_string()).collect());
    records.extend(rows);
    write_block(out, &records)
}

/// Appends one block of records, preceded by a blank line unless it is the
/// first block.
fn write_block(out: &mut String, records: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for record in records {
        writer.write_record(record)?;
    }
    let bytes = writer.into_inner()?;

    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&String::from_utf8_lossy(&bytes));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::report::fixtures;

    fn render_with(snapshot: &crate::model::AnalyticsSnapshot, name: Option<&str>) -> String {
        let config = ReportConfig::default();
        let ctx = ReportContext::new(&config, name, fixtures::generated_at());
        render(snapshot, &ctx).unwrap()
    }

    fn section_titles(csv: &str) -> Vec<String> {
        // A section title is the first line of each block.
        csv.split("\n\n")
            .filter_map(|block| block.lines().next())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let csv = render_with(&fixtures::snapshot(), Some("Jane Doe"));

        assert_eq!(
            section_titles(&csv),
            vec![
                "EduPulse Performance Report",
                "Overview",
                "Difficulty Breakdown",
                "Subject Performance",
                "Recent Sessions",
            ]
        );
        assert!(csv.starts_with("EduPulse Performance Report\nStudent,Jane Doe\nGenerated,2026-10-17T12:00:00Z\n"));
    }

    #[test]
    fn test_overview_and_breakdown_rows() {
        let csv = render_with(&fixtures::snapshot(), None);

        assert!(csv.contains("Metric,Value\nTotal Questions,40\nTotal Correct,30\n"));
        assert!(csv.contains("Overall Accuracy,75.0%\n"));
        assert!(csv.contains("Total Study Time,1h 35m\n"));
        assert!(csv.contains("Average Session Score,74.5\n"));
        assert!(csv.contains("Easy,15,16,94%\nMedium,10,14,71%\nHard,5,10,50%\n"));
        assert!(csv.contains("Algebra,20,18,90%\n"));
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let csv = render_with(&fixtures::snapshot(), None);
        assert!(csv.contains("\"Geometry, Plane\",20,12,60%\n"));
    }

    #[test]
    fn test_zero_totals_render_zero() {
        let snapshot = fixtures::snapshot();
        let csv = render_with(&snapshot, None);
        // The second recent session answered nothing.
        let day = snapshot.recent_sessions[1].date.with_timezone(&Local).format("%Y-%m-%d");
        assert!(csv.contains(&format!("{},70,0,0,0%\n", day)));
        assert!(!csv.contains("NaN"));

        let empty = render_with(&fixtures::empty_snapshot(), None);
        assert!(empty.contains("Easy,0,0,0%\nMedium,0,0,0%\nHard,0,0,0%\n"));
        assert!(!empty.contains("NaN"));
    }

    #[test]
    fn test_session_dates_use_local_calendar_day() {
        let mut snapshot = fixtures::empty_snapshot();
        let late = chrono::DateTime::parse_from_rfc3339("2026-10-16T23:30:00+00:00")
            .unwrap()
            .with_timezone(&chrono::Utc);
        snapshot.recent_sessions.push(crate::model::Session {
            date: late,
            score: 90.0,
            questions_answered: 10,
            correct_answered: 9,
        });

        let csv = render_with(&snapshot, None);
        let local_day = late.with_timezone(&Local).date_naive();
        assert!(csv.contains(&format!("{},90,10,9,90%\n", local_day.format("%Y-%m-%d"))));
    }

    #[test]
    fn test_empty_lists_keep_headers_only() {
        let csv = render_with(&fixtures::empty_snapshot(), None);

        assert!(csv.contains("Subject Performance\nSubject,Questions,Correct,Accuracy\n\nRecent Sessions\n"));
        assert!(csv.ends_with("Recent Sessions\nDate,Score,Questions,Correct,Accuracy\n"));
        assert!(!csv.contains("Peer Comparison"));
        assert!(!csv.contains("Study Goals"));
    }

    #[test]
    fn test_optional_sections_follow_sessions() {
        let snapshot = fixtures::with_optional_sections(fixtures::snapshot());
        let csv = render_with(&snapshot, None);

        let titles = section_titles(&csv);
        assert_eq!(&titles[4..], &["Recent Sessions", "Peer Comparison", "Study Goals"]);
        assert!(csv.contains("Accuracy,75.0,68.5,+6.5\nPercentile,82\n"));
        assert!(csv.contains("Weekly questions,45,60,questions,75%\n"));
    }
}
