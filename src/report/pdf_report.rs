//! PDF report layout.
//!
//! Blocks are laid out top to bottom on a fixed millimetre grid. Before each
//! block the cursor checks the remaining height; a block that would cross
//! the bottom margin moves to a fresh page. Tables repeat their header row
//! after a page break.

use super::ReportContext;
use crate::analytics::{calculate_accuracy, format_study_time, get_difficulty_category, get_weak_topics, DEFAULT_WEAK_TOPIC_THRESHOLD};
use crate::config::PageLayout;
use crate::error::Result;
use crate::model::AnalyticsSnapshot;
use crate::pdf::{fit_text, Color, Font, PdfDocument};

const BRAND: Color = Color::rgb(37, 99, 235);
const TEXT: Color = Color::rgb(31, 41, 55);
const MUTED: Color = Color::rgb(107, 114, 128);
const RULE: Color = Color::rgb(229, 231, 235);
const TABLE_HEADER: Color = Color::rgb(243, 244, 246);

const TITLE_SIZE: f64 = 22.0;
const SECTION_SIZE: f64 = 14.0;
const BODY_SIZE: f64 = 10.0;
const FOOTER_SIZE: f64 = 8.0;
const CELL_PADDING: f64 = 2.0;

/// Renders the report and serializes it.
pub fn render(snapshot: &AnalyticsSnapshot, ctx: &ReportContext<'_>) -> Result<Vec<u8>> {
    build(snapshot, ctx).to_bytes()
}

pub fn build(snapshot: &AnalyticsSnapshot, ctx: &ReportContext<'_>) -> PdfDocument {
    let mut report = ReportLayout::new(&ctx.config.layout);
    report.doc.set_title(&ctx.title());

    report.header_band(ctx);
    overview_section(&mut report, snapshot);
    difficulty_section(&mut report, snapshot);
    subject_section(&mut report, snapshot);

    if let Some(peers) = snapshot.peer_metrics() {
        report.section_title("Peer Comparison");
        if let Some(percentile) = peers.percentile {
            report.paragraph(&format!("You are in the {} percentile of your peers.", ordinal(percentile)));
        }
        let rows = peers
            .metrics
            .iter()
            .map(|metric| {
                vec![
                    metric.metric.clone(),
                    format!("{:.1}", metric.student),
                    format!("{:.1}", metric.peer_average),
                    format!("{:+.1}", metric.student - metric.peer_average),
                ]
            })
            .collect();
        report.table(&[("Metric", 0.4), ("You", 0.2), ("Peer Average", 0.2), ("Difference", 0.2)], rows);
    }

    if let Some(goals) = snapshot.goals() {
        report.section_title("Study Goals");
        let rows = goals
            .iter()
            .map(|goal| {
                vec![
                    goal.title.clone(),
                    format!("{} {}", goal.current, goal.unit).trim_end().to_string(),
                    format!("{} {}", goal.target, goal.unit).trim_end().to_string(),
                    format!("{}%", goal.progress()),
                ]
            })
            .collect();
        report.table(&[("Goal", 0.4), ("Current", 0.2), ("Target", 0.2), ("Progress", 0.2)], rows);
    }

    report.footers(ctx);
    report.doc
}

fn overview_section(report: &mut ReportLayout<'_>, snapshot: &AnalyticsSnapshot) {
    let overview = &snapshot.overview;
    report.section_title("Overview");
    report.key_value("Total Questions", &overview.total_questions.to_string());
    report.key_value("Correct Answers", &overview.total_correct.to_string());
    report.key_value("Overall Accuracy", &format!("{}%", overview.overall_accuracy));
    report.key_value("Total Sessions", &overview.total_sessions.to_string());
    report.key_value("Study Time", &format_study_time(overview.total_study_time));
    report.key_value("Average Session Score", &format!("{:.1}", overview.average_session_score));
}

fn difficulty_section(report: &mut ReportLayout<'_>, snapshot: &AnalyticsSnapshot) {
    report.section_title("Difficulty Breakdown");
    let rows = snapshot
        .difficulty_breakdown
        .buckets()
        .iter()
        .map(|(difficulty, stats)| {
            let accuracy = calculate_accuracy(stats.correct, stats.total);
            vec![
                difficulty.label().to_string(),
                format!("{}/{}", stats.correct, stats.total),
                format!("{}%", accuracy),
                capitalize(get_difficulty_category(f64::from(accuracy)).as_str()),
            ]
        })
        .collect();
    report.table(&[("Difficulty", 0.3), ("Correct", 0.25), ("Accuracy", 0.2), ("Rating", 0.25)], rows);
}

fn subject_section(report: &mut ReportLayout<'_>, snapshot: &AnalyticsSnapshot) {
    report.section_title("Subject Performance");
    if snapshot.subject_breakdown.is_empty() {
        report.paragraph("No subject activity recorded yet.");
        return;
    }

    let rows = snapshot
        .subject_breakdown
        .iter()
        .map(|subject| {
            vec![
                subject.name.clone(),
                subject.total_questions.to_string(),
                subject.correct.to_string(),
                format!("{:.0}%", subject.accuracy),
                capitalize(get_difficulty_category(subject.accuracy).as_str()),
            ]
        })
        .collect();
    report.table(
        &[("Subject", 0.36), ("Questions", 0.16), ("Correct", 0.16), ("Accuracy", 0.16), ("Rating", 0.16)],
        rows,
    );

    let weak = get_weak_topics(&snapshot.subject_breakdown, DEFAULT_WEAK_TOPIC_THRESHOLD);
    if !weak.is_empty() {
        let names: Vec<String> = weak
            .iter()
            .map(|subject| format!("{} ({:.0}%)", subject.name, subject.accuracy))
            .collect();
        report.paragraph(&format!("Focus areas: {}", names.join(", ")));
    }
}

/// Drawing cursor over a [`PdfDocument`].
struct ReportLayout<'a> {
    doc: PdfDocument,
    layout: &'a PageLayout,
    y: f64,
}

impl<'a> ReportLayout<'a> {
    fn new(layout: &'a PageLayout) -> Self {
        Self {
            doc: PdfDocument::new(layout.page_width, layout.page_height),
            layout,
            y: layout.margin,
        }
    }

    /// Starts a new page when `height` more millimetres would not fit.
    /// Returns whether a page break happened.
    fn ensure_space(&mut self, height: f64) -> bool {
        if self.y + height > self.layout.bottom_limit() {
            self.doc.add_page();
            self.y = self.layout.margin;
            return true;
        }
        false
    }

    fn header_band(&mut self, ctx: &ReportContext<'_>) {
        let layout = self.layout;
        let band = layout.header_height;
        let width = layout.content_width();
        self.doc.fill_rect(0.0, 0.0, layout.page_width, band, BRAND);

        let lines = [
            (band * 0.45, TITLE_SIZE, Font::Bold, ctx.title()),
            (band * 0.7, BODY_SIZE + 1.0, Font::Regular, format!("Student: {}", ctx.student_name)),
            (
                band * 0.85,
                BODY_SIZE,
                Font::Regular,
                format!("Generated: {}", ctx.generated_at.format("%Y-%m-%d %H:%M UTC")),
            ),
        ];
        for (y, size, font, text) in lines {
            let fitted = fit_text(&text, size, width);
            self.doc.text(layout.margin, y, size, font, Color::WHITE, &fitted);
        }
        self.y = band + layout.line_height * 1.5;
    }

    fn section_title(&mut self, title: &str) {
        let line = self.layout.line_height;
        // Keep the title together with at least two lines of its content.
        self.ensure_space(line * 4.0);
        self.y += line * 0.5;
        self.doc.text(self.layout.margin, self.y + line * 0.6, SECTION_SIZE, Font::Bold, BRAND, title);
        self.y += line;
        self.doc.line(
            self.layout.margin,
            self.y,
            self.layout.page_width - self.layout.margin,
            self.y,
            0.3,
            RULE,
        );
        self.y += line * 0.5;
    }

    fn key_value(&mut self, key: &str, value: &str) {
        let line = self.layout.line_height;
        self.ensure_space(line);
        let baseline = self.y + line * 0.7;
        self.doc.text(self.layout.margin, baseline, BODY_SIZE, Font::Bold, TEXT, key);
        self.doc.text(
            self.layout.margin + self.layout.content_width() * 0.5,
            baseline,
            BODY_SIZE,
            Font::Regular,
            TEXT,
            value,
        );
        self.y += line;
    }

    fn paragraph(&mut self, text: &str) {
        let line = self.layout.line_height;
        self.ensure_space(line);
        let fitted = fit_text(text, BODY_SIZE, self.layout.content_width());
        self.doc.text(self.layout.margin, self.y + line * 0.7, BODY_SIZE, Font::Regular, MUTED, &fitted);
        self.y += line;
    }

    /// `columns` pairs a header with its share of the content width.
    fn table(&mut self, columns: &[(&str, f64)], rows: Vec<Vec<String>>) {
        let line = self.layout.line_height;
        let widths: Vec<f64> = columns
            .iter()
            .map(|(_, share)| share * self.layout.content_width())
            .collect();
        let headers: Vec<String> = columns.iter().map(|(name, _)| name.to_string()).collect();

        self.ensure_space(line * 2.0);
        self.table_row(&headers, &widths, Font::Bold, Some(TABLE_HEADER));

        for row in rows {
            if self.ensure_space(line) {
                self.table_row(&headers, &widths, Font::Bold, Some(TABLE_HEADER));
            }
            self.table_row(&row, &widths, Font::Regular, None);
        }
        self.y += line * 0.5;
    }

    fn table_row(&mut self, cells: &[String], widths: &[f64], font: Font, fill: Option<Color>) {
        let line = self.layout.line_height;
        if let Some(fill) = fill {
            self.doc.fill_rect(self.layout.margin, self.y, self.layout.content_width(), line, fill);
        }

        let mut x = self.layout.margin;
        for (cell, width) in cells.iter().zip(widths) {
            let fitted = fit_text(cell, BODY_SIZE, width - CELL_PADDING * 2.0);
            self.doc.text(x + CELL_PADDING, self.y + line * 0.7, BODY_SIZE, font, TEXT, &fitted);
            x += width;
        }

        self.y += line;
        self.doc.line(
            self.layout.margin,
            self.y,
            self.layout.page_width - self.layout.margin,
            self.y,
            0.2,
            RULE,
        );
    }

    fn footers(&mut self, ctx: &ReportContext<'_>) {
        let total = self.doc.page_count();
        let y = self.layout.page_height - self.layout.margin / 2.0;
        for index in 0..total {
            self.doc.select_page(index);
            self.doc.text(
                self.layout.margin,
                y,
                FOOTER_SIZE,
                Font::Regular,
                MUTED,
                &format!("{} - {}", ctx.config.product_name, ctx.student_name),
            );
            self.doc.text(
                self.layout.page_width - self.layout.margin - 20.0,
                y,
                FOOTER_SIZE,
                Font::Regular,
                MUTED,
                &format!("Page {} of {}", index + 1, total),
            );
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::model::SubjectBreakdown;
    use crate::report::fixtures;

    fn content(snapshot: &AnalyticsSnapshot) -> (PdfDocument, Vec<String>) {
        build_for(snapshot, "Jane Doe")
    }

    fn build_for(snapshot: &AnalyticsSnapshot, name: &str) -> (PdfDocument, Vec<String>) {
        let config = ReportConfig::default();
        let ctx = ReportContext::new(&config, Some(name), fixtures::generated_at());
        let doc = build(snapshot, &ctx);
        let texts = doc.texts().into_iter().map(str::to_string).collect();
        (doc, texts)
    }

    fn has(texts: &[String], expected: &str) -> bool {
        texts.iter().any(|text| text == expected)
    }

    #[test]
    fn test_single_page_report_sections() {
        let (doc, text) = content(&fixtures::snapshot());

        assert_eq!(doc.page_count(), 1);
        assert!(has(&text, "EduPulse Performance Report"));
        assert!(has(&text, "Student: Jane Doe"));
        assert!(has(&text, "Overview"));
        assert!(has(&text, "Difficulty Breakdown"));
        assert!(has(&text, "Subject Performance"));
        assert!(has(&text, "15/16"));
        assert!(has(&text, "94%"));
        assert!(has(&text, "Algebra"));
        assert!(has(&text, "Page 1 of 1"));
        assert!(!has(&text, "Peer Comparison"));
        assert!(!has(&text, "Study Goals"));
    }

    #[test]
    fn test_empty_snapshot_renders() {
        let (doc, text) = content(&fixtures::empty_snapshot());

        assert_eq!(doc.page_count(), 1);
        assert!(has(&text, "0/0"));
        assert!(has(&text, "0%"));
        assert!(has(&text, "No subject activity recorded yet."));
        assert!(text.iter().all(|t| !t.contains("NaN")));
    }

    #[test]
    fn test_optional_sections_rendered_when_present() {
        let snapshot = fixtures::with_optional_sections(fixtures::snapshot());
        let (_, text) = content(&snapshot);

        assert!(has(&text, "Peer Comparison"));
        assert!(has(&text, "You are in the 82nd percentile of your peers."));
        assert!(has(&text, "+6.5"));
        assert!(has(&text, "Study Goals"));
        assert!(has(&text, "45 questions"));
        assert!(has(&text, "75%"));
    }

    #[test]
    fn test_long_tables_paginate() {
        let mut snapshot = fixtures::snapshot();
        snapshot.subject_breakdown = (0..80)
            .map(|i| SubjectBreakdown {
                name: format!("Subject {}", i),
                total_questions: 10,
                correct: 7,
                accuracy: 70.0,
            })
            .collect();

        let (doc, text) = content(&snapshot);

        assert!(doc.page_count() >= 3);
        assert!(has(&text, "Subject 79"));
        let last = format!("Page {} of {}", doc.page_count(), doc.page_count());
        assert!(doc.page_texts(doc.page_count() - 1).contains(&last.as_str()));
        // Header row repeated on every page the table spans.
        let header_rows = text.iter().filter(|t| *t == "Questions").count();
        assert!(header_rows >= 3);
    }

    #[test]
    fn test_cursor_never_crosses_bottom_margin() {
        let layout = PageLayout::default();
        let mut report = ReportLayout::new(&layout);
        for _ in 0..200 {
            report.key_value("Key", "Value");
            assert!(report.y <= layout.bottom_limit());
        }
        assert!(report.doc.page_count() > 1);
    }

    #[test]
    fn test_focus_areas_list_weak_subjects() {
        let mut snapshot = fixtures::snapshot();
        snapshot.subject_breakdown[1].accuracy = 35.0;
        let (_, text) = content(&snapshot);
        assert!(has(&text, "Focus areas: Geometry, Plane (35%)"));
    }

    #[test]
    fn test_long_student_name_fits_header() {
        let name = "Maximiliana Alexandrina ".repeat(5);
        let (doc, _) = build_for(&fixtures::snapshot(), &name);

        let layout = PageLayout::default();
        let student_line = doc.page_texts(0)[1];
        assert!(student_line.starts_with("Student: Maximiliana"));
        assert!(student_line.ends_with("..."));
        assert!(crate::pdf::estimate_text_width(student_line, BODY_SIZE + 1.0) <= layout.content_width());
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let config = ReportConfig::default();
        let ctx = ReportContext::new(&config, None, fixtures::generated_at());

        let bytes = render(&fixtures::with_optional_sections(fixtures::snapshot()), &ctx).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(82), "82nd");
        assert_eq!(ordinal(111), "111th");
    }
}
