//! Report generation.
//!
//! Renders an [`AnalyticsSnapshot`] as PDF, CSV, JSON or shareable text.
//! Rendering is pure given a [`ReportContext`]; [`ReportExporter`] stamps the
//! clock, renders, and hands the result to a [`DownloadSink`].

pub mod csv_report;
pub mod json_report;
pub mod pdf_report;
pub mod share;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ReportConfig;
use crate::download::{Artifact, DownloadSink, SavedFile, CSV_MIME, JSON_MIME, PDF_MIME};
use crate::error::Result;
use crate::model::AnalyticsSnapshot;

pub use json_report::{ReportEnvelope, ReportMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Pdf,
    Csv,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => PDF_MIME,
            ReportFormat::Csv => CSV_MIME,
            ReportFormat::Json => JSON_MIME,
        }
    }
}

/// Everything a renderer needs besides the snapshot itself.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub config: &'a ReportConfig,
    pub student_name: &'a str,
    pub generated_at: DateTime<Utc>,
}

impl<'a> ReportContext<'a> {
    pub fn new(config: &'a ReportConfig, student_name: Option<&'a str>, generated_at: DateTime<Utc>) -> Self {
        Self {
            config,
            student_name: config.student_name(student_name),
            generated_at,
        }
    }

    pub fn title(&self) -> String {
        format!("{} Performance Report", self.config.product_name)
    }

    /// Calendar date of generation in local time.
    pub fn report_date(&self) -> NaiveDate {
        self.generated_at.with_timezone(&Local).date_naive()
    }
}

/// `<product>-Report-<date>.<ext>`
pub fn dated_filename(product: &str, date: NaiveDate, format: ReportFormat) -> String {
    format!(
        "{}-Report-{}.{}",
        filename_part(product),
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// `<product>_Report_<name>_<date>.<ext>`, whitespace in the name becomes `_`.
pub fn named_filename(product: &str, student_name: &str, date: NaiveDate, format: ReportFormat) -> String {
    format!(
        "{}_Report_{}_{}.{}",
        filename_part(product),
        filename_part(student_name),
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

fn filename_part(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect()
}

/// Renders reports and saves them through a sink.
pub struct ReportExporter<S: DownloadSink> {
    config: ReportConfig,
    sink: S,
}

impl<S: DownloadSink> ReportExporter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            config: ReportConfig::default(),
            sink,
        }
    }

    /// Fails when the configured page layout has no printable area.
    pub fn with_config(config: ReportConfig, sink: S) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, sink })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// PDF saved as `<product>-Report-<date>.pdf`.
    pub fn generate_pdf_report(&self, snapshot: &AnalyticsSnapshot, student_name: Option<&str>) -> Result<SavedFile> {
        let ctx = self.context(student_name);
        let bytes = pdf_report::render(snapshot, &ctx)?;
        let filename = dated_filename(&self.config.product_name, ctx.report_date(), ReportFormat::Pdf);
        self.save(filename, ReportFormat::Pdf, bytes)
    }

    /// PDF saved as `<product>_Report_<name>_<date>.pdf`.
    pub fn export_to_pdf(&self, snapshot: &AnalyticsSnapshot, student_name: Option<&str>) -> Result<SavedFile> {
        let ctx = self.context(student_name);
        let bytes = pdf_report::render(snapshot, &ctx)?;
        let filename = named_filename(
            &self.config.product_name,
            ctx.student_name,
            ctx.report_date(),
            ReportFormat::Pdf,
        );
        self.save(filename, ReportFormat::Pdf, bytes)
    }

    /// CSV saved as `<product>-Report-<date>.csv`.
    pub fn generate_csv_report(&self, snapshot: &AnalyticsSnapshot, student_name: Option<&str>) -> Result<SavedFile> {
        let ctx = self.context(student_name);
        let content = csv_report::render(snapshot, &ctx)?;
        let filename = dated_filename(&self.config.product_name, ctx.report_date(), ReportFormat::Csv);
        self.save(filename, ReportFormat::Csv, content.into_bytes())
    }

    /// CSV saved as `<product>_Report_<name>_<date>.csv`.
    pub fn export_to_csv(&self, snapshot: &AnalyticsSnapshot, student_name: Option<&str>) -> Result<SavedFile> {
        let ctx = self.context(student_name);
        let content = csv_report::render(snapshot, &ctx)?;
        let filename = named_filename(
            &self.config.product_name,
            ctx.student_name,
            ctx.report_date(),
            ReportFormat::Csv,
        );
        self.save(filename, ReportFormat::Csv, content.into_bytes())
    }

    /// Pretty-printed JSON envelope saved as `<product>_Report_<name>_<date>.json`.
    pub fn generate_json_report(&self, snapshot: &AnalyticsSnapshot, student_name: Option<&str>) -> Result<SavedFile> {
        let ctx = self.context(student_name);
        let content = json_report::render(snapshot, &ctx)?;
        let filename = named_filename(
            &self.config.product_name,
            ctx.student_name,
            ctx.report_date(),
            ReportFormat::Json,
        );
        self.save(filename, ReportFormat::Json, content.into_bytes())
    }

    /// Short emoji-annotated blurb; nothing is saved.
    pub fn generate_shareable_summary(&self, snapshot: &AnalyticsSnapshot, student_name: Option<&str>) -> String {
        share::render(snapshot, &self.context(student_name))
    }

    fn context<'a>(&'a self, student_name: Option<&'a str>) -> ReportContext<'a> {
        ReportContext::new(&self.config, student_name, Utc::now())
    }

    fn save(&self, filename: String, format: ReportFormat, bytes: Vec<u8>) -> Result<SavedFile> {
        log::debug!("Rendered {} report: {} bytes", format.extension(), bytes.len());
        let artifact = Artifact::new(filename, format.mime_type(), bytes);
        let saved = self.sink.save(&artifact)?;
        log::info!("Exported report {} ({} bytes)", saved.filename, saved.size_bytes);
        Ok(saved)
    }
}
