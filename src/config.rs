//! Report configuration.
//!
//! Loaded from TOML; every key is optional and falls back to its default.
//!
//! ```toml
//! product_name = "EduPulse"
//! default_student_name = "Student"
//!
//! [layout]
//! margin = 15.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ReportError, Result};

/// Page geometry for PDF reports, in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    #[serde(default = "default_page_width")]
    pub page_width: f64,
    #[serde(default = "default_page_height")]
    pub page_height: f64,
    #[serde(default = "default_margin")]
    pub margin: f64,
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    #[serde(default = "default_header_height")]
    pub header_height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Used in report titles and file names
    #[serde(default = "default_product_name")]
    pub product_name: String,
    /// Written to the JSON envelope metadata
    #[serde(default = "default_format_version")]
    pub format_version: String,
    #[serde(default = "default_student_name")]
    pub default_student_name: String,
    #[serde(default)]
    pub layout: PageLayout,
}

fn default_page_width() -> f64 {
    210.0
}
fn default_page_height() -> f64 {
    297.0
}
fn default_margin() -> f64 {
    20.0
}
fn default_line_height() -> f64 {
    7.0
}
fn default_header_height() -> f64 {
    40.0
}
fn default_product_name() -> String {
    "EduPulse".to_string()
}
fn default_format_version() -> String {
    "1.0".to_string()
}
fn default_student_name() -> String {
    "Student".to_string()
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_width: default_page_width(),
            page_height: default_page_height(),
            margin: default_margin(),
            line_height: default_line_height(),
            header_height: default_header_height(),
        }
    }
}

impl PageLayout {
    pub fn content_width(&self) -> f64 {
        self.page_width - self.margin * 2.0
    }

    /// Lowest y a block may reach before it has to move to a new page.
    pub fn bottom_limit(&self) -> f64 {
        self.page_height - self.margin
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            product_name: default_product_name(),
            format_version: default_format_version(),
            default_student_name: default_student_name(),
            layout: PageLayout::default(),
        }
    }
}

const INLINE_SOURCE: &str = "<inline>";

impl ReportConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::parse(content, Path::new(INLINE_SOURCE))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ReportError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::parse(&content, path)?;
        log::debug!("Loaded report configuration from {}", path.display());
        Ok(config)
    }

    fn parse(content: &str, source: &Path) -> Result<Self> {
        let config: ReportConfig = toml::from_str(content).map_err(|e| ReportError::Config {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?;
        config.check_layout(source)?;
        Ok(config)
    }

    /// Rejects page layouts that leave no printable area.
    pub fn validate(&self) -> Result<()> {
        self.check_layout(Path::new(INLINE_SOURCE))
    }

    fn check_layout(&self, source: &Path) -> Result<()> {
        let layout = &self.layout;
        let values = [
            layout.page_width,
            layout.page_height,
            layout.margin,
            layout.line_height,
            layout.header_height,
        ];
        let usable_height = layout.page_height - layout.margin * 2.0 - layout.header_height;
        let unusable = values.iter().any(|v| !v.is_finite() || *v < 0.0)
            || layout.line_height <= 0.0
            || layout.content_width() <= 0.0
            || usable_height <= layout.line_height;
        if unusable {
            return Err(ReportError::Config {
                path: source.to_path_buf(),
                message: "page layout leaves no room for content".to_string(),
            });
        }
        Ok(())
    }

    /// The display name to use when the caller did not supply one.
    pub fn student_name<'a>(&'a self, name: Option<&'a str>) -> &'a str {
        match name.map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.default_student_name,
        }
    }
}
