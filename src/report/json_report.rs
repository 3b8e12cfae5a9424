use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ReportContext;
use crate::error::Result;
use crate::model::AnalyticsSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub student_name: String,
    pub version: String,
}

/// `{ metadata, data }` wrapper written by JSON exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEnvelope<T = AnalyticsSnapshot> {
    pub metadata: ReportMetadata,
    pub data: T,
}

impl ReportEnvelope {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

pub fn render(snapshot: &AnalyticsSnapshot, ctx: &ReportContext<'_>) -> Result<String> {
    let envelope = ReportEnvelope {
        metadata: ReportMetadata {
            generated_at: ctx.generated_at,
            student_name: ctx.student_name.to_string(),
            version: ctx.config.format_version.clone(),
        },
        data: snapshot,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}
