//! Normalized records returned by the load endpoint, and their table cells.
//!
//! Every field is optional. Missing values render as a placeholder, never as
//! an error. Timestamps stay as the backend sent them and are only parsed
//! when a cell is rendered.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Column headers, in cell order.
pub const COLUMNS: [&str; 11] = [
    "ID",
    "Type",
    "Directory",
    "Parent",
    "Parent ID",
    "Name",
    "Created",
    "Modified",
    "URL",
    "MIME Type",
    "Visibility",
];

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of integration data in the common schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    #[serde(default)]
    pub id: Option<String>,
    /// Category tag, e.g. "Contact" or "Table".
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,
    #[serde(rename = "directory", alias = "isDirectory", default)]
    pub is_directory: Option<bool>,
    #[serde(alias = "parentPathOrName", default)]
    pub parent_path_or_name: Option<String>,
    #[serde(alias = "parentId", default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "creationTime", default)]
    pub creation_time: Option<String>,
    #[serde(alias = "lastModifiedTime", default)]
    pub last_modified_time: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(alias = "mimeType", default)]
    pub mime_type: Option<String>,
    #[serde(rename = "visibility", alias = "isVisible", default)]
    pub is_visible: Option<bool>,
}

impl NormalizedRecord {
    /// Display cells in [`COLUMNS`] order.
    pub fn cells(&self, placeholder: &str) -> [String; 11] {
        let text = |value: &Option<String>| match value.as_deref() {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => placeholder.to_string(),
        };

        [
            text(&self.id),
            match self.item_type.as_deref() {
                Some(t) if !t.is_empty() => t.to_string(),
                _ => "Unknown".to_string(),
            },
            flag(self.is_directory, "Yes", "No", placeholder),
            text(&self.parent_path_or_name),
            text(&self.parent_id),
            text(&self.name),
            format_timestamp(self.creation_time.as_deref(), placeholder),
            format_timestamp(self.last_modified_time.as_deref(), placeholder),
            text(&self.url),
            text(&self.mime_type),
            flag(self.is_visible, "Visible", "Hidden", placeholder),
        ]
    }
}

fn flag(value: Option<bool>, yes: &str, no: &str, placeholder: &str) -> String {
    match value {
        Some(true) => yes.to_string(),
        Some(false) => no.to_string(),
        None => placeholder.to_string(),
    }
}

/// Render an ISO-8601 timestamp in local time.
///
/// Zoned timestamps are converted to the local zone; naive ones are taken as
/// already local. Anything unparsable is shown as-is.
pub fn format_timestamp(raw: Option<&str>, placeholder: &str) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return placeholder.to_string();
    };

    if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
        return zoned.with_timezone(&Local).format(DISPLAY_FORMAT).to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format(DISPLAY_FORMAT).to_string();
    }
    raw.to_string()
}
