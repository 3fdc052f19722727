/// Shared data structures for the application state
///
/// These structs mirror the backend's JSON payloads and flow
/// from the API client into the gallery and the UI layer.
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Keys that are rendered in the fixed part of the detail panel
pub const FIXED_FIELDS: [&str; 5] =
    ["id", "prompt", "negative-prompt", "checkpoint", "creation-time"];

/// Represents a single generated image as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Backend identifier (a path relative to the indexed directory)
    pub id: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(rename = "negative-prompt", default)]
    pub negative_prompt: String,
    /// Model checkpoint used to generate the image
    #[serde(default)]
    pub checkpoint: String,
    #[serde(rename = "creation-time", default)]
    pub creation_time: Option<DateTime<Utc>>,
    /// Every other generation parameter (steps, sampler, seed, pixel count...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ImageInfo {
    /// Additional key/value pairs outside the fixed set, rendered as text
    pub fn extra_fields(&self) -> Vec<(String, String)> {
        self.extra
            .iter()
            .filter(|(key, _)| !FIXED_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), display_value(value)))
            .collect()
    }

    /// Creation time converted to the given time zone, empty when unknown
    pub fn creation_time_in<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        match &self.creation_time {
            Some(time) => time
                .with_timezone(tz)
                .format("%Y-%m-%d %H:%M:%S %:z")
                .to_string(),
            None => String::new(),
        }
    }
}

/// Strings are shown without quotes, everything else as compact JSON
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Pagination metadata for the current query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub total_pages: Option<u32>,
    pub total_items: Option<u64>,
    pub current_page: Option<u32>,
}

/// Response body of the image-listing endpoint
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageList {
    /// Absent means "keep what is displayed", not "no results"
    pub items: Option<Vec<ImageInfo>>,
    pub metadata: Option<Metadata>,
}
