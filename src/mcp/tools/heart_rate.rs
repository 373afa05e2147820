//! Tool for retrieving heart rate samples from Oura.
//!
//! Unlike the daily reports, an omitted bound is not filled in locally; the
//! API applies its own default window. Samples render one per line and only
//! the first `MAX_SAMPLES` are shown.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::mcp::{
    http::OuraClient,
    tools::{Field, field, records},
};

pub const MAX_SAMPLES: usize = 100;

const ENDPOINT: &str = "heartrate";

const SAMPLE_TEMPLATE: &[Field] = &[
    Field::new("Time", "/timestamp", ""),
    Field::new("BPM", "/bpm", ""),
    Field::new("Source", "/source", ""),
];

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct DateTimeRangeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Start datetime in ISO 8601 format (defaults to 24 hours ago)")]
    pub start_datetime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "End datetime in ISO 8601 format (defaults to now)")]
    pub end_datetime: Option<String>,
}

impl DateTimeRangeRequest {
    fn into_query(self) -> Vec<(&'static str, String)> {
        [
            ("start_datetime", self.start_datetime),
            ("end_datetime", self.end_datetime),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
        .collect()
    }
}

fn render_sample(sample: &serde_json::Value) -> String {
    SAMPLE_TEMPLATE
        .iter()
        .map(|f| format!("{}: {}", f.label, field(sample, f.pointer)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn get_heart_rate(client: &OuraClient, range: DateTimeRangeRequest) -> String {
    let response = match client.fetch(ENDPOINT, &range.into_query()).await {
        Ok(response) => response,
        Err(err) => return format!("Unable to fetch heart rate data: {err}"),
    };

    let Some(samples) = records(&response) else {
        return "No heart rate data found for the specified time range.".to_string();
    };

    let mut text = samples
        .iter()
        .take(MAX_SAMPLES)
        .map(render_sample)
        .collect::<Vec<_>>()
        .join("\n");

    if samples.len() > MAX_SAMPLES {
        text.push_str(&format!(
            "\n\n(Showing first {MAX_SAMPLES} of {} records)",
            samples.len()
        ));
    }

    text
}
