//! MCP tools for reading Oura ring data.
//!
//! Each module implements one data category:
//! - `activity`: daily activity summaries
//! - `sleep`: daily sleep summaries
//! - `readiness`: daily readiness and its contributors
//! - `heart_rate`: heart rate samples
//! - `personal_info`: the account's personal profile
//!
//! Every tool answers with plain text, including on failure. The helpers
//! here cover date defaults, optional field access and record rendering.

pub mod activity;
pub mod heart_rate;
pub mod personal_info;
pub mod readiness;
pub mod sleep;

use chrono::{Days, Local, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mcp::http::OuraClient;

/// Placeholder rendered for any field the API did not return.
pub const NOT_AVAILABLE: &str = "N/A";

pub const RECORD_SEPARATOR: &str = "\n\n---\n\n";

/// Days looked back when a daily report has no start date.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct DateRangeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Start date in YYYY-MM-DD format (defaults to 7 days ago)")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "End date in YYYY-MM-DD format (defaults to today)")]
    pub end_date: Option<String>,
}

impl DateRangeRequest {
    /// Resolves the range into `start_date`/`end_date` query parameters,
    /// falling back to the last seven days.
    #[must_use]
    pub fn into_query(self) -> Vec<(&'static str, String)> {
        vec![
            (
                "start_date",
                present(self.start_date).unwrap_or_else(|| default_date(DEFAULT_LOOKBACK_DAYS)),
            ),
            ("end_date", present(self.end_date).unwrap_or_else(|| default_date(0))),
        ]
    }
}

/// Treats an empty string parameter the same as an omitted one.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Today's local date minus `days_ago`, formatted `YYYY-MM-DD`. Clamps to the
/// earliest representable date instead of overflowing.
#[must_use]
pub fn default_date(days_ago: u32) -> String {
    Local::now()
        .date_naive()
        .checked_sub_days(Days::new(u64::from(days_ago)))
        .unwrap_or(NaiveDate::MIN)
        .format("%Y-%m-%d")
        .to_string()
}

/// One `Label: value` line of a record template. `pointer` is a JSON pointer
/// into the record, so nested fields like `/contributors/hrv_balance` work
/// the same as top level ones.
pub struct Field {
    pub label: &'static str,
    pub pointer: &'static str,
    pub unit: &'static str,
}

impl Field {
    #[must_use]
    pub const fn new(label: &'static str, pointer: &'static str, unit: &'static str) -> Self {
        Self { label, pointer, unit }
    }
}

/// Reads a field, rendering absent or null values as `N/A`.
#[must_use]
pub fn field(record: &Value, pointer: &str) -> String {
    match record.pointer(pointer) {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[must_use]
pub fn render_record(record: &Value, template: &[Field]) -> String {
    template
        .iter()
        .map(|f| format!("{}: {}{}", f.label, field(record, f.pointer), f.unit))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// The non-empty `data` list of a collection response. Any other shape
/// counts as no data.
#[must_use]
pub fn records(response: &Value) -> Option<&[Value]> {
    response["data"]
        .as_array()
        .map(Vec::as_slice)
        .filter(|items| !items.is_empty())
}

/// A daily collection endpoint and how to render it.
pub struct DailyReport {
    pub endpoint: &'static str,
    /// Used in messages, e.g. "activity data".
    pub subject: &'static str,
    pub template: &'static [Field],
}

/// Fetches a date-ranged daily collection and renders each record.
pub async fn daily_report(
    client: &OuraClient,
    report: &DailyReport,
    range: DateRangeRequest,
) -> String {
    let response = match client.fetch(report.endpoint, &range.into_query()).await {
        Ok(response) => response,
        Err(err) => return format!("Unable to fetch {}: {err}", report.subject),
    };

    records(&response).map_or_else(
        || format!("No {} found for the specified date range.", report.subject),
        |items| {
            items
                .iter()
                .map(|item| render_record(item, report.template))
                .collect::<Vec<_>>()
                .join(RECORD_SEPARATOR)
        },
    )
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn default_date_counts_back_from_today() {
        let today = Local::now().date_naive();
        assert_eq!(default_date(0), today.format("%Y-%m-%d").to_string());
        assert_eq!(
            default_date(7),
            (today - Duration::days(7)).format("%Y-%m-%d").to_string()
        );
    }

    #[test]
    fn default_date_clamps_far_past() {
        assert_eq!(default_date(u32::MAX), NaiveDate::MIN.format("%Y-%m-%d").to_string());
    }

    #[test]
    fn field_substitutes_placeholder() {
        let record = json!({
            "day": "2024-01-01",
            "score": 85,
            "note": null,
            "nested": { "x": 1.5 }
        });
        assert_eq!(field(&record, "/day"), "2024-01-01");
        assert_eq!(field(&record, "/score"), "85");
        assert_eq!(field(&record, "/note"), "N/A");
        assert_eq!(field(&record, "/missing"), "N/A");
        assert_eq!(field(&record, "/nested/x"), "1.5");
        assert_eq!(field(&record, "/absent/x"), "N/A");
    }

    #[test]
    fn records_rejects_unexpected_shapes() {
        assert!(records(&json!({ "data": [] })).is_none());
        assert!(records(&json!({ "data": "nope" })).is_none());
        assert!(records(&json!({ "next_token": null })).is_none());
        assert!(records(&json!([1, 2, 3])).is_none());
        assert_eq!(records(&json!({ "data": [{}] })).map(<[Value]>::len), Some(1));
    }

    #[test]
    fn explicit_range_is_passed_through() {
        let range = DateRangeRequest {
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-31".into()),
        };
        assert_eq!(
            range.into_query(),
            vec![
                ("start_date", "2024-01-01".to_string()),
                ("end_date", "2024-01-31".to_string())
            ]
        );
    }

    #[test]
    fn blank_range_falls_back_to_last_week() {
        let range = DateRangeRequest {
            start_date: Some(String::new()),
            end_date: None,
        };
        assert_eq!(
            range.into_query(),
            vec![("start_date", default_date(7)), ("end_date", default_date(0))]
        );
    }
}
