//! Tool for retrieving daily sleep summaries from Oura.

use crate::mcp::{
    http::OuraClient,
    tools::{DailyReport, DateRangeRequest, Field, daily_report},
};

const SLEEP_TEMPLATE: &[Field] = &[
    Field::new("Date", "/day", ""),
    Field::new("Sleep Score", "/score", ""),
    Field::new("Total Sleep Duration", "/total_sleep_duration", " seconds"),
    Field::new("REM Sleep Duration", "/rem_sleep_duration", " seconds"),
    Field::new("Deep Sleep Duration", "/deep_sleep_duration", " seconds"),
    Field::new("Light Sleep Duration", "/light_sleep_duration", " seconds"),
    Field::new("Awake Time", "/awake_time", " seconds"),
    Field::new("Sleep Efficiency", "/efficiency", "%"),
    Field::new("Restlessness", "/restless_periods", ""),
    Field::new("Average Heart Rate", "/average_heart_rate", " bpm"),
    Field::new("Lowest Heart Rate", "/lowest_heart_rate", " bpm"),
];

pub const DAILY_SLEEP: DailyReport = DailyReport {
    endpoint: "daily_sleep",
    subject: "sleep data",
    template: SLEEP_TEMPLATE,
};

pub async fn get_daily_sleep(client: &OuraClient, range: DateRangeRequest) -> String {
    daily_report(client, &DAILY_SLEEP, range).await
}
