//! Tool for retrieving daily readiness from Oura.
//!
//! Besides the readiness score and temperature deviations, each day lists
//! the contributor scores nested under `contributors`. A record without a
//! `contributors` object renders all of them as `N/A`.

use crate::mcp::{
    http::OuraClient,
    tools::{DailyReport, DateRangeRequest, Field, daily_report},
};

const READINESS_TEMPLATE: &[Field] = &[
    Field::new("Date", "/day", ""),
    Field::new("Readiness Score", "/score", ""),
    Field::new("Temperature Deviation", "/temperature_deviation", "°C"),
    Field::new("Temperature Trend Deviation", "/temperature_trend_deviation", "°C"),
    Field::new("Activity Balance", "/contributors/activity_balance", ""),
    Field::new("Body Temperature", "/contributors/body_temperature", ""),
    Field::new("HRV Balance", "/contributors/hrv_balance", ""),
    Field::new("Previous Day Activity", "/contributors/previous_day_activity", ""),
    Field::new("Previous Night", "/contributors/previous_night", ""),
    Field::new("Recovery Index", "/contributors/recovery_index", ""),
    Field::new("Resting Heart Rate", "/contributors/resting_heart_rate", ""),
    Field::new("Sleep Balance", "/contributors/sleep_balance", ""),
];

pub const DAILY_READINESS: DailyReport = DailyReport {
    endpoint: "daily_readiness",
    subject: "readiness data",
    template: READINESS_TEMPLATE,
};

pub async fn get_daily_readiness(client: &OuraClient, range: DateRangeRequest) -> String {
    daily_report(client, &DAILY_READINESS, range).await
}
