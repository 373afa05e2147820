//! Tool for retrieving daily activity summaries from Oura.
//!
//! Each day is rendered with its activity score, calorie burn, step count
//! and the time spent at each activity intensity.

use crate::mcp::{
    http::OuraClient,
    tools::{DailyReport, DateRangeRequest, Field, daily_report},
};

const ACTIVITY_TEMPLATE: &[Field] = &[
    Field::new("Date", "/day", ""),
    Field::new("Activity Score", "/score", ""),
    Field::new("Active Calories", "/active_calories", " kcal"),
    Field::new("Total Calories", "/total_calories", " kcal"),
    Field::new("Steps", "/steps", ""),
    Field::new("Equivalent Walking Distance", "/equivalent_walking_distance", " meters"),
    Field::new("High Activity Time", "/high_activity_time", " seconds"),
    Field::new("Medium Activity Time", "/medium_activity_time", " seconds"),
    Field::new("Low Activity Time", "/low_activity_time", " seconds"),
    Field::new("Sedentary Time", "/sedentary_time", " seconds"),
];

pub const DAILY_ACTIVITY: DailyReport = DailyReport {
    endpoint: "daily_activity",
    subject: "activity data",
    template: ACTIVITY_TEMPLATE,
};

pub async fn get_daily_activity(client: &OuraClient, range: DateRangeRequest) -> String {
    daily_report(client, &DAILY_ACTIVITY, range).await
}
