//! Tool for retrieving the Oura account's personal profile.

use crate::mcp::{
    http::OuraClient,
    tools::{Field, render_record},
};

const ENDPOINT: &str = "personal_info";

const PROFILE_TEMPLATE: &[Field] = &[
    Field::new("Age", "/age", ""),
    Field::new("Weight", "/weight", " kg"),
    Field::new("Height", "/height", " cm"),
    Field::new("Biological Sex", "/biological_sex", ""),
    Field::new("Email", "/email", ""),
];

/// The profile is a single object, so there is nothing to iterate or
/// separate; any missing field renders as `N/A`.
pub async fn get_personal_info(client: &OuraClient) -> String {
    match client.fetch(ENDPOINT, &[]).await {
        Ok(profile) => render_record(&profile, PROFILE_TEMPLATE),
        Err(err) => format!("Unable to fetch personal info: {err}"),
    }
}
