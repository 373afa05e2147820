use std::sync::Arc;

use axum::http::request;
use rmcp::{
    ErrorData, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, InitializeRequestParam, InitializeResult,
        ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use tracing::info;

use crate::mcp::{
    http::OuraClient,
    tools::{
        DateRangeRequest, activity,
        heart_rate::{self, DateTimeRangeRequest},
        personal_info, readiness, sleep,
    },
};

fn text(body: String) -> Result<CallToolResult, ErrorData> {
    Ok(CallToolResult::success(vec![Content::text(body)]))
}

#[derive(Clone)]
pub struct OuraMcp {
    client: Arc<OuraClient>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl OuraMcp {
    #[must_use]
    pub fn new(client: Arc<OuraClient>) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    // Thin delegating methods so the `tool_router` macro can register the
    // tools; the work lives in `mcp::tools::*`.

    #[tool(
        description = "Get daily activity data from Oura: activity score, calories, steps, walking distance and time spent at each activity level. Dates are YYYY-MM-DD; defaults to the last 7 days."
    )]
    async fn get_daily_activity(
        &self,
        Parameters(range): Parameters<DateRangeRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        text(activity::get_daily_activity(&self.client, range).await)
    }

    #[tool(
        description = "Get daily sleep data from Oura: sleep score, sleep stage durations, efficiency, restlessness and heart rate. Dates are YYYY-MM-DD; defaults to the last 7 days."
    )]
    async fn get_daily_sleep(
        &self,
        Parameters(range): Parameters<DateRangeRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        text(sleep::get_daily_sleep(&self.client, range).await)
    }

    #[tool(
        description = "Get daily readiness data from Oura: readiness score, temperature deviation and readiness contributors. Dates are YYYY-MM-DD; defaults to the last 7 days."
    )]
    async fn get_daily_readiness(
        &self,
        Parameters(range): Parameters<DateRangeRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        text(readiness::get_daily_readiness(&self.client, range).await)
    }

    #[tool(
        description = "Get heart rate samples from Oura between two ISO 8601 datetimes (defaults to the last 24 hours). At most the first 100 samples are returned."
    )]
    async fn get_heart_rate(
        &self,
        Parameters(range): Parameters<DateTimeRangeRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        text(heart_rate::get_heart_rate(&self.client, range).await)
    }

    #[tool(
        description = "Get personal information from Oura: age, weight, height, biological sex and email."
    )]
    async fn get_personal_info(&self) -> Result<CallToolResult, ErrorData> {
        text(personal_info::get_personal_info(&self.client).await)
    }
}

#[tool_handler]
impl ServerHandler for OuraMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Oura MCP Server with tools for daily activity, sleep, readiness, heart rate and personal info"
                    .to_string(),
            ),
        }
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, ErrorData> {
        if let Some(http_request_part) = context.extensions.get::<request::Parts>() {
            let initialize_uri = &http_request_part.uri;
            info!(%initialize_uri, "initialize from http server");
        }
        Ok(self.get_info())
    }
}
