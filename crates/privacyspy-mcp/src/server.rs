use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::{info, warn};

use privacyspy_common::api::{ErrorCode, SourceParams, SpyResponse};
use privacyspy_common::pipeline::{AnalysisRequest, OutputFormat, PolicyAnalyzer};

#[derive(Clone)]
pub struct PrivacySpyServer {
    analyzer: Arc<PolicyAnalyzer>,
    tool_router: ToolRouter<PrivacySpyServer>,
}

impl PrivacySpyServer {
    pub fn new(analyzer: Arc<PolicyAnalyzer>) -> Self {
        Self {
            analyzer,
            tool_router: Self::tool_router(),
        }
    }

    async fn run(
        &self,
        tool: &str,
        params: SourceParams,
        format: OutputFormat,
    ) -> Result<Json<SpyResponse>, String> {
        let source = params
            .into_source()
            .map_err(|e| tool_error(tool, e.code(), &e))?;
        let kind = source.kind();

        let analysis = self
            .analyzer
            .analyze(AnalysisRequest { source, format })
            .await
            .map_err(|e| tool_error(tool, e.code(), &e))?;

        info!(tool, source = kind, "policy tool served");
        Ok(Json(SpyResponse::success(analysis)))
    }
}

/// Tool errors carry the envelope code in front of the message.
fn tool_error(tool: &str, code: ErrorCode, message: &dyn std::fmt::Display) -> String {
    warn!(tool, code = code.as_u8(), error = %message, "policy tool failed");
    format!("[{}] {}", code.as_u8(), message)
}

#[tool_router]
impl PrivacySpyServer {
    #[tool(description = "Score every sentence of an English privacy policy by how much it matters to the reader. Provide exactly one of url, html or text. Returns sentences in document order with scores in [0, 1], 1 being the most important sentence.")]
    async fn analyze_policy(
        &self,
        Parameters(params): Parameters<SourceParams>,
    ) -> Result<Json<SpyResponse>, String> {
        self.run("analyze_policy", params, OutputFormat::Sentences)
            .await
    }

    #[tool(description = "Render an English privacy policy as HTML blocks annotated with a data-score attribute holding each block's raw importance score. Provide exactly one of url, html or text.")]
    async fn annotate_policy(
        &self,
        Parameters(params): Parameters<SourceParams>,
    ) -> Result<Json<SpyResponse>, String> {
        self.run("annotate_policy", params, OutputFormat::Markup)
            .await
    }
}

#[tool_handler]
impl ServerHandler for PrivacySpyServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "privacyspy".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "PrivacySpy MCP server. Highlights the sentences of a privacy policy \
                 that matter most to users (data collection, sharing, selling). Use \
                 analyze_policy for per-sentence scores and annotate_policy for scored \
                 markup. Errors are prefixed with a numeric code: 1 no source, \
                 4 extraction failed, 5 not English, 6 invalid input."
                    .to_string(),
            ),
        }
    }
}
