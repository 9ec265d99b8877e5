//! Core MCP server implementation.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde_json::Value;
use tracing::{error, info, warn};

use super::tools::check::CheckInput;
use super::tools::hosted::{self, LatexUrlInput};
use super::tools::render::{self, RenderLatexInput};
use super::tools::solution::{self, RenderSolutionInput};
use super::tools::{failure_envelope, ImageOutput, OutputMode};
use crate::check::check_latex;
use crate::config::{Endpoint, LatexConfig};

/// Route the streamable HTTP service is mounted on
pub const MCP_PATH: &str = "/mcp";

/// The latex-mcp server
///
/// Exposes LaTeX rendering as MCP tools. Every call is independent; failures
/// come back as error results carrying a JSON envelope.
#[derive(Debug, Clone)]
pub struct LatexMcpServer {
    tool_router: ToolRouter<Self>,
    config: Arc<LatexConfig>,
}

impl Default for LatexMcpServer {
    fn default() -> Self {
        Self::new(LatexConfig::default())
    }
}

#[tool_router]
impl LatexMcpServer {
    pub fn new(config: LatexConfig) -> Self {
        Self::shared(Arc::new(config))
    }

    /// Build a server over a config shared with other sessions
    pub fn shared(config: Arc<LatexConfig>) -> Self {
        Self { tool_router: Self::tool_router(), config }
    }

    #[tool(
        description = "Render a LaTeX math expression into a PNG image and return it as a base64 data URI. \
                       Use it whenever you solve a math problem and want to present the answer or working \
                       as a clean, readable image. Supports single expressions ($E = mc^2$), display math \
                       ($$\\int_0^\\infty e^{-x} dx = 1$$), multi-line solutions separated by newlines, \
                       greek letters, fractions, roots, integrals and sums."
    )]
    async fn render_latex(
        &self,
        Parameters(input): Parameters<RenderLatexInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(match render::run_render(&input, &self.config) {
            Ok(output) => {
                let envelope = output.envelope(&render::success_message(&output));
                image_result(&output, envelope, input.output)
            }
            Err(e) => {
                error!(error = %e, "render failed");
                failure_result(failure_envelope(&render::failure_message(&e)))
            }
        })
    }

    #[tool(
        description = "Render a complete multi-step math solution as a single stacked PNG image. \
                       Each step gets its own labeled row; the final step is highlighted as the answer. \
                       Example steps: [{\"label\": \"Problem\", \"latex\": \"Solve: x^2 - 5x + 6 = 0\"}, \
                       {\"label\": \"Factor\", \"latex\": \"(x-2)(x-3) = 0\"}, \
                       {\"label\": \"Answer\", \"latex\": \"x = 2 \\\\text{ or } x = 3\"}]"
    )]
    async fn render_solution(
        &self,
        Parameters(input): Parameters<RenderSolutionInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(match solution::run_solution(&input, &self.config) {
            Ok(output) => {
                let envelope = solution::envelope(&output, input.steps.len());
                image_result(&output, envelope, input.output)
            }
            Err(e) => {
                error!(error = %e, "solution render failed");
                failure_result(solution::failure_envelope(&e))
            }
        })
    }

    #[tool(
        description = "Validate LaTeX syntax with a dry-run render. Use it before render_latex when unsure \
                       whether an expression is valid. Returns valid, warnings, errors and an optional \
                       suggested fix."
    )]
    async fn check_latex_syntax(
        &self,
        Parameters(input): Parameters<CheckInput>,
    ) -> Result<CallToolResult, McpError> {
        let report = check_latex(&input.latex, self.config.limits.max_latex_length);
        if !report.valid {
            warn!(errors = report.errors.len(), "LaTeX check found errors");
        }
        let json = serde_json::to_string(&report).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(
        description = "Build a URL to a hosted LaTeX renderer for the expression, for clients that prefer \
                       a link over inline image data. The server does not fetch the URL."
    )]
    async fn latex_url(
        &self,
        Parameters(input): Parameters<LatexUrlInput>,
    ) -> Result<CallToolResult, McpError> {
        let result = hosted::run_url(&input, &self.config);
        let envelope = hosted::envelope(&result);
        Ok(match result {
            Ok(_) => CallToolResult::success(vec![Content::text(envelope.to_string())]),
            Err(e) => {
                warn!(error = %e, "latex_url failed");
                failure_result(envelope)
            }
        })
    }
}

fn image_result(output: &ImageOutput, envelope: Value, mode: OutputMode) -> CallToolResult {
    let content = match mode {
        OutputMode::Json => vec![Content::text(envelope.to_string())],
        OutputMode::Image => {
            let summary = envelope["message"].as_str().unwrap_or_default().to_string();
            vec![Content::image(output.base64(), "image/png"), Content::text(summary)]
        }
        OutputMode::Both => vec![
            Content::image(output.base64(), "image/png"),
            Content::text(envelope.to_string()),
        ],
    };
    CallToolResult::success(content)
}

fn failure_result(envelope: Value) -> CallToolResult {
    CallToolResult::error(vec![Content::text(envelope.to_string())])
}

#[tool_handler]
impl ServerHandler for LatexMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "latex-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Use render_latex to convert any LaTeX expression or full math solution \
                 into a PNG image. The tool returns a base64 PNG you can attach to messages. \
                 Always wrap math in proper LaTeX delimiters: $...$ for inline, $$...$$ for display."
                    .into(),
            ),
        }
    }
}

/// Run the MCP server on the resolved endpoint until the client or a
/// ctrl-c stops it
pub async fn run_server(config: LatexConfig, endpoint: Endpoint) -> Result<(), Box<dyn std::error::Error>> {
    match endpoint {
        Endpoint::Stdio => serve_stdio(config).await?,
        Endpoint::StreamableHttp { host, port } => serve_http(config, &host, port).await?,
    }
    info!("latex-mcp server stopped");
    Ok(())
}

async fn serve_stdio(config: LatexConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(transport = "stdio", "starting latex-mcp server");
    let service = LatexMcpServer::new(config).serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;
    Ok(())
}

async fn serve_http(config: LatexConfig, host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(config);
    let http_config = StreamableHttpServerConfig::default();
    let shutdown = http_config.cancellation_token.clone();

    let service = StreamableHttpService::new(
        move || Ok(LatexMcpServer::shared(Arc::clone(&config))),
        Arc::new(LocalSessionManager::default()),
        http_config,
    );
    let router = axum::Router::new().nest_service(MCP_PATH, service);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!(
        transport = "streamable-http",
        addr = %listener.local_addr()?,
        path = MCP_PATH,
        "starting latex-mcp server"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            shutdown.cancel();
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use serde_json::json;

    fn sample_output() -> ImageOutput {
        let rendered = crate::renderer::Rendered {
            image: RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255])),
            warnings: vec![],
        };
        ImageOutput::encode(rendered).unwrap()
    }

    #[test]
    fn test_json_mode_is_single_text_block() {
        let output = sample_output();
        let result = image_result(&output, output.envelope("ok"), OutputMode::Json);
        assert_eq!(result.content.len(), 1);
        assert_eq!(result.is_error, Some(false));
    }

    #[test]
    fn test_image_modes_include_image_content() {
        let output = sample_output();
        let image = image_result(&output, output.envelope("ok"), OutputMode::Image);
        let both = image_result(&output, output.envelope("ok"), OutputMode::Both);
        assert_eq!(image.content.len(), 2);
        assert_eq!(both.content.len(), 2);
        assert_eq!(image.is_error, Some(false));
    }

    #[test]
    fn test_failure_result_is_error() {
        let result = failure_result(json!({ "success": false }));
        assert_eq!(result.is_error, Some(true));
    }

    #[test]
    fn test_server_info() {
        let info = LatexMcpServer::default().get_info();
        assert_eq!(info.server_info.name, "latex-mcp");
        assert!(info.instructions.unwrap().contains("render_latex"));
    }
}
