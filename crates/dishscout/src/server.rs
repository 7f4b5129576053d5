//! MCP (Model Context Protocol) server implementation.
//!
//! Exposes dish search over the MCP protocol on stdio, so assistants can ask
//! for restaurant recommendations against the dataset loaded at startup.
//!
//! The server is a presentation layer: each `#[tool]` method delegates to
//! [`dishscout_core::run_search`] or reads the load report, and converts
//! errors to `McpError`.

use std::sync::Arc;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

use dishscout_core::{Dataset, LoadReport, SearchDefaults, SearchRequest, run_search};

/// Parameters for the `get_info` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetInfoParams {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "text".to_string()
}

/// Parameters for the `dataset_stats` tool.
#[derive(Debug, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct DatasetStatsParams {}

/// MCP server answering dish searches from a shared, read-only dataset.
#[derive(Clone)]
pub struct DishServer {
    dataset: Arc<Dataset>,
    report: Arc<LoadReport>,
    defaults: SearchDefaults,
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
}

#[tool_router]
impl DishServer {
    /// Create a server over an already-loaded dataset.
    pub fn new(dataset: Arc<Dataset>, report: LoadReport, defaults: SearchDefaults) -> Self {
        Self {
            dataset,
            report: Arc::new(report),
            defaults,
            tool_router: Self::tool_router(),
        }
    }

    /// Get project information.
    #[tool(description = "Get project name, version, and description")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn get_info(
        &self,
        Parameters(params): Parameters<GetInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "get_info", format = %params.format, "executing MCP tool");

        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "businesses": self.dataset.catalog().len(),
            "reviews": self.dataset.corpus().len(),
        });

        let text = if params.format == "json" {
            serde_json::to_string_pretty(&info)
                .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?
        } else {
            format!(
                "{} v{}\n{}\n{} businesses, {} reviews loaded",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION"),
                self.dataset.catalog().len(),
                self.dataset.corpus().len(),
            )
        };

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Rank restaurants for a dish.
    #[tool(
        description = "Recommend restaurants for a dish. Ranks open restaurants by how often reviewers mention the dish, weighted by star rating. Optional thresholds: min_mentions, min_reviews, num_display (max 500). Set view to \"map\" to include map markers."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server", dish = %params.dish))]
    fn recommend_dish(
        &self,
        Parameters(params): Parameters<SearchRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "recommend_dish", view = ?params.view, "executing MCP tool");

        let outcome = run_search(&self.dataset, &params, &self.defaults)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let json = serde_json::to_string_pretty(&outcome)
            .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?;

        tracing::info!(
            tool = "recommend_dish",
            results = outcome.recommendations.len(),
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Report what the loaders kept and skipped.
    #[tool(description = "Report dataset load counters: lines read, malformed lines, filtered records, and records kept.")]
    #[tracing::instrument(skip(self, _params), fields(otel.kind = "server"))]
    fn dataset_stats(
        &self,
        Parameters(_params): Parameters<DatasetStatsParams>,
    ) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(self.report.as_ref())
            .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for DishServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "{} MCP server. Use recommend_dish to find restaurants known for a dish.",
                env!("CARGO_PKG_NAME"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;

    fn server() -> DishServer {
        let businesses = [
            r#"{"business_id":"tt","name":"Taco Town","address":"1 Main St","city":"Phoenix","state":"AZ","postal_code":"85001","latitude":33.45,"longitude":-112.07,"open":true}"#,
            r#"{"business_id":"bb","name":"Burrito Barn","latitude":33.5,"longitude":-112.1,"open":true}"#,
        ]
        .join("\n");
        let reviews = [
            r#"{"business_id":"tt","stars":5,"text":"Tacos! The tacos here are the best tacos."}"#,
            r#"{"business_id":"tt","stars":2,"text":"tacos were cold"}"#,
            r#"{"business_id":"bb","stars":4,"text":"one good taco"}"#,
        ]
        .join("\n");
        let (dataset, report) = Dataset::from_readers(businesses.as_bytes(), reviews.as_bytes());
        let defaults = SearchDefaults {
            min_mentions: 1,
            min_reviews: 1,
            ..SearchDefaults::default()
        };
        DishServer::new(Arc::new(dataset), report, defaults)
    }

    /// Extract text from the first content item in a `CallToolResult`.
    fn extract_text(result: &CallToolResult) -> Option<&str> {
        result.content.first().and_then(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
    }

    fn request(dish: &str) -> SearchRequest {
        SearchRequest {
            dish: dish.to_string(),
            ..SearchRequest::default()
        }
    }

    #[test]
    fn server_info_has_correct_name() {
        let info = ServerHandler::get_info(&server());

        assert_eq!(info.server_info.name, env!("CARGO_PKG_NAME"));
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn get_info_tool_returns_json_when_requested() {
        let params = Parameters(GetInfoParams {
            format: "json".to_string(),
        });

        let result = server().get_info(params).expect("get_info should succeed");
        let text = extract_text(&result).expect("should have text content");
        let json: serde_json::Value = serde_json::from_str(text).expect("valid JSON");

        assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(json["businesses"], 2);
        assert_eq!(json["reviews"], 3);
    }

    #[test]
    fn get_info_tool_returns_text_by_default() {
        let params = Parameters(GetInfoParams {
            format: default_format(),
        });

        let result = server().get_info(params).expect("get_info should succeed");
        let text = extract_text(&result).expect("should have text content");

        assert!(text.contains(env!("CARGO_PKG_VERSION")));
        assert!(text.contains("2 businesses"));
    }

    #[test]
    fn recommend_dish_ranks_results() {
        let result = server()
            .recommend_dish(Parameters(request("Tacos")))
            .expect("recommend_dish should succeed");
        assert!(!result.is_error.unwrap_or(false));

        let text = extract_text(&result).expect("should have text content");
        let json: serde_json::Value = serde_json::from_str(text).expect("valid JSON");
        let first = &json["recommendations"][0];
        assert_eq!(first["name"], "Taco Town");
        assert_eq!(first["mentions"], 4);
        assert_eq!(first["reviews"], 2);
        assert_eq!(first["score"], 17.0);
    }

    #[test]
    fn recommend_dish_rejects_blank_dish() {
        let err = server()
            .recommend_dish(Parameters(request("   ")))
            .unwrap_err();
        assert!(err.message.contains("Please enter a dish name"));
    }

    #[test]
    fn dataset_stats_reports_counts() {
        let result = server()
            .dataset_stats(Parameters(DatasetStatsParams::default()))
            .expect("dataset_stats should succeed");

        let text = extract_text(&result).expect("should have text content");
        let json: serde_json::Value = serde_json::from_str(text).expect("valid JSON");
        assert_eq!(json["businesses"]["loaded"], 2);
        assert_eq!(json["reviews"]["retained"], 3);
    }
}
