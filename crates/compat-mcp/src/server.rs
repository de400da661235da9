//! MCP request dispatch
//!
//! [`McpServer`] is built from an explicit [`AppConfig`]; it holds no global
//! state. Requests are answered one at a time in arrival order.

use compat_config::{AppConfig, ServerSettings};
use compat_core::{CompatError, Result};
use compat_engine::CompatEngine;
use compat_tools::{CheckCompatTool, ToolRegistry};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::resource::CompatResource;
use crate::transport::ServerTransport;
use crate::types::{
    InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ListResourceTemplatesResult, ListResourcesResult, ListToolsResult, McpTool,
    ReadResourceParams, ResourcesCapability, ServerCapabilities, ServerInfo, ToolCallParams,
    ToolCallResult, ToolsCapability,
};

type DispatchResult = std::result::Result<Value, JsonRpcError>;

pub struct McpServer {
    settings: ServerSettings,
    engine: Arc<CompatEngine>,
    tools: ToolRegistry,
    resource: CompatResource,
}

impl McpServer {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let engine = Arc::new(config.engine()?);

        let mut tools = ToolRegistry::new();
        tools.register(CheckCompatTool::new(engine.clone(), config.tool.clone()))?;

        let resource = CompatResource::new(engine.clone(), config.resource.clone())?;

        Ok(Self {
            settings: config.server.clone(),
            engine,
            tools,
            resource,
        })
    }

    pub fn engine(&self) -> &CompatEngine {
        &self.engine
    }

    pub fn resource(&self) -> &CompatResource {
        &self.resource
    }

    /// Serve until the client closes the stream.
    pub async fn run(&self, transport: &mut dyn ServerTransport) -> Result<()> {
        self.run_until(transport, std::future::pending()).await
    }

    /// Serve until the client closes the stream or `shutdown` resolves.
    pub async fn run_until<F>(&self, transport: &mut dyn ServerTransport, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!(
            "MCP server '{}' v{} listening",
            self.settings.name, self.settings.version
        );
        tokio::pin!(shutdown);

        loop {
            let message = tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                message = transport.read_message() => message?,
            };

            let Some(message) = message else {
                break;
            };

            if let Some(response) = self.handle_message(&message).await {
                transport.write_message(&response).await?;
            }
        }

        transport.close().await
    }

    /// Handle one raw JSON-RPC message, returning the serialized response if
    /// one is owed.
    pub async fn handle_message(&self, message: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(message) {
            Err(e) => {
                warn!("Discarding unparsable message: {}", e);
                Some(JsonRpcResponse::failure(
                    Value::Null,
                    JsonRpcError::parse_error(format!("Parse error: {}", e)),
                ))
            }
            Ok(value) => self.handle_value(value).await,
        }?;

        match serde_json::to_string(&response) {
            Ok(json) => Some(json),
            Err(e) => {
                error!("Failed to serialize response: {}", e);
                None
            }
        }
    }

    async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        let id = value.get("id").cloned().unwrap_or(Value::Null);

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    id,
                    JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                ));
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::failure(
                id,
                JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
            ));
        }

        self.handle_request(request).await
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            self.handle_notification(&request);
            return None;
        };

        debug!("Handling request {} ({})", id, request.method);
        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => {
                warn!("Request {} failed: {}", request.method, error.message);
                JsonRpcResponse::failure(id, error)
            }
        };
        Some(response)
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => info!("Client finished initialization"),
            "notifications/cancelled" => debug!("Ignoring cancellation; requests complete synchronously"),
            other => debug!("Ignoring notification: {}", other),
        }
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> DispatchResult {
        match method {
            "initialize" => self.initialize(params),
            "ping" => Ok(json!({})),
            "tools/list" => self.list_tools(),
            "tools/call" => self.call_tool(params).await,
            "resources/list" => to_value(ListResourcesResult { resources: Vec::new() }),
            "resources/templates/list" => to_value(ListResourceTemplatesResult {
                resource_templates: vec![self.resource.info()],
            }),
            "resources/read" => self.read_resource(params),
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    fn initialize(&self, params: Option<Value>) -> DispatchResult {
        let params: InitializeParams = match params {
            Some(value) => parse_params(value)?,
            None => InitializeParams::default(),
        };

        if let Some(client) = &params.client_info {
            info!("Client connected: {} {}", client.name, client.version);
        }
        if let Some(requested) = &params.protocol_version {
            if requested != &self.settings.protocol_version {
                info!(
                    "Client requested protocol {}, offering {}",
                    requested, self.settings.protocol_version
                );
            }
        }

        to_value(InitializeResult {
            protocol_version: self.settings.protocol_version.clone(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
                resources: Some(ResourcesCapability::default()),
            },
            server_info: ServerInfo {
                name: self.settings.name.clone(),
                version: self.settings.version.clone(),
            },
        })
    }

    fn list_tools(&self) -> DispatchResult {
        let tools = self
            .tools
            .get_all()
            .iter()
            .map(|tool| McpTool {
                name: tool.name().to_string(),
                title: Some(tool.title().to_string()),
                description: tool.description().to_string(),
                input_schema: tool.schema(),
            })
            .collect();
        to_value(ListToolsResult { tools })
    }

    async fn call_tool(&self, params: Option<Value>) -> DispatchResult {
        let params: ToolCallParams = parse_params(require_params(params)?)?;

        let tool = self
            .tools
            .get(&params.name)
            .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name)))?;

        let result = match tool.execute(params.arguments).await {
            Ok(text) => ToolCallResult::text(text),
            Err(CompatError::InvalidParams(message)) => {
                return Err(JsonRpcError::invalid_params(message));
            }
            Err(e) => {
                error!("Tool '{}' failed: {}", params.name, e);
                ToolCallResult::error(e.to_string())
            }
        };
        to_value(result)
    }

    fn read_resource(&self, params: Option<Value>) -> DispatchResult {
        let params: ReadResourceParams = parse_params(require_params(params)?)?;
        let result = self.resource.read(&params.uri).map_err(to_rpc_error)?;
        to_value(result)
    }
}

fn require_params(params: Option<Value>) -> std::result::Result<Value, JsonRpcError> {
    params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))
}

fn parse_params<T: DeserializeOwned>(value: Value) -> std::result::Result<T, JsonRpcError> {
    serde_json::from_value(value)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn to_value<T: Serialize>(value: T) -> DispatchResult {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal(e.to_string()))
}

fn to_rpc_error(err: CompatError) -> JsonRpcError {
    match err {
        CompatError::InvalidParams(message) => JsonRpcError::invalid_params(message),
        other => JsonRpcError::internal(other.to_string()),
    }
}
