/// JSON-RPC server that feeds user events to the session
///
/// This module implements the event loop that:
/// 1. Reads JSON-RPC requests from stdin, one per line
/// 2. Handles each one to completion against the session
/// 3. Sends JSON-RPC responses to stdout

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::render::render_text;
use crate::rpc::protocol::*;
use crate::session::Session;
use crate::state::Action;
use crate::transfer;
use crate::ServerError;

const METHODS: [&str; 5] = ["initialize", "view/get", "action/dispatch", "backup/export", "backup/import"];

fn respond<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string(), None),
    }
}

fn fail(id: Value, error: impl Into<ServerError>) -> JsonRpcResponse {
    let error = error.into();
    debug!("Request failed: {}", error);
    JsonRpcResponse::from_error(id, &error)
}

fn required_params<T: DeserializeOwned>(id: &Value, params: Option<Value>) -> Result<T, JsonRpcResponse> {
    let params = params.ok_or_else(|| {
        JsonRpcResponse::error(id.clone(), error_codes::INVALID_PARAMS, "Missing parameters".to_string(), None)
    })?;
    serde_json::from_value(params).map_err(|e| {
        JsonRpcResponse::error(id.clone(), error_codes::INVALID_PARAMS, format!("Invalid parameters: {}", e), None)
    })
}

fn optional_params<T: DeserializeOwned + Default>(id: &Value, params: Option<Value>) -> Result<T, JsonRpcResponse> {
    match params {
        Some(Value::Null) | None => Ok(T::default()),
        Some(params) => required_params(id, Some(params)),
    }
}

/// Event loop around one board session
pub struct RpcServer {
    session: Session,
}

impl RpcServer {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("Server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    json!(null),
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        Some(self.handle_request(request).await)
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let JsonRpcRequest { id, method, params, .. } = request;

        match method.as_str() {
            "initialize" => self.handle_initialize(id),
            "view/get" => self.handle_view(id, params),
            "action/dispatch" => self.handle_dispatch(id, params),
            "backup/export" => self.handle_export(id, params),
            "backup/import" => self.handle_import(id, params).await,
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", method),
                None,
            ),
        }
    }

    fn handle_initialize(&self, id: Value) -> JsonRpcResponse {
        info!("Client connected");

        let action_schema = match serde_json::to_value(schemars::schema_for!(Action)) {
            Ok(schema) => schema,
            Err(e) => return fail(id, e),
        };

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info: ServerInfo {
                name: "rutin".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                storage: self.session.location(),
            },
            methods: METHODS.to_vec(),
            action_schema,
        };
        respond(id, &result)
    }

    fn handle_view(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: ViewParams = match optional_params(&id, params) {
            Ok(p) => p,
            Err(response) => return response,
        };

        let board = self.session.board();
        match params.format {
            ViewFormat::Json => respond(id, &json!({ "board": board })),
            ViewFormat::Text => respond(id, &json!({ "text": render_text(&board) })),
        }
    }

    fn handle_dispatch(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: DispatchParams = match required_params(&id, params) {
            Ok(p) => p,
            Err(response) => return response,
        };

        match self.session.dispatch(params.action) {
            Ok(outcome) => respond(id, &outcome),
            Err(e) => fail(id, e),
        }
    }

    fn handle_export(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: ExportParams = match optional_params(&id, params) {
            Ok(p) => p,
            Err(response) => return response,
        };

        if self.session.habits().is_empty() {
            return fail(id, transfer::TransferError::EmptyCollection);
        }

        let document = self.session.export_document();
        let path = match params.dir {
            Some(dir) => match self.session.write_backup(&dir) {
                Ok(path) => Some(path),
                Err(e) => return fail(id, e),
            },
            None => None,
        };

        respond(id, &json!({ "document": document, "path": path }))
    }

    async fn handle_import(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: ImportParams = match required_params(&id, params) {
            Ok(p) => p,
            Err(response) => return response,
        };

        let habits = match (params.path, params.document) {
            (Some(path), _) => transfer::read_backup(&path).await,
            (None, Some(document)) => transfer::import_from_value(&document),
            (None, None) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Provide either a path or a document".to_string(),
                    None,
                )
            }
        };

        match habits {
            Ok(habits) => respond(id, &self.session.stage_import(habits)),
            Err(e) => fail(id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonFileStorage;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn server(dir: &std::path::Path) -> RpcServer {
        let storage = JsonFileStorage::new(dir).unwrap();
        RpcServer::new(Session::with_rng(Box::new(storage), StdRng::seed_from_u64(1)).unwrap())
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());

        let response = server
            .process_line(r#"{"jsonrpc": "2.0", "id": 1, "method": "habits/list"}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_blank_line_is_ignored_and_garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());

        assert!(server.process_line("   \n").await.is_none());
        let response = server.process_line("{oops").await.unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_initialize_lists_methods() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());

        let response = server
            .process_line(r#"{"jsonrpc": "2.0", "id": 1, "method": "initialize"}"#)
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "rutin");
        assert_eq!(result["methods"].as_array().unwrap().len(), 5);
        assert!(result["actionSchema"].is_object());
    }

    #[tokio::test]
    async fn test_dispatch_error_maps_to_code() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());

        let response = server
            .process_line(
                r#"{"jsonrpc": "2.0", "id": 2, "method": "action/dispatch",
                    "params": {"action": {"type": "selectAll"}}}"#,
            )
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::VALIDATION_ERROR);
    }
}
