/// JSON-RPC message structures for the board session
///
/// A client drives the board by sending one JSON-RPC 2.0 request per line
/// and reading one response per line back.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::BackendError;
use crate::domain::DomainError;
use crate::state::Action;
use crate::storage::StorageError;
use crate::transfer::TransferError;
use crate::ServerError;

/// Version of the request/response contract below
pub const PROTOCOL_VERSION: &str = "1.0";

/// JSON-RPC 2.0 request message
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    #[allow(dead_code)]
    pub jsonrpc: String,
    /// Unique identifier for this request
    #[serde(default)]
    pub id: Value,
    /// The method to call (e.g., "action/dispatch")
    pub method: String,
    /// Parameters for the method call
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response message
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID that we're responding to
    pub id: Value,
    /// Successful result (if no error occurred)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error information (if something went wrong)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error information
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// How `view/get` should draw the board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewParams {
    #[serde(default)]
    pub format: ViewFormat,
}

#[derive(Debug, Deserialize)]
pub struct DispatchParams {
    pub action: Action,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    /// Directory to also write the dated backup file into
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Either a backup file on disk or the document inline
#[derive(Debug, Deserialize)]
pub struct ImportParams {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub document: Option<Value>,
}

/// `initialize` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub server_info: ServerInfo,
    /// Methods this server answers
    pub methods: Vec<&'static str>,
    /// JSON schema of the `action` parameter of `action/dispatch`
    pub action_schema: Value,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    /// Where the board is saved
    pub storage: String,
}

// JSON-RPC error codes
pub mod error_codes {
    /// Parse error - Invalid JSON was received by the server
    pub const PARSE_ERROR: i32 = -32700;
    /// Method not found - The requested method doesn't exist
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid parameters - Method exists but parameters are wrong
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Habit not found - The specified habit ID doesn't exist
    pub const HABIT_NOT_FOUND: i32 = -32001;
    /// Validation error - Input validation failed
    pub const VALIDATION_ERROR: i32 = -32003;
    /// Storage error - Database or file operation failed
    pub const STORAGE_ERROR: i32 = -32004;
    /// Authentication error - Missing, invalid or expired token
    pub const AUTH_ERROR: i32 = -32005;
}

impl JsonRpcResponse {
    /// Create a successful response
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Value, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message, data }),
        }
    }

    /// Create an error response from an application error
    pub fn from_error(id: Value, error: &ServerError) -> Self {
        Self::error(id, error_code(error), error.to_string(), None)
    }
}

pub fn domain_error_to_json_rpc_code(error: &DomainError) -> i32 {
    match error {
        DomainError::HabitNotFound(_) => error_codes::HABIT_NOT_FOUND,
        DomainError::InvalidDate(_) | DomainError::SelectModeRequired { .. } => error_codes::VALIDATION_ERROR,
    }
}

pub fn storage_error_to_json_rpc_code(error: &StorageError) -> i32 {
    match error {
        StorageError::Serialization(_) => error_codes::INTERNAL_ERROR,
        StorageError::Query(_)
        | StorageError::Connection(_)
        | StorageError::Io(_)
        | StorageError::Persist(_)
        | StorageError::Migration(_) => error_codes::STORAGE_ERROR,
    }
}

pub fn transfer_error_to_json_rpc_code(error: &TransferError) -> i32 {
    match error {
        TransferError::Io(_) => error_codes::STORAGE_ERROR,
        TransferError::InvalidJson(_)
        | TransferError::MissingHabits
        | TransferError::InvalidDate { .. }
        | TransferError::EmptyCollection
        | TransferError::UnsupportedFile(_) => error_codes::VALIDATION_ERROR,
    }
}

pub fn backend_error_to_json_rpc_code(error: &BackendError) -> i32 {
    match error {
        BackendError::Validation(_) => error_codes::VALIDATION_ERROR,
        BackendError::Auth(_) => error_codes::AUTH_ERROR,
        BackendError::NotFound(_) => error_codes::HABIT_NOT_FOUND,
        BackendError::Storage(e) => storage_error_to_json_rpc_code(e),
    }
}

/// Map any application error to its JSON-RPC code
pub fn error_code(error: &ServerError) -> i32 {
    match error {
        ServerError::Domain(e) => domain_error_to_json_rpc_code(e),
        ServerError::Storage(e) => storage_error_to_json_rpc_code(e),
        ServerError::Transfer(e) => transfer_error_to_json_rpc_code(e),
        ServerError::Backend(e) => backend_error_to_json_rpc_code(e),
        ServerError::Io(_) => error_codes::STORAGE_ERROR,
        ServerError::Json(_) => error_codes::INTERNAL_ERROR,
    }
}
