/// Public library interface for the rutin habit board
///
/// This module exports the board session, its storage media and the
/// JSON-RPC server, plus the error type that ties the layers together.

use std::path::Path;
use thiserror::Error;

pub mod backend;
pub mod domain;
pub mod render;
pub mod rpc;
pub mod session;
pub mod state;
pub mod storage;
pub mod transfer;

// Re-export the types most callers need
pub use backend::{BackendError, HabitBackend, SqliteBackend};
pub use domain::*;
pub use render::{render, render_text, BoardView};
pub use session::{DispatchOutcome, Session};
pub use state::{reduce, Action, Effect, HabitStore};
pub use storage::{HabitStorage, JsonFileStorage, SqliteStorage, StorageError};
pub use transfer::TransferError;

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("{0}")]
    Domain(#[from] domain::DomainError),

    #[error("{0}")]
    Transfer(#[from] transfer::TransferError),

    #[error("Backend error: {0}")]
    Backend(#[from] backend::BackendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which medium the local board is saved in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageKind {
    /// `habits.json` in the data directory
    #[default]
    Json,
    /// `habits.db` in the data directory
    Sqlite,
}

/// Open the chosen storage medium inside `data_dir`
pub fn open_storage(kind: StorageKind, data_dir: &Path) -> Result<Box<dyn HabitStorage + Send>, StorageError> {
    match kind {
        StorageKind::Json => Ok(Box::new(JsonFileStorage::new(data_dir)?)),
        StorageKind::Sqlite => {
            std::fs::create_dir_all(data_dir)?;
            Ok(Box::new(SqliteStorage::new(data_dir.join("habits.db"))?))
        }
    }
}

/// Habit board server that speaks JSON-RPC over stdin/stdout
pub struct RutinServer {
    session: Session,
}

impl RutinServer {
    /// Create a server over the board saved in `data_dir`
    ///
    /// A first run starts from the example habit; nothing is written until
    /// the first change.
    pub fn new(kind: StorageKind, data_dir: &Path) -> Result<Self, ServerError> {
        tracing::info!("Initializing rutin with {:?} storage in {:?}", kind, data_dir);

        let storage = open_storage(kind, data_dir)?;
        let session = Session::new(storage)?;

        Ok(Self { session })
    }

    /// Run the JSON-RPC loop until stdin closes
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!(
            "Server started successfully, board has {} habits",
            self.session.habits().len()
        );

        let mut server = rpc::RpcServer::new(self.session);
        server.run().await?;

        Ok(())
    }

    /// Get a reference to the session (useful for testing)
    pub fn session(&self) -> &Session {
        &self.session
    }
}
