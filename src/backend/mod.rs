/// Server-side habit storage with user accounts
///
/// `HabitBackend` is the contract a remote store fulfils: accounts and
/// bearer-token sessions, per-user habit CRUD and completion toggling.
/// Every habit call resolves the token to a user first, and a habit that
/// belongs to someone else is reported exactly like a missing one.

pub mod sqlite;

pub use sqlite::SqliteBackend;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{ColorTheme, Habit, HabitId};
use crate::storage::StorageError;

/// Habits as the backend returns them, completions attached
pub type HabitRecord = Habit;

/// Errors that can occur during backend calls
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<rusqlite::Error> for BackendError {
    fn from(error: rusqlite::Error) -> Self {
        BackendError::Storage(StorageError::Query(error))
    }
}

/// A registered account
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A bearer token and its lifetime
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthSession {
    pub user: User,
    pub session: Session,
}

/// Fields to change on a habit; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub color: Option<ColorTheme>,
}

/// Contract for a multi-user habit store
#[async_trait]
pub trait HabitBackend: Send + Sync {
    /// Register a new account
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<User, BackendError>;

    /// Check credentials and open a session
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthSession, BackendError>;

    /// End the session behind `token`
    async fn logout(&self, token: &str) -> Result<(), BackendError>;

    /// All of the caller's habits in board order
    async fn list_habits_with_completions(&self, token: &str) -> Result<Vec<HabitRecord>, BackendError>;

    async fn get_habit(&self, token: &str, habit_id: &HabitId) -> Result<HabitRecord, BackendError>;

    /// Completion dates of one habit, ascending
    async fn list_completions(&self, token: &str, habit_id: &HabitId) -> Result<Vec<String>, BackendError>;

    /// Create a habit at the end of the caller's board
    async fn create_habit(
        &self,
        token: &str,
        name: &str,
        color: Option<ColorTheme>,
    ) -> Result<HabitRecord, BackendError>;

    async fn update_habit(
        &self,
        token: &str,
        habit_id: &HabitId,
        patch: HabitPatch,
    ) -> Result<HabitRecord, BackendError>;

    async fn delete_habit(&self, token: &str, habit_id: &HabitId) -> Result<(), BackendError>;

    /// Flip one completion and report whether the day is now completed
    async fn toggle_completion(
        &self,
        token: &str,
        habit_id: &HabitId,
        date: &str,
    ) -> Result<bool, BackendError>;
}
