/// SQLite implementation of the habit backend
///
/// Accounts, sessions and habits share one database with the local store
/// schema; each habit row carries its owner's user id. Passwords are kept
/// as a salted SHA-256 digest.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backend::{AuthSession, BackendError, HabitBackend, HabitPatch, HabitRecord, Session, User};
use crate::domain::{dates, ColorTheme, Habit, HabitId};
use crate::storage::sqlite::{completions_for, habit_for_owner, habits_for_owner, open_connection};
use crate::storage::{migrations, StorageError};

/// How long a bearer token stays valid
const SESSION_TTL_HOURS: i64 = 24;

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, BackendError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| BackendError::Storage(StorageError::Connection(format!("Corrupt timestamp: {}", e))))
}

/// Resolve a bearer token to its user id
fn user_for_token(conn: &Connection, token: &str) -> Result<String, BackendError> {
    if token.trim().is_empty() {
        return Err(BackendError::Auth("Access token required".to_string()));
    }

    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
            params![token],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let (user_id, expires_at) = row.ok_or_else(|| BackendError::Auth("Invalid token".to_string()))?;
    if parse_time(&expires_at)? <= Utc::now() {
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        return Err(BackendError::Auth("Session expired".to_string()));
    }

    Ok(user_id)
}

fn owned_habit(conn: &Connection, user_id: &str, habit_id: &HabitId) -> Result<Habit, BackendError> {
    habit_for_owner(conn, user_id, habit_id)?
        .ok_or_else(|| BackendError::NotFound(format!("Habit {}", habit_id)))
}

/// Multi-user backend over a single SQLite connection
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open (and migrate) the backend database at `db_path`
    pub fn new(db_path: &Path) -> Result<Self, BackendError> {
        let conn = open_connection(db_path)?;
        tracing::info!("Backend database initialized at: {:?}", db_path);
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// A throwaway backend, mostly for tests
    pub fn in_memory() -> Result<Self, BackendError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations::initialize_database(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

#[async_trait]
impl HabitBackend for SqliteBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<User, BackendError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(BackendError::Validation("Email and password are required".to_string()));
        }

        let conn = self.conn.lock().await;
        let taken: Option<String> = conn
            .query_row("SELECT id FROM users WHERE email = ?1", params![email], |row| row.get(0))
            .optional()?;
        if taken.is_some() {
            return Err(BackendError::Validation("User already registered".to_string()));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            full_name: full_name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string),
            created_at: Utc::now(),
        };
        let salt = Uuid::new_v4().simple().to_string();

        conn.execute(
            "INSERT INTO users (id, email, password_hash, salt, full_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.email,
                hash_password(&salt, password),
                salt,
                user.full_name,
                user.created_at.to_rfc3339(),
            ],
        )?;

        tracing::info!("Registered user {}", user.id);
        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(BackendError::Validation("Email and password are required".to_string()));
        }

        let conn = self.conn.lock().await;
        let row: Option<(String, String, String, Option<String>, String)> = conn
            .query_row(
                "SELECT id, password_hash, salt, full_name, created_at FROM users WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .optional()?;

        let invalid = || BackendError::Auth("Invalid login credentials".to_string());
        let (user_id, password_hash, salt, full_name, created_at) = row.ok_or_else(invalid)?;
        if hash_password(&salt, password) != password_hash {
            return Err(invalid());
        }

        let now = Utc::now();
        let session = Session {
            access_token: Uuid::new_v4().simple().to_string(),
            user_id: user_id.clone(),
            expires_at: now + Duration::hours(SESSION_TTL_HOURS),
        };
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                session.access_token,
                session.user_id,
                now.to_rfc3339(),
                session.expires_at.to_rfc3339(),
            ],
        )?;

        let user = User {
            id: user_id,
            email,
            full_name,
            created_at: parse_time(&created_at)?,
        };
        tracing::debug!("Opened session for user {}", user.id);
        Ok(AuthSession { user, session })
    }

    async fn logout(&self, token: &str) -> Result<(), BackendError> {
        let conn = self.conn.lock().await;
        user_for_token(&conn, token)?;
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(())
    }

    async fn list_habits_with_completions(&self, token: &str) -> Result<Vec<HabitRecord>, BackendError> {
        let conn = self.conn.lock().await;
        let user_id = user_for_token(&conn, token)?;
        Ok(habits_for_owner(&conn, &user_id)?)
    }

    async fn get_habit(&self, token: &str, habit_id: &HabitId) -> Result<HabitRecord, BackendError> {
        let conn = self.conn.lock().await;
        let user_id = user_for_token(&conn, token)?;
        owned_habit(&conn, &user_id, habit_id)
    }

    async fn list_completions(&self, token: &str, habit_id: &HabitId) -> Result<Vec<String>, BackendError> {
        let conn = self.conn.lock().await;
        let user_id = user_for_token(&conn, token)?;
        owned_habit(&conn, &user_id, habit_id)?;
        Ok(completions_for(&conn, habit_id)?)
    }

    async fn create_habit(
        &self,
        token: &str,
        name: &str,
        color: Option<ColorTheme>,
    ) -> Result<HabitRecord, BackendError> {
        if name.trim().is_empty() {
            return Err(BackendError::Validation("Habit name is required".to_string()));
        }

        let conn = self.conn.lock().await;
        let user_id = user_for_token(&conn, token)?;

        let habit = Habit::new(name, color.unwrap_or_default());
        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM habits WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        conn.execute(
            "INSERT INTO habits (id, user_id, name, color, position, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                habit.id.as_str(),
                user_id,
                habit.name,
                habit.color.key(),
                position,
                habit.created_at.to_rfc3339(),
            ],
        )?;

        tracing::debug!("Created habit {} for user {}", habit.id, user_id);
        Ok(habit)
    }

    async fn update_habit(
        &self,
        token: &str,
        habit_id: &HabitId,
        patch: HabitPatch,
    ) -> Result<HabitRecord, BackendError> {
        let conn = self.conn.lock().await;
        let user_id = user_for_token(&conn, token)?;
        let mut habit = owned_habit(&conn, &user_id, habit_id)?;

        if let Some(name) = patch.name {
            habit.rename(&name);
        }
        if let Some(color) = patch.color {
            habit.set_color(color);
        }

        conn.execute(
            "UPDATE habits SET name = ?1, color = ?2, updated_at = ?3 WHERE id = ?4 AND user_id = ?5",
            params![
                habit.name,
                habit.color.key(),
                habit.updated_at.map(|t| t.to_rfc3339()),
                habit_id.as_str(),
                user_id,
            ],
        )?;
        Ok(habit)
    }

    async fn delete_habit(&self, token: &str, habit_id: &HabitId) -> Result<(), BackendError> {
        let conn = self.conn.lock().await;
        let user_id = user_for_token(&conn, token)?;

        let deleted = conn.execute(
            "DELETE FROM habits WHERE id = ?1 AND user_id = ?2",
            params![habit_id.as_str(), user_id],
        )?;
        if deleted == 0 {
            return Err(BackendError::NotFound(format!("Habit {}", habit_id)));
        }
        Ok(())
    }

    async fn toggle_completion(
        &self,
        token: &str,
        habit_id: &HabitId,
        date: &str,
    ) -> Result<bool, BackendError> {
        dates::parse_date(date)
            .map_err(|_| BackendError::Validation("Invalid date format. Use YYYY-MM-DD".to_string()))?;

        let conn = self.conn.lock().await;
        let user_id = user_for_token(&conn, token)?;
        owned_habit(&conn, &user_id, habit_id)?;

        let removed = conn.execute(
            "DELETE FROM habit_completions WHERE habit_id = ?1 AND completion_date = ?2",
            params![habit_id.as_str(), date],
        )?;
        if removed > 0 {
            return Ok(false);
        }

        conn.execute(
            "INSERT INTO habit_completions (habit_id, completion_date, created_at) VALUES (?1, ?2, ?3)",
            params![habit_id.as_str(), date, Utc::now().to_rfc3339()],
        )?;
        Ok(true)
    }
}
