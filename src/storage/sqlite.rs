/// SQLite implementation of the habit storage interface
///
/// This module provides the SQLite medium for the local store and the row
/// helpers the backend shares. Board order is kept in an explicit
/// `position` column.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{ColorTheme, Habit, HabitId};
use crate::storage::{migrations, HabitStorage, StorageError, HABITS_KEY};

/// Owner id used for habits saved by the single-user local store
pub const LOCAL_OWNER: &str = "local";

/// Open a database file, enable foreign keys and migrate the schema
pub fn open_connection(db_path: &Path) -> Result<Connection, StorageError> {
    let conn = Connection::open(db_path)
        .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

    conn.execute("PRAGMA foreign_keys = ON", [])
        .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

    migrations::initialize_database(&conn)?;
    Ok(conn)
}

fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(column, "Invalid datetime".to_string(), rusqlite::types::Type::Text)
        })
}

/// Map a `SELECT id, name, color, created_at, updated_at` row
fn row_to_habit(row: &Row<'_>) -> rusqlite::Result<Habit> {
    let color: String = row.get(2)?;
    let created_at_str: String = row.get(3)?;
    let updated_at_str: Option<String> = row.get(4)?;

    Ok(Habit::from_existing(
        HabitId(row.get(0)?),
        row.get(1)?, // name
        ColorTheme::from_key_or_default(Some(&color)),
        BTreeSet::new(),
        parse_timestamp(3, &created_at_str)?,
        updated_at_str.map(|s| parse_timestamp(4, &s)).transpose()?,
    ))
}

/// Completion dates of one habit, ascending
pub fn completions_for(conn: &Connection, habit_id: &HabitId) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT completion_date FROM habit_completions
         WHERE habit_id = ?1 ORDER BY completion_date ASC",
    )?;
    let rows = stmt.query_map(params![habit_id.as_str()], |row| row.get::<_, String>(0))?;

    let mut dates = Vec::new();
    for date in rows {
        dates.push(date?);
    }
    Ok(dates)
}

/// All habits of `owner` in board order, completions attached
pub fn habits_for_owner(conn: &Connection, owner: &str) -> Result<Vec<Habit>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, color, created_at, updated_at FROM habits
         WHERE user_id = ?1 ORDER BY position ASC, created_at ASC",
    )?;
    let rows = stmt.query_map(params![owner], row_to_habit)?;

    let mut habits = Vec::new();
    for habit in rows {
        habits.push(habit?);
    }

    let mut stmt = conn.prepare(
        "SELECT c.habit_id, c.completion_date FROM habit_completions c
         JOIN habits h ON h.id = c.habit_id WHERE h.user_id = ?1",
    )?;
    let pairs = stmt.query_map(params![owner], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut by_habit: HashMap<String, BTreeSet<String>> = HashMap::new();
    for pair in pairs {
        let (habit_id, date) = pair?;
        by_habit.entry(habit_id).or_default().insert(date);
    }

    for habit in &mut habits {
        if let Some(dates) = by_habit.remove(habit.id.as_str()) {
            habit.completed_dates = dates;
        }
    }

    Ok(habits)
}

/// One habit of `owner`, or `None` if it does not exist or is not theirs
pub fn habit_for_owner(
    conn: &Connection,
    owner: &str,
    habit_id: &HabitId,
) -> Result<Option<Habit>, StorageError> {
    let habit = conn
        .query_row(
            "SELECT id, name, color, created_at, updated_at FROM habits
             WHERE id = ?1 AND user_id = ?2",
            params![habit_id.as_str(), owner],
            row_to_habit,
        )
        .optional()?;

    match habit {
        Some(mut habit) => {
            habit.completed_dates = completions_for(conn, habit_id)?.into_iter().collect();
            Ok(Some(habit))
        }
        None => Ok(None),
    }
}

/// SQLite-based storage for the local collection
pub struct SqliteStorage {
    conn: Connection,
    path: PathBuf,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = open_connection(&db_path)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);

        Ok(Self { conn, path: db_path })
    }
}

impl HabitStorage for SqliteStorage {
    fn load(&self) -> Result<Option<Vec<Habit>>, StorageError> {
        let saved: Option<String> = self
            .conn
            .query_row(
                "SELECT saved_at FROM local_state WHERE key = ?1",
                params![HABITS_KEY],
                |row| row.get(0),
            )
            .optional()?;

        if saved.is_none() {
            return Ok(None);
        }
        Ok(Some(habits_for_owner(&self.conn, LOCAL_OWNER)?))
    }

    fn save(&self, habits: &[Habit]) -> Result<(), StorageError> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "DELETE FROM habit_completions
             WHERE habit_id IN (SELECT id FROM habits WHERE user_id = ?1)",
            params![LOCAL_OWNER],
        )?;
        tx.execute("DELETE FROM habits WHERE user_id = ?1", params![LOCAL_OWNER])?;

        for (position, habit) in habits.iter().enumerate() {
            tx.execute(
                "INSERT INTO habits (id, user_id, name, color, position, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    habit.id.as_str(),
                    LOCAL_OWNER,
                    habit.name,
                    habit.color.key(),
                    position as i64,
                    habit.created_at.to_rfc3339(),
                    habit.updated_at.map(|t| t.to_rfc3339()),
                ],
            )?;

            for date in &habit.completed_dates {
                tx.execute(
                    "INSERT INTO habit_completions (habit_id, completion_date, created_at)
                     VALUES (?1, ?2, ?3)",
                    params![habit.id.as_str(), date, now],
                )?;
            }
        }

        tx.execute(
            "INSERT OR REPLACE INTO local_state (key, saved_at) VALUES (?1, ?2)",
            params![HABITS_KEY, now],
        )?;
        tx.commit()?;

        tracing::debug!("Saved {} habits to {}", habits.len(), self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
