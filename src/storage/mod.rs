/// Storage layer for persisting the habit collection
///
/// The persistence adapter writes the whole collection after every change
/// and reads it back on startup. Two media are provided: a JSON file named
/// after the `habits` key, and SQLite.

pub mod json_file;
pub mod migrations;
pub mod sqlite;

// Re-export the main storage types
pub use json_file::JsonFileStorage;
pub use sqlite::SqliteStorage;

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{dates, ColorTheme, Habit, HabitId};

/// Storage key / file stem the collection is saved under
pub const HABITS_KEY: &str = "habits";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to replace data file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the persistence interface for the habit collection
///
/// Implementations store the full ordered collection; there is no partial
/// update.
pub trait HabitStorage {
    /// Load the saved collection, or `None` if nothing was ever saved
    fn load(&self) -> Result<Option<Vec<Habit>>, StorageError>;

    /// Replace the saved collection with `habits`, preserving order
    fn save(&self, habits: &[Habit]) -> Result<(), StorageError>;

    /// Human-readable location, for logs
    fn location(&self) -> String;
}

/// Serialized form of a habit
///
/// Completion dates become a sorted list here; everywhere else they are a
/// set. Missing or unknown colors resolve to the default theme on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredHabit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub completed_dates: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Habit> for StoredHabit {
    fn from(habit: &Habit) -> Self {
        Self {
            id: habit.id.to_string(),
            name: habit.name.clone(),
            color: Some(habit.color.key().to_string()),
            completed_dates: habit.completed_dates.iter().cloned().collect(),
            created_at: Some(habit.created_at),
            updated_at: habit.updated_at,
        }
    }
}

impl StoredHabit {
    /// Convert to a habit, dropping completion dates that are not canonical
    pub fn into_habit(self) -> Habit {
        let id = self.id;
        let completed_dates: BTreeSet<String> = self
            .completed_dates
            .into_iter()
            .filter(|date| {
                let canonical = dates::is_canonical_date(date);
                if !canonical {
                    tracing::warn!("Dropping malformed completion date '{}' of habit {}", date, id);
                }
                canonical
            })
            .collect();
        Habit::from_existing(
            HabitId(id),
            Habit::normalize_name(&self.name),
            ColorTheme::from_key_or_default(self.color.as_deref()),
            completed_dates,
            self.created_at.unwrap_or_else(Utc::now),
            self.updated_at,
        )
    }
}

/// Convert a saved collection, giving repeated ids fresh ones
///
/// The first habit with a given id keeps it; later ones are renumbered so
/// lookups and removals by id stay unambiguous.
pub fn habits_from_stored(stored: Vec<StoredHabit>) -> Vec<Habit> {
    let mut seen = HashSet::new();
    stored
        .into_iter()
        .map(|record| {
            let mut habit = record.into_habit();
            if !seen.insert(habit.id.clone()) {
                let fresh = HabitId::new();
                tracing::warn!("Duplicate habit id {} in saved data, renamed to {}", habit.id, fresh);
                habit.id = fresh;
                seen.insert(habit.id.clone());
            }
            habit
        })
        .collect()
}

/// The example habit shown to a first-run user
pub fn seed_habits(today: NaiveDate) -> Vec<Habit> {
    let completed_dates = [today, today - Duration::days(2)]
        .into_iter()
        .map(dates::format_date)
        .collect();

    vec![Habit::from_existing(
        HabitId::from("habit-1"),
        "Read a Book".to_string(),
        ColorTheme::Green,
        completed_dates,
        Utc::now(),
        None,
    )]
}

/// Load the saved collection, seeding the example habit on first run
pub fn load_or_seed<S: HabitStorage + ?Sized>(storage: &S) -> Result<Vec<Habit>, StorageError> {
    match storage.load()? {
        Some(habits) => {
            tracing::info!("Loaded {} habits from {}", habits.len(), storage.location());
            Ok(habits)
        }
        None => {
            tracing::info!("No saved habits at {}, seeding example habit", storage.location());
            Ok(seed_habits(dates::today()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_has_today_and_two_days_ago() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let habits = seed_habits(today);

        assert_eq!(habits.len(), 1);
        let dates: Vec<&str> = habits[0].completed_dates.iter().map(|s| s.as_str()).collect();
        assert_eq!(dates, vec!["2024-02-28", "2024-03-01"]);
        assert_eq!(habits[0].color, ColorTheme::Green);
    }

    #[test]
    fn test_stored_habit_without_color_gets_default() {
        let stored: StoredHabit = serde_json::from_str(
            r#"{"id": "habit-9", "name": "Walk", "completedDates": ["2024-01-02", "2024-01-01"]}"#,
        )
        .unwrap();

        let habit = stored.into_habit();
        assert_eq!(habit.color, ColorTheme::Green);
        assert_eq!(habit.completed_dates.len(), 2);
    }

    #[test]
    fn test_stored_dates_are_sorted_list() {
        let mut habit = Habit::new("Walk", ColorTheme::Red);
        habit.completed_dates.insert("2024-02-01".to_string());
        habit.completed_dates.insert("2024-01-01".to_string());

        let stored = StoredHabit::from(&habit);
        assert_eq!(stored.completed_dates, vec!["2024-01-01", "2024-02-01"]);
        assert_eq!(stored.color.as_deref(), Some("red"));
    }
}
