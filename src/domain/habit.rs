/// Habit entity and related functionality
///
/// This module defines the Habit struct: a named, colored activity with the
/// set of calendar days on which it was completed.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::domain::{dates, ColorTheme, DomainError, HabitId};

/// Name given to habits created from the board
pub const NEW_HABIT_NAME: &str = "New Activity";

/// Name used whenever a rename or import leaves a habit without one
pub const UNTITLED: &str = "Untitled";

/// A habit the user wants to do every day
///
/// Completion days are kept as a set of canonical `YYYY-MM-DD` strings, so
/// toggling the same day twice always restores the original membership.
#[derive(Debug, Clone, PartialEq)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name, always trimmed and never empty
    pub name: String,
    /// Palette entry used to paint completed days
    pub color: ColorTheme,
    /// Days on which this habit was completed
    pub completed_dates: BTreeSet<String>,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// Last rename or recolor, when one happened
    pub updated_at: Option<DateTime<Utc>>,
}

impl Habit {
    /// Create a fresh habit with a generated id and no completions
    pub fn new(name: &str, color: ColorTheme) -> Self {
        Self {
            id: HabitId::new(),
            name: Self::normalize_name(name),
            color,
            completed_dates: BTreeSet::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Create a habit from existing data (used when loading or importing)
    ///
    /// This constructor assumes data is already normalized and is mainly
    /// used by the storage and transfer layers.
    pub fn from_existing(
        id: HabitId,
        name: String,
        color: ColorTheme,
        completed_dates: BTreeSet<String>,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            name,
            color,
            completed_dates,
            created_at,
            updated_at,
        }
    }

    /// Trim a user-entered name, substituting `Untitled` for blank input
    pub fn normalize_name(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            UNTITLED.to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Commit an inline rename
    pub fn rename(&mut self, input: &str) {
        self.name = Self::normalize_name(input);
        self.updated_at = Some(Utc::now());
    }

    pub fn set_color(&mut self, color: ColorTheme) {
        self.color = color;
        self.updated_at = Some(Utc::now());
    }

    /// Flip membership of `date` and report whether it is now completed
    ///
    /// Any canonical date may be toggled, including days outside the
    /// visible range.
    pub fn toggle_completion(&mut self, date: &str) -> Result<bool, DomainError> {
        dates::parse_date(date)?;

        if self.completed_dates.remove(date) {
            Ok(false)
        } else {
            self.completed_dates.insert(date.to_string());
            Ok(true)
        }
    }

    pub fn is_completed_on(&self, date: &str) -> bool {
        self.completed_dates.contains(date)
    }
}
