/// Domain module containing the habit model and calendar helpers
///
/// This module defines the core entity (Habit), the palette and view types
/// it is rendered with, and the date utilities every other layer uses to
/// talk about completion days.

pub mod dates;
pub mod habit;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Habit not found: {0}")]
    HabitNotFound(String),

    #[error("{action} is only available in select mode")]
    SelectModeRequired { action: &'static str },
}
