/// Core types used throughout the domain layer
///
/// This module defines the habit identifier, the fixed color palette and
/// the two view modes the board can be displayed in.

use std::fmt;

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a habit
///
/// Ids are opaque strings. Habits created in this session get
/// `habit-<unix millis>-<8 hex chars>`; imported and stored habits keep
/// whatever id they were saved with.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct HabitId(pub String);

impl HabitId {
    /// Generate a new id from the current time plus a random suffix
    pub fn new() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("habit-{}-{}", Utc::now().timestamp_millis(), &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HabitId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The fixed palette of color themes a habit can be tagged with
///
/// Keys are the lowercase variant names. `Green` is the default used
/// whenever stored or imported data carries a missing or unknown key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    #[default]
    Green,
    Blue,
    Purple,
    Pink,
    Orange,
    Yellow,
    Teal,
    Red,
    Indigo,
    Gray,
}

impl ColorTheme {
    /// Every palette entry in display order
    pub const ALL: [ColorTheme; 10] = [
        ColorTheme::Green,
        ColorTheme::Blue,
        ColorTheme::Purple,
        ColorTheme::Pink,
        ColorTheme::Orange,
        ColorTheme::Yellow,
        ColorTheme::Teal,
        ColorTheme::Red,
        ColorTheme::Indigo,
        ColorTheme::Gray,
    ];

    /// Storage key for this theme
    pub fn key(&self) -> &'static str {
        match self {
            ColorTheme::Green => "green",
            ColorTheme::Blue => "blue",
            ColorTheme::Purple => "purple",
            ColorTheme::Pink => "pink",
            ColorTheme::Orange => "orange",
            ColorTheme::Yellow => "yellow",
            ColorTheme::Teal => "teal",
            ColorTheme::Red => "red",
            ColorTheme::Indigo => "indigo",
            ColorTheme::Gray => "gray",
        }
    }

    /// Accent color used for completed days and the habit title
    pub fn hex(&self) -> &'static str {
        match self {
            ColorTheme::Green => "#39d353",
            ColorTheme::Blue => "#3b82f6",
            ColorTheme::Purple => "#8b5cf6",
            ColorTheme::Pink => "#ec4899",
            ColorTheme::Orange => "#f97316",
            ColorTheme::Yellow => "#f59e0b",
            ColorTheme::Teal => "#14b8a6",
            ColorTheme::Red => "#ef4444",
            ColorTheme::Indigo => "#6366f1",
            ColorTheme::Gray => "#a1a1aa",
        }
    }

    /// Look up a theme by key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|theme| theme.key() == key)
    }

    /// Resolve an optional stored key, substituting the default theme
    pub fn from_key_or_default(key: Option<&str>) -> Self {
        key.and_then(Self::from_key).unwrap_or_default()
    }
}

impl fmt::Display for ColorTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// How the board is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Seven-day strip whose day circles toggle completion
    #[default]
    Weekly,
    /// 126-day read-only grid
    Overview,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Weekly => ViewMode::Overview,
            ViewMode::Overview => ViewMode::Weekly,
        }
    }
}
