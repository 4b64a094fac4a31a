/// Backup export and import
///
/// A backup is a versioned JSON document wrapping the same habit records
/// the local store writes. Import is lenient about missing fields and
/// strict about completion dates: one malformed date rejects the file.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{dates, ColorTheme, Habit, HabitId, UNTITLED};
use crate::storage::StoredHabit;

/// Format version written into every export
pub const EXPORT_VERSION: &str = "1.1";

/// Errors that can occur while exporting or importing a backup
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Invalid JSON file: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid file format: missing habits data")]
    MissingHabits,

    #[error("Invalid completion date '{date}' in habit '{habit}'")]
    InvalidDate { habit: String, date: String },

    #[error("No habits to download")]
    EmptyCollection,

    #[error("Please select a JSON file: {0}")]
    UnsupportedFile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The exported document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub habits: Vec<StoredHabit>,
}

pub fn export_document(habits: &[Habit], now: DateTime<Utc>) -> ExportDocument {
    ExportDocument {
        version: EXPORT_VERSION.to_string(),
        exported_at: now,
        habits: habits.iter().map(StoredHabit::from).collect(),
    }
}

/// Pretty-printed JSON of an export document
pub fn to_json(document: &ExportDocument) -> Result<String, TransferError> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// `rutin-backup-YYYY-MM-DD.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("rutin-backup-{}.json", dates::format_date(date))
}

/// Write a dated backup of `habits` into `dir` and return its path
pub fn write_backup(dir: &Path, habits: &[Habit]) -> Result<PathBuf, TransferError> {
    if habits.is_empty() {
        return Err(TransferError::EmptyCollection);
    }

    let json = to_json(&export_document(habits, Utc::now()))?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(backup_file_name(dates::today()));
    std::fs::write(&path, json)?;

    tracing::info!("Exported {} habits to {}", habits.len(), path.display());
    Ok(path)
}

fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn imported_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn imported_habit(entry: &Map<String, Value>, seen: &mut HashSet<String>) -> Result<Habit, TransferError> {
    let name = entry
        .get("name")
        .and_then(Value::as_str)
        .map(Habit::normalize_name)
        .unwrap_or_else(|| UNTITLED.to_string());

    let mut completed_dates = BTreeSet::new();
    if let Some(list) = entry.get("completedDates").and_then(Value::as_array) {
        for item in list {
            match item.as_str() {
                Some(date) if dates::is_canonical_date(date) => {
                    completed_dates.insert(date.to_string());
                }
                _ => {
                    return Err(TransferError::InvalidDate {
                        habit: name,
                        date: item.to_string(),
                    })
                }
            }
        }
    }

    let id = match imported_id(entry.get("id")) {
        Some(id) if !seen.contains(&id) => HabitId(id),
        _ => HabitId::new(),
    };
    seen.insert(id.to_string());

    Ok(Habit::from_existing(
        id,
        name,
        ColorTheme::from_key_or_default(entry.get("color").and_then(Value::as_str)),
        completed_dates,
        timestamp(entry.get("createdAt")).unwrap_or_else(Utc::now),
        timestamp(entry.get("updatedAt")),
    ))
}

/// Parse backup text into habits, filling defaults for missing fields
pub fn parse_import(json: &str) -> Result<Vec<Habit>, TransferError> {
    let document: Value = serde_json::from_str(json)?;
    import_from_value(&document)
}

/// Same as `parse_import`, for a document that is already parsed
pub fn import_from_value(document: &Value) -> Result<Vec<Habit>, TransferError> {
    let entries = document
        .get("habits")
        .and_then(Value::as_array)
        .ok_or(TransferError::MissingHabits)?;

    let empty = Map::new();
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(|entry| imported_habit(entry.as_object().unwrap_or(&empty), &mut seen))
        .collect()
}

/// Read and parse a backup file
pub async fn read_backup(path: &Path) -> Result<Vec<Habit>, TransferError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if !is_json {
        return Err(TransferError::UnsupportedFile(path.display().to_string()));
    }

    let contents = tokio::fs::read_to_string(path).await?;
    let habits = parse_import(&contents)?;
    tracing::info!("Read {} habits from {}", habits.len(), path.display());
    Ok(habits)
}
