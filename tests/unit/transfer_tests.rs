/// Import parsing and export shape
use std::collections::BTreeSet;

use chrono::Utc;
use rutin::transfer::{export_document, parse_import, to_json, TransferError};
use rutin::*;

#[cfg(test)]
mod transfer_tests {
    use super::*;

    #[test]
    fn test_bare_import_gets_generated_id_and_defaults() {
        let habits = parse_import(r#"{"habits": [{"name": "X"}]}"#).unwrap();

        assert_eq!(habits.len(), 1);
        let habit = &habits[0];
        assert_eq!(habit.name, "X");
        assert!(!habit.id.as_str().is_empty());
        assert_eq!(habit.color, ColorTheme::default());
        assert_eq!(habit.completed_dates, BTreeSet::new());
    }

    #[test]
    fn test_unknown_color_falls_back_to_default() {
        let habits = parse_import(r#"{"habits": [{"name": "X", "color": "magenta"}]}"#).unwrap();
        assert_eq!(habits[0].color, ColorTheme::Green);
    }

    #[test]
    fn test_export_then_parse_reproduces_habits() {
        let mut read = Habit::new("Read", ColorTheme::Teal);
        read.completed_dates.insert("2024-03-02".to_string());
        read.completed_dates.insert("2024-03-01".to_string());
        let walk = Habit::new("Walk", ColorTheme::Gray);
        let original = vec![read, walk];

        let json = to_json(&export_document(&original, Utc::now())).unwrap();
        let restored = parse_import(&json).unwrap();

        assert_eq!(restored.len(), original.len());
        for (before, after) in original.iter().zip(&restored) {
            assert_eq!(before.id, after.id);
            assert_eq!(before.name, after.name);
            assert_eq!(before.color, after.color);
            assert_eq!(before.completed_dates, after.completed_dates);
        }
    }

    #[test]
    fn test_import_error_messages() {
        let missing = parse_import(r#"{"items": []}"#).unwrap_err();
        assert_eq!(missing.to_string(), "Invalid file format: missing habits data");

        let bad_date = parse_import(r#"{"habits": [{"name": "X", "completedDates": [20240101]}]}"#).unwrap_err();
        assert!(matches!(bad_date, TransferError::InvalidDate { .. }));
    }
}
