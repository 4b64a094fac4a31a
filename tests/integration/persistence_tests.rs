/// Board changes surviving a restart, for both storage media
use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rutin::state::CardBounds;
use rutin::*;
use tempfile::tempdir;

#[cfg(test)]
mod persistence_tests {
    use super::*;

    fn session(kind: StorageKind, dir: &std::path::Path) -> Session {
        let storage = open_storage(kind, dir).expect("Failed to open storage");
        Session::with_rng(storage, StdRng::seed_from_u64(11)).expect("Failed to load session")
    }

    fn ids(session: &Session) -> Vec<HabitId> {
        session.habits().iter().map(|h| h.id.clone()).collect()
    }

    fn drag_last_to_front(kind: StorageKind) {
        let dir = tempdir().expect("Failed to create temp dir");

        let expected = {
            let mut session = session(kind, dir.path());
            session.dispatch(Action::AddHabit).unwrap();
            session.dispatch(Action::AddHabit).unwrap();
            let before = ids(&session);
            assert_eq!(before.len(), 3);

            let siblings: Vec<CardBounds> = before[..2]
                .iter()
                .enumerate()
                .map(|(i, id)| CardBounds {
                    habit_id: id.clone(),
                    top: i as f64 * 80.0,
                    height: 80.0,
                })
                .collect();

            session.dispatch(Action::DragStart { habit_id: before[2].clone() }).unwrap();
            session.dispatch(Action::DragOver { pointer_y: 5.0, siblings }).unwrap();
            let outcome = session.dispatch(Action::Drop).unwrap();
            assert!(outcome.save_warning.is_none());

            vec![before[2].clone(), before[0].clone(), before[1].clone()]
        };

        let reloaded = session(kind, dir.path());
        assert_eq!(ids(&reloaded), expected);
    }

    #[test]
    fn test_drag_order_survives_reload_json() {
        drag_last_to_front(StorageKind::Json);
    }

    #[test]
    fn test_drag_order_survives_reload_sqlite() {
        drag_last_to_front(StorageKind::Sqlite);
    }

    #[test]
    fn test_deleting_every_habit_does_not_reseed() {
        let dir = tempdir().unwrap();
        {
            let mut session = session(StorageKind::Sqlite, dir.path());
            session.dispatch(Action::RequestDelete { habit_id: HabitId::from("habit-1") }).unwrap();
            session.dispatch(Action::ConfirmDelete).unwrap();
            assert!(session.habits().is_empty());
        }

        assert!(session(StorageKind::Sqlite, dir.path()).habits().is_empty());
    }

    #[test]
    fn test_export_import_round_trip_into_empty_board() {
        let source_dir = tempdir().unwrap();
        let backup_dir = tempdir().unwrap();
        let target_dir = tempdir().unwrap();

        let mut source = session(StorageKind::Json, source_dir.path());
        source.dispatch(Action::AddHabit).unwrap();
        let renamed = source.habits()[1].id.clone();
        source
            .dispatch(Action::CommitRename { habit_id: renamed, input: "Meditate".to_string() })
            .unwrap();
        let path = source.write_backup(backup_dir.path()).unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("rutin-backup-"));

        let mut target = session(StorageKind::Json, target_dir.path());
        target.dispatch(Action::RequestDelete { habit_id: HabitId::from("habit-1") }).unwrap();
        target.dispatch(Action::ConfirmDelete).unwrap();

        let imported = tokio_test::block_on(transfer::read_backup(&path)).unwrap();
        let outcome = target.stage_import(imported);
        assert_eq!(outcome.notices, vec!["Successfully imported 2 habits".to_string()]);

        let summary = |s: &Session| -> Vec<(HabitId, String, ColorTheme, BTreeSet<String>)> {
            s.habits()
                .iter()
                .map(|h| (h.id.clone(), h.name.clone(), h.color, h.completed_dates.clone()))
                .collect()
        };
        assert_eq!(summary(&target), summary(&source));

        let reloaded = session(StorageKind::Json, target_dir.path());
        assert_eq!(summary(&reloaded), summary(&source));
    }
}
