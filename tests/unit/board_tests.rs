/// Board behaviour driven through the public reducer
use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rutin::state::CardBounds;
use rutin::*;

#[cfg(test)]
mod board_tests {
    use super::*;

    fn habit(id: &str, name: &str, color: ColorTheme) -> Habit {
        let mut habit = Habit::new(name, color);
        habit.id = HabitId::from(id);
        habit
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn apply(store: &mut HabitStore, action: Action) -> Vec<Effect> {
        reduce(store, action, &mut rng()).expect("action should succeed")
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let mut store = HabitStore::with_habits(vec![habit("read", "Read", ColorTheme::Green)]);
        let toggle = || Action::ToggleCompletion {
            habit_id: HabitId::from("read"),
            date: "2024-01-01".to_string(),
        };

        let effects = apply(&mut store, toggle());
        assert_eq!(effects, vec![Effect::Render, Effect::Persist]);
        let completed: Vec<&String> = store.habits()[0].completed_dates.iter().collect();
        assert_eq!(completed, vec!["2024-01-01"]);

        apply(&mut store, toggle());
        assert!(store.habits()[0].completed_dates.is_empty());
    }

    #[test]
    fn test_toggle_with_bad_date_changes_nothing() {
        let mut store = HabitStore::with_habits(vec![habit("read", "Read", ColorTheme::Green)]);

        let result = reduce(
            &mut store,
            Action::ToggleCompletion {
                habit_id: HabitId::from("read"),
                date: "01/01/2024".to_string(),
            },
            &mut rng(),
        );

        assert!(matches!(result, Err(DomainError::InvalidDate(_))));
        assert!(store.habits()[0].completed_dates.is_empty());
    }

    #[test]
    fn test_blank_rename_becomes_untitled() {
        let mut store = HabitStore::with_habits(vec![habit("read", "Read", ColorTheme::Green)]);

        for input in ["", "   ", "\t\n"] {
            apply(
                &mut store,
                Action::CommitRename {
                    habit_id: HabitId::from("read"),
                    input: input.to_string(),
                },
            );
            assert_eq!(store.habits()[0].name, "Untitled");
        }

        apply(
            &mut store,
            Action::CommitRename {
                habit_id: HabitId::from("read"),
                input: "  Read more  ".to_string(),
            },
        );
        assert_eq!(store.habits()[0].name, "Read more");
        assert!(store.habits()[0].updated_at.is_some());
    }

    #[test]
    fn test_consecutive_adds_never_repeat_adjacent_colors() {
        let mut store = HabitStore::new();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..60 {
            reduce(&mut store, Action::AddHabit, &mut rng).unwrap();
        }

        let colors: Vec<ColorTheme> = store.habits().iter().map(|h| h.color).collect();
        assert!(colors.windows(2).all(|pair| pair[0] != pair[1]));
        assert!(store.habits().iter().all(|h| h.name == "New Activity"));
    }

    #[test]
    fn test_new_habit_avoids_last_color() {
        for seed in 0..40 {
            let mut store = HabitStore::with_habits(vec![
                habit("a", "A", ColorTheme::Green),
                habit("b", "B", ColorTheme::Blue),
            ]);
            reduce(&mut store, Action::AddHabit, &mut StdRng::seed_from_u64(seed)).unwrap();

            assert_ne!(store.habits()[2].color, ColorTheme::Blue);
        }
    }

    #[test]
    fn test_leaving_select_mode_clears_selection() {
        let mut store = HabitStore::with_habits(vec![
            habit("a", "A", ColorTheme::Green),
            habit("b", "B", ColorTheme::Blue),
        ]);

        apply(&mut store, Action::ToggleSelectMode);
        apply(&mut store, Action::ToggleSelected { habit_id: HabitId::from("a") });
        apply(&mut store, Action::ToggleSelected { habit_id: HabitId::from("b") });
        assert_eq!(store.selected().len(), 2);

        apply(&mut store, Action::ToggleSelectMode);
        assert!(store.selected().is_empty());

        apply(&mut store, Action::ToggleSelectMode);
        let board = render(&store, dates::today());
        assert!(board.cards.iter().all(|c| !c.selected));
        assert_eq!(board.selected_count, 0);
    }

    #[test]
    fn test_bulk_delete_removes_exactly_the_selection() {
        let mut b = habit("b", "B", ColorTheme::Blue);
        b.completed_dates.insert("2024-02-02".to_string());
        let mut store = HabitStore::with_habits(vec![
            habit("a", "A", ColorTheme::Green),
            b.clone(),
            habit("c", "C", ColorTheme::Red),
        ]);

        apply(&mut store, Action::ToggleSelectMode);
        apply(&mut store, Action::ToggleSelected { habit_id: HabitId::from("a") });
        apply(&mut store, Action::ToggleSelected { habit_id: HabitId::from("c") });
        apply(&mut store, Action::RequestBulkDelete);

        match render(&store, dates::today()).dialog {
            Some(render::DialogView::ConfirmDelete { title, message }) => {
                assert_eq!(title, "Delete Selected Activities?");
                assert!(message.contains("2 selected activities"));
            }
            other => panic!("expected delete dialog, got {:?}", other),
        }

        let effects = apply(&mut store, Action::ConfirmDelete);
        assert!(effects.contains(&Effect::Persist));
        assert_eq!(store.habits(), &[b][..]);
        assert!(!store.select_mode());
        assert!(store.selected().is_empty());
    }

    #[test]
    fn test_bulk_recolor_leaves_unselected_alone() {
        let mut store = HabitStore::with_habits(vec![
            habit("a", "A", ColorTheme::Green),
            habit("b", "B", ColorTheme::Blue),
        ]);

        apply(&mut store, Action::ToggleSelectMode);
        apply(&mut store, Action::ToggleSelected { habit_id: HabitId::from("b") });
        apply(&mut store, Action::RequestBulkRecolor);
        apply(&mut store, Action::ApplyColor { color: ColorTheme::Orange });

        assert_eq!(store.habits()[0].color, ColorTheme::Green);
        assert_eq!(store.habits()[1].color, ColorTheme::Orange);
    }

    #[test]
    fn test_bulk_actions_need_select_mode() {
        let mut store = HabitStore::with_habits(vec![habit("a", "A", ColorTheme::Green)]);

        let result = reduce(&mut store, Action::RequestBulkDelete, &mut rng());
        assert!(matches!(result, Err(DomainError::SelectModeRequired { .. })));
        assert!(store.pending_delete().is_none());
    }

    #[test]
    fn test_drag_reorders_on_drop_only() {
        let mut store = HabitStore::with_habits(vec![
            habit("a", "A", ColorTheme::Green),
            habit("b", "B", ColorTheme::Blue),
            habit("c", "C", ColorTheme::Red),
        ]);
        let siblings = vec![
            CardBounds { habit_id: HabitId::from("a"), top: 0.0, height: 100.0 },
            CardBounds { habit_id: HabitId::from("b"), top: 100.0, height: 100.0 },
        ];

        apply(&mut store, Action::DragStart { habit_id: HabitId::from("c") });
        apply(&mut store, Action::DragOver { pointer_y: 20.0, siblings });

        let shown: Vec<String> = render(&store, dates::today())
            .cards
            .iter()
            .map(|c| c.id.to_string())
            .collect();
        assert_eq!(shown, vec!["c", "a", "b"]);
        assert_eq!(store.habits()[0].id, HabitId::from("a"));

        let effects = apply(&mut store, Action::Drop);
        assert!(effects.contains(&Effect::Persist));
        let ids: Vec<String> = store.habits().iter().map(|h| h.id.to_string()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert!(store.drag().is_none());
    }

    #[test]
    fn test_context_menu_select_enters_select_mode() {
        let mut store = HabitStore::with_habits(vec![habit("a", "A", ColorTheme::Green)]);

        apply(&mut store, Action::OpenContextMenu { habit_id: HabitId::from("a"), anchor: None });
        apply(&mut store, Action::ChooseMenuItem { item: state::MenuItem::Select });

        assert!(store.select_mode());
        assert!(store.is_selected(&HabitId::from("a")));
        assert!(store.context_menu().is_none());
    }

    #[test]
    fn test_import_into_empty_board_applies_at_once() {
        let mut store = HabitStore::new();
        let imported = transfer::parse_import(r#"{"habits": [{"name": "X"}]}"#).unwrap();

        let effects = state::stage_import(&mut store, imported);

        assert!(effects.contains(&Effect::Persist));
        assert!(effects.contains(&Effect::Notify("Successfully imported 1 habit".to_string())));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_import_over_existing_board_waits_for_confirmation() {
        let mut store = HabitStore::with_habits(vec![habit("a", "A", ColorTheme::Green)]);
        let imported = transfer::parse_import(r#"{"habits": [{"name": "X"}, {"name": "Y"}]}"#).unwrap();

        let effects = state::stage_import(&mut store, imported);
        assert_eq!(effects, vec![Effect::Render]);
        assert_eq!(store.habits()[0].name, "A");

        apply(&mut store, Action::ConfirmImport);
        let names: HashSet<&str> = store.habits().iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, HashSet::from(["X", "Y"]));
    }
}
