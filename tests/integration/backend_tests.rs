/// Account, ownership and completion flows against the SQLite backend
use rutin::backend::{HabitPatch, SqliteBackend};
use rutin::*;
use tempfile::tempdir;

#[cfg(test)]
mod backend_tests {
    use super::*;

    async fn login(backend: &SqliteBackend, email: &str) -> String {
        backend
            .sign_up(email, "correct horse", Some("Test User"))
            .await
            .expect("Failed to sign up");
        backend
            .authenticate(email, "correct horse")
            .await
            .expect("Failed to authenticate")
            .session
            .access_token
    }

    #[tokio::test]
    async fn test_habit_lifecycle() {
        let dir = tempdir().expect("Failed to create temp dir");
        let backend = SqliteBackend::new(&dir.path().join("backend.db")).unwrap();
        let token = login(&backend, "ana@example.com").await;

        let walk = backend.create_habit(&token, "Walk", Some(ColorTheme::Blue)).await.unwrap();
        let read = backend.create_habit(&token, "Read", None).await.unwrap();

        assert!(backend.toggle_completion(&token, &walk.id, "2024-05-02").await.unwrap());
        assert!(backend.toggle_completion(&token, &walk.id, "2024-05-01").await.unwrap());
        assert_eq!(
            backend.list_completions(&token, &walk.id).await.unwrap(),
            vec!["2024-05-01", "2024-05-02"]
        );
        assert!(!backend.toggle_completion(&token, &walk.id, "2024-05-02").await.unwrap());

        let updated = backend
            .update_habit(
                &token,
                &read.id,
                HabitPatch {
                    name: Some("  Read daily ".to_string()),
                    color: Some(ColorTheme::Purple),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Read daily");
        assert!(updated.updated_at.is_some());

        let habits = backend.list_habits_with_completions(&token).await.unwrap();
        let names: Vec<&str> = habits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Walk", "Read daily"]);
        assert!(habits[0].is_completed_on("2024-05-01"));
        assert_eq!(habits[1].color, ColorTheme::Purple);

        backend.delete_habit(&token, &walk.id).await.unwrap();
        let result = backend.get_habit(&token, &walk.id).await;
        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_other_users_habits_look_missing() {
        let backend = SqliteBackend::in_memory().unwrap();
        let owner = login(&backend, "owner@example.com").await;
        let intruder = login(&backend, "intruder@example.com").await;

        let habit = backend.create_habit(&owner, "Private", None).await.unwrap();

        assert!(matches!(
            backend.get_habit(&intruder, &habit.id).await,
            Err(BackendError::NotFound(_))
        ));
        assert!(matches!(
            backend.toggle_completion(&intruder, &habit.id, "2024-01-01").await,
            Err(BackendError::NotFound(_))
        ));
        assert!(matches!(
            backend.delete_habit(&intruder, &habit.id).await,
            Err(BackendError::NotFound(_))
        ));
        assert!(backend.list_habits_with_completions(&intruder).await.unwrap().is_empty());
        assert_eq!(backend.get_habit(&owner, &habit.id).await.unwrap().name, "Private");
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let backend = SqliteBackend::in_memory().unwrap();

        let result = backend.create_habit("not-a-token", "Walk", None).await;
        assert!(matches!(result, Err(BackendError::Auth(_))));

        let result = backend.list_habits_with_completions("").await;
        assert!(matches!(result, Err(BackendError::Auth(_))));
    }
}
