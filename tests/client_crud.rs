#[cfg(test)]
mod tests {
    use chrono::{Duration, Local};
    use taskhive::db::reminders::LocalReminders;
    use taskhive::libs::client::{TasksClient, TasksError};
    use taskhive::libs::config::Config;
    use taskhive::libs::reminder::ReminderArguments;
    use taskhive::libs::source::Source;
    use taskhive::libs::task::TaskArguments;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn setup() -> (TempDir, TasksClient) {
        let temp_dir = tempfile::tempdir().unwrap();
        let client = TasksClient::open(Config::default(), &temp_dir.path().join("taskhive.db")).unwrap();
        (temp_dir, client)
    }

    fn reminders_of(temp_dir: &TempDir, task_id: Uuid) -> usize {
        let reminders = LocalReminders::open(&temp_dir.path().join("taskhive.db")).unwrap();
        reminders.for_task(task_id).unwrap().len()
    }

    #[tokio::test]
    async fn test_create_lands_in_cache() {
        let (_temp_dir, client) = setup();
        let now = Local::now();

        let created = client.create(Source::Local, &TaskArguments::new("Cached", now)).await.unwrap();

        let bucket = client.cache().get(now.date_naive()).await.unwrap();
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].id, created.id);
    }

    #[tokio::test]
    async fn test_create_with_reminders_persists_them() {
        let (temp_dir, client) = setup();
        let now = Local::now();

        let mut arguments = TaskArguments::new("Remind me", now);
        arguments.reminders.push(ReminderArguments::new(now + Duration::hours(1)));
        arguments.reminders.push(ReminderArguments::new(now + Duration::hours(2)));

        let created = client.create(Source::Local, &arguments).await.unwrap();

        assert_eq!(created.reminders.len(), 2);
        assert_eq!(reminders_of(&temp_dir, created.id), 2);
        for reminder in &created.reminders {
            assert_eq!(reminder.task_id, created.id);
        }
    }

    #[tokio::test]
    async fn test_update_dropping_a_reminder_deletes_it() {
        let (temp_dir, client) = setup();
        let now = Local::now();

        let mut arguments = TaskArguments::new("Two reminders", now);
        arguments.reminders.push(ReminderArguments::new(now + Duration::hours(1)));
        arguments.reminders.push(ReminderArguments::new(now + Duration::hours(2)));
        let created = client.create(Source::Local, &arguments).await.unwrap();

        // Keep only the first reminder
        let mut update_arguments = created.arguments();
        update_arguments.reminders.truncate(1);
        let updated = client.update(Source::Local, created.id, &update_arguments).await.unwrap();

        assert_eq!(updated.reminders.len(), 1);
        assert_eq!(updated.reminders[0].id, created.reminders[0].id);
        assert_eq!(reminders_of(&temp_dir, created.id), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_identity_and_creation_date() {
        let (_temp_dir, client) = setup();

        let created = client.create(Source::Local, &TaskArguments::new("Before", Local::now())).await.unwrap();

        let mut arguments = created.arguments();
        arguments.title = "After".to_string();
        let updated = client.update(Source::Local, created.id, &arguments).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.creation_date, created.creation_date);
        assert_eq!(updated.title, "After");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let (_temp_dir, client) = setup();

        let result = client.update(Source::Local, Uuid::new_v4(), &TaskArguments::new("Ghost", Local::now())).await;
        assert!(matches!(result, Err(TasksError::NotFound)));
    }

    #[tokio::test]
    async fn test_caller_relocates_updated_task_in_cache() {
        let (_temp_dir, client) = setup();
        let now = Local::now();
        let tomorrow = now + Duration::days(1);

        let created = client.create(Source::Local, &TaskArguments::new("Mover", now)).await.unwrap();

        let mut arguments = created.arguments();
        arguments.due_date = tomorrow;
        let updated = client.update(Source::Local, created.id, &arguments).await.unwrap();
        client.cache().update_in_place(updated, now.date_naive()).await;

        assert!(client.cache().get(now.date_naive()).await.unwrap().is_empty());
        assert_eq!(client.cache().get(tomorrow.date_naive()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_task_and_reminders() {
        let (temp_dir, client) = setup();
        let now = Local::now();

        let mut arguments = TaskArguments::new("Doomed", now);
        arguments.reminders.push(ReminderArguments::new(now + Duration::hours(1)));
        let created = client.create(Source::Local, &arguments).await.unwrap();

        let deleted = client.delete(Source::Local, created.id).await.unwrap();
        assert_eq!(deleted.id, created.id);
        client.cache().remove(&deleted, deleted.day()).await;

        assert_eq!(reminders_of(&temp_dir, created.id), 0);
        let fetched = client.fetch(&[Source::Local], None, false, false).await;
        assert!(fetched.tasks.is_empty());
        assert!(client.cache().get(now.date_naive()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let (_temp_dir, client) = setup();

        let result = client.delete(Source::Local, Uuid::new_v4()).await;
        assert!(matches!(result, Err(TasksError::NotFound)));
    }

    #[tokio::test]
    async fn test_toggle_tick_sets_completion_date() {
        let (_temp_dir, client) = setup();

        let created = client.create(Source::Local, &TaskArguments::new("Toggle", Local::now())).await.unwrap();

        let ticked = client.update(Source::Local, created.id, &created.toggle_tick_arguments(true)).await.unwrap();
        assert!(ticked.ticked);
        assert!(ticked.completion_date.is_some());

        let unticked = client.update(Source::Local, created.id, &ticked.toggle_tick_arguments(false)).await.unwrap();
        assert!(!unticked.ticked);
        assert!(unticked.completion_date.is_none());
    }

    #[tokio::test]
    async fn test_fetch_for_day_returns_the_bucket() {
        let (_temp_dir, client) = setup();
        let now = Local::now();

        client.create(Source::Local, &TaskArguments::new("Today", now)).await.unwrap();
        client.create(Source::Local, &TaskArguments::new("Tomorrow", now + Duration::days(1))).await.unwrap();

        let fetched = client.fetch(&[Source::Local], Some(now.date_naive()), false, false).await;
        assert!(fetched.error.is_none());
        assert_eq!(fetched.tasks.len(), 1);
        assert_eq!(fetched.tasks[0].title, "Today");
    }

    #[tokio::test]
    async fn test_clear_wipes_local_store_and_cache() {
        let (_temp_dir, client) = setup();
        let now = Local::now();

        client.create(Source::Local, &TaskArguments::new("Gone soon", now)).await.unwrap();
        client.clear(Source::Local).await.unwrap();

        assert!(client.cache().get(now.date_naive()).await.is_none());
        let fetched = client.fetch(&[Source::Local], None, false, false).await;
        assert!(fetched.tasks.is_empty());
    }
}
