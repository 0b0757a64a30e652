#[cfg(test)]
mod tests {
    use chrono::{Duration, Local};
    use taskhive::db::reminders::LocalReminders;
    use taskhive::db::tasks::LocalTasks;
    use taskhive::libs::query::TaskQuery;
    use taskhive::libs::reminder::ReminderArguments;
    use taskhive::libs::task::TaskArguments;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use uuid::Uuid;

    struct TaskTestContext {
        _temp_dir: TempDir,
        db_path: std::path::PathBuf,
    }

    impl TestContext for TaskTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("taskhive.db");
            TaskTestContext { _temp_dir: temp_dir, db_path }
        }
    }

    impl TaskTestContext {
        fn tasks(&self) -> LocalTasks {
            LocalTasks::open(&self.db_path).unwrap()
        }

        fn reminders(&self) -> LocalReminders {
            LocalReminders::open(&self.db_path).unwrap()
        }
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_create_and_list(ctx: &mut TaskTestContext) {
        let tasks = ctx.tasks();

        let created = tasks.create(&TaskArguments::new("Test task", Local::now())).unwrap();
        assert!(!created.ticked);

        let all = tasks.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, created.id);
        assert_eq!(all[0].title, "Test task");
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_create_honors_given_id(ctx: &mut TaskTestContext) {
        let tasks = ctx.tasks();

        let id = Uuid::new_v4();
        let mut arguments = TaskArguments::new("Pinned id", Local::now());
        arguments.id = Some(id);

        let created = tasks.create(&arguments).unwrap();
        assert_eq!(created.id, id);

        let found = tasks.find(&TaskQuery::id_is(id)).unwrap();
        assert!(found.is_some());
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_update(ctx: &mut TaskTestContext) {
        let tasks = ctx.tasks();

        let created = tasks.create(&TaskArguments::new("Original title", Local::now())).unwrap();

        // Update the task
        let mut arguments = created.arguments();
        arguments.title = "Updated title".to_string();
        arguments.notes = Some("Some notes".to_string());
        let updated = tasks.update(&created, &arguments).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.creation_date, created.creation_date);

        // Verify the update round-trips through the store
        let found = tasks.find(&TaskQuery::id_is(created.id)).unwrap().unwrap();
        assert_eq!(found.title, "Updated title");
        assert_eq!(found.notes, Some("Some notes".to_string()));
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_task_delete_cascades_reminders(ctx: &mut TaskTestContext) {
        let tasks = ctx.tasks();
        let reminders = ctx.reminders();

        let created = tasks.create(&TaskArguments::new("With reminders", Local::now())).unwrap();
        reminders.create(created.id, &ReminderArguments::new(Local::now())).unwrap();
        reminders.create(created.id, &ReminderArguments::new(Local::now() + Duration::hours(1))).unwrap();
        assert_eq!(reminders.for_task(created.id).unwrap().len(), 2);

        tasks.delete(&created).unwrap();

        // The task and both reminders are gone
        assert!(tasks.find(&TaskQuery::id_is(created.id)).unwrap().is_none());
        assert_eq!(reminders.for_task(created.id).unwrap().len(), 0);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_filter_by_day(ctx: &mut TaskTestContext) {
        let tasks = ctx.tasks();

        let today = Local::now();
        let yesterday = today - Duration::days(1);
        tasks.create(&TaskArguments::new("Due today", today)).unwrap();
        tasks.create(&TaskArguments::new("Due yesterday", yesterday)).unwrap();

        let todays = tasks.filter(&TaskQuery::due_on(today.date_naive()), None).unwrap();
        assert_eq!(todays.len(), 1);
        assert_eq!(todays[0].title, "Due today");
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_update_many_due_dates_is_batched(ctx: &mut TaskTestContext) {
        let tasks = ctx.tasks();

        let yesterday = Local::now() - Duration::days(1);
        let first = tasks.create(&TaskArguments::new("First", yesterday)).unwrap();
        let second = tasks.create(&TaskArguments::new("Second", yesterday)).unwrap();
        let untouched = tasks.create(&TaskArguments::new("Untouched", yesterday)).unwrap();

        let now = Local::now();
        tasks.update_many_due_dates(&[first.clone(), second.clone()], &now).unwrap();

        let all = tasks.list().unwrap();
        for task in all {
            if task.id == untouched.id {
                assert_eq!(task.day(), yesterday.date_naive());
            } else {
                assert_eq!(task.day(), now.date_naive());
            }
        }

        // Empty input is a no-op
        tasks.update_many_due_dates(&[], &now).unwrap();
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_find_with_limit_returns_first(ctx: &mut TaskTestContext) {
        let tasks = ctx.tasks();

        tasks.create(&TaskArguments::new("One", Local::now())).unwrap();
        tasks.create(&TaskArguments::new("Two", Local::now())).unwrap();

        let found = tasks.find(&TaskQuery::all()).unwrap();
        assert!(found.is_some());
    }
}
