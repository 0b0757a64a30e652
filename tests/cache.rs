#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Local};
    use taskhive::libs::cache::TaskStore;
    use taskhive::libs::source::Source;
    use taskhive::libs::task::Task;
    use uuid::Uuid;

    fn make_task(title: &str, due_date: DateTime<Local>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            notes: None,
            ticked: false,
            due_date,
            completion_date: None,
            creation_date: Local::now(),
            source: Source::Local,
            reminders: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_add_merging_dedups_by_id() {
        let store = TaskStore::new();
        let now = Local::now();

        let task = make_task("Original", now);
        let mut renamed = task.clone();
        renamed.title = "Renamed".to_string();
        let other = make_task("Other", now);

        store.add_merging(vec![task.clone(), other.clone()]).await;
        store.add_merging(vec![renamed.clone()]).await;

        let bucket = store.get(now.date_naive()).await.unwrap();
        assert_eq!(bucket.len(), 2);

        // No id lost, exactly one task per id
        let ids: Vec<Uuid> = bucket.iter().map(|task| task.id).collect();
        assert!(ids.contains(&task.id));
        assert!(ids.contains(&other.id));
    }

    #[tokio::test]
    async fn test_add_merging_incoming_wins() {
        let store = TaskStore::new();
        let now = Local::now();

        let mut local_version = make_task("Local", now);
        local_version.source = Source::Local;
        let mut remote_version = local_version.clone();
        remote_version.title = "Remote".to_string();
        remote_version.source = Source::Remote;

        store.add_merging(vec![local_version.clone()]).await;
        store.add_merging(vec![remote_version]).await;

        let bucket = store.get(now.date_naive()).await.unwrap();
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].title, "Remote");
    }

    #[tokio::test]
    async fn test_add_merging_first_passed_wins_within_one_call() {
        let store = TaskStore::new();
        let now = Local::now();

        let local_version = make_task("Local", now);
        let mut remote_version = local_version.clone();
        remote_version.title = "Remote".to_string();

        // Both stores returned the same id for the same day
        store.add_merging(vec![local_version, remote_version]).await;

        let bucket = store.get(now.date_naive()).await.unwrap();
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].title, "Local");
    }

    #[tokio::test]
    async fn test_add_merging_buckets_by_due_day() {
        let store = TaskStore::new();
        let now = Local::now();
        let tomorrow = now + Duration::days(1);

        store.add_merging(vec![make_task("Today", now), make_task("Tomorrow", tomorrow), make_task("Also today", now)]).await;

        let today_bucket = store.get(now.date_naive()).await.unwrap();
        let tomorrow_bucket = store.get(tomorrow.date_naive()).await.unwrap();
        assert_eq!(today_bucket.len(), 2);
        assert_eq!(tomorrow_bucket.len(), 1);

        for task in today_bucket {
            assert_eq!(task.day(), now.date_naive());
        }
    }

    #[tokio::test]
    async fn test_remove_rewrites_bucket() {
        let store = TaskStore::new();
        let now = Local::now();

        let task = make_task("Removable", now);
        let kept = make_task("Kept", now);
        store.add_merging(vec![task.clone(), kept.clone()]).await;

        let removed = store.remove(&task, now.date_naive()).await;
        assert_eq!(removed.map(|task| task.id), Some(task.id));

        let bucket = store.get(now.date_naive()).await.unwrap();
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].id, kept.id);
    }

    #[tokio::test]
    async fn test_move_task_between_days() {
        let store = TaskStore::new();
        let now = Local::now();
        let tomorrow = now + Duration::days(1);

        let task = make_task("Mover", now);
        store.add_single(task.clone()).await;

        let mut moved = task.clone();
        moved.due_date = tomorrow;
        store.move_task(moved.clone(), now.date_naive(), tomorrow.date_naive()).await;

        assert!(store.get(now.date_naive()).await.unwrap().is_empty());
        let destination = store.get(tomorrow.date_naive()).await.unwrap();
        assert_eq!(destination.len(), 1);
        assert_eq!(destination[0].id, task.id);
    }

    #[tokio::test]
    async fn test_move_task_same_day_is_noop() {
        let store = TaskStore::new();
        let now = Local::now();

        let task = make_task("Stayer", now);
        store.add_single(task.clone()).await;
        store.move_task(task.clone(), now.date_naive(), now.date_naive()).await;

        let bucket = store.get(now.date_naive()).await.unwrap();
        assert_eq!(bucket.len(), 1);
    }

    #[tokio::test]
    async fn test_update_in_place_relocates_on_due_date_change() {
        let store = TaskStore::new();
        let now = Local::now();
        let tomorrow = now + Duration::days(1);

        let task = make_task("Updatable", now);
        store.add_single(task.clone()).await;

        let mut updated = task.clone();
        updated.title = "Updated".to_string();
        updated.due_date = tomorrow;
        store.update_in_place(updated, now.date_naive()).await;

        assert!(store.get(now.date_naive()).await.unwrap().is_empty());
        let destination = store.get(tomorrow.date_naive()).await.unwrap();
        assert_eq!(destination.len(), 1);
        assert_eq!(destination[0].title, "Updated");
    }

    #[tokio::test]
    async fn test_update_in_place_same_day_replaces() {
        let store = TaskStore::new();
        let now = Local::now();

        let task = make_task("Before", now);
        store.add_single(task.clone()).await;

        let mut updated = task.clone();
        updated.title = "After".to_string();
        store.update_in_place(updated, now.date_naive()).await;

        let bucket = store.get(now.date_naive()).await.unwrap();
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].title, "After");
    }

    #[tokio::test]
    async fn test_set_bucket_overwrites() {
        let store = TaskStore::new();
        let now = Local::now();

        store.add_merging(vec![make_task("Old", now)]).await;
        store.set_bucket(now.date_naive(), vec![make_task("New", now)]).await;

        let bucket = store.get(now.date_naive()).await.unwrap();
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].title, "New");
    }
}
