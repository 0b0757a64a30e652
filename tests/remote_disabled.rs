#[cfg(test)]
mod tests {
    use chrono::Local;
    use taskhive::api::remote::RemoteConfig;
    use taskhive::libs::client::{TasksClient, TasksError};
    use taskhive::libs::config::Config;
    use taskhive::libs::source::Source;
    use taskhive::libs::task::TaskArguments;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TasksClient) {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config {
            remote: Some(RemoteConfig {
                enabled: false,
                login: "someone".to_string(),
                auth_url: "https://auth.example.com".to_string(),
                api_url: "https://api.example.com".to_string(),
            }),
            notify: None,
        };
        let client = TasksClient::open(config, &temp_dir.path().join("taskhive.db")).unwrap();
        (temp_dir, client)
    }

    #[tokio::test]
    async fn test_local_data_survives_remote_outage() {
        let (_temp_dir, client) = setup();
        let today = Local::now().date_naive();

        let created = client.create(Source::Local, &TaskArguments::new("Still here", Local::now())).await.unwrap();

        let fetched = client.fetch(&[Source::Local, Source::Remote], Some(today), false, false).await;

        // The local store's data is returned alongside the remote error
        assert_eq!(fetched.tasks.len(), 1);
        assert_eq!(fetched.tasks[0].id, created.id);
        assert!(matches!(fetched.error, Some(TasksError::RemoteDisabledByUser)));

        // And it made it into the cache
        let bucket = client.cache().get(today).await.unwrap();
        assert_eq!(bucket.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_popped_from_ledger() {
        let (_temp_dir, client) = setup();
        let today = Local::now().date_naive();

        client.fetch(&[Source::Local, Source::Remote], Some(today), false, false).await;

        // The fetch was not fully successful, so it is not remembered
        assert!(client.ledger().history().await.is_empty());
    }

    #[tokio::test]
    async fn test_successful_fetch_stays_in_ledger() {
        let (_temp_dir, client) = setup();
        let today = Local::now().date_naive();

        client.fetch(&[Source::Local], Some(today), false, false).await;

        assert_eq!(client.ledger().history().await.len(), 1);
    }

    #[tokio::test]
    async fn test_create_on_disabled_remote_fails() {
        let (_temp_dir, client) = setup();

        let result = client.create(Source::Remote, &TaskArguments::new("Nope", Local::now())).await;
        assert!(matches!(result, Err(TasksError::RemoteDisabledByUser)));
    }

    #[tokio::test]
    async fn test_update_on_disabled_remote_fails() {
        let (_temp_dir, client) = setup();

        let local = client.create(Source::Local, &TaskArguments::new("Local only", Local::now())).await.unwrap();
        let result = client.update(Source::Remote, local.id, &local.arguments()).await;
        assert!(matches!(result, Err(TasksError::RemoteDisabledByUser)));
    }

    #[tokio::test]
    async fn test_unconfigured_remote_counts_as_disabled() {
        let temp_dir = tempfile::tempdir().unwrap();
        let client = TasksClient::open(Config::default(), &temp_dir.path().join("taskhive.db")).unwrap();

        let result = client.create(Source::Remote, &TaskArguments::new("Nope", Local::now())).await;
        assert!(matches!(result, Err(TasksError::RemoteDisabledByUser)));
    }
}
