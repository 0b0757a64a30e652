#[cfg(test)]
mod tests {
    use chrono::Local;
    use taskhive::libs::fetch_context::{FetchContext, FetchContextStore};
    use taskhive::libs::source::Source;

    #[tokio::test]
    async fn test_should_fetch_always_answers_true() {
        let ledger = FetchContextStore::new();
        let today = Local::now().date_naive();

        let context = FetchContext::new(today, &[Source::Local]);
        assert!(ledger.should_fetch(context.clone(), false).await);
        assert!(ledger.should_fetch(context, false).await);
    }

    #[tokio::test]
    async fn test_known_context_is_not_duplicated() {
        let ledger = FetchContextStore::new();
        let today = Local::now().date_naive();

        let context = FetchContext::new(today, &[Source::Local]);
        ledger.should_fetch(context.clone(), false).await;
        ledger.should_fetch(context, false).await;

        assert_eq!(ledger.history().await.len(), 1);
    }

    #[tokio::test]
    async fn test_same_day_different_sources_prunes_stale_entry() {
        let ledger = FetchContextStore::new();
        let today = Local::now().date_naive();

        ledger.should_fetch(FetchContext::new(today, &[Source::Local]), false).await;
        ledger.should_fetch(FetchContext::new(today, &[Source::Local, Source::Remote]), false).await;

        let history = ledger.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].sources(), &[Source::Local, Source::Remote]);
    }

    #[tokio::test]
    async fn test_force_fetch_always_appends() {
        let ledger = FetchContextStore::new();
        let today = Local::now().date_naive();

        let context = FetchContext::new(today, &[Source::Local]);
        ledger.should_fetch(context.clone(), true).await;
        ledger.should_fetch(context, true).await;

        assert_eq!(ledger.history().await.len(), 2);
    }

    #[tokio::test]
    async fn test_pop_last_forgets_most_recent() {
        let ledger = FetchContextStore::new();
        let today = Local::now().date_naive();
        let tomorrow = today + chrono::Days::new(1);

        ledger.append(FetchContext::new(today, &[Source::Local])).await;
        ledger.append(FetchContext::new(tomorrow, &[Source::Local])).await;

        let popped = ledger.pop_last().await.unwrap();
        assert_eq!(popped.day, tomorrow);
        assert_eq!(ledger.history().await.len(), 1);
    }

    #[tokio::test]
    async fn test_source_sets_are_normalized() {
        let context_a = FetchContext::new(Local::now().date_naive(), &[Source::Remote, Source::Local]);
        let context_b = FetchContext::new(Local::now().date_naive(), &[Source::Local, Source::Remote, Source::Local]);
        assert_eq!(context_a, context_b);
    }

    #[tokio::test]
    async fn test_replace_swaps_history() {
        let ledger = FetchContextStore::new();
        let today = Local::now().date_naive();

        ledger.append(FetchContext::new(today, &[Source::Local])).await;
        ledger.replace(Vec::new()).await;

        assert!(ledger.history().await.is_empty());
    }
}
