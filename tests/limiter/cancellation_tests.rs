// tests/limiter/cancellation_tests.rs

#[cfg(test)]
mod tests {
    use crate::fixtures::manual_ticker::ManualTicker;
    use crate::fixtures::panicking_ticker::PanickingTicker;
    use bucket_limiter::{LimiterError, TickerError, TokenBucket};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[tokio::test(start_paused = true)]
    async fn cancellation_freezes_token_count() {
        let bucket = TokenBucket::new(3, Duration::from_secs(1)).unwrap();
        let cancel = CancellationToken::new();
        let task = bucket.spawn_refill(&cancel).unwrap();

        assert!(bucket.try_consume());
        assert!(bucket.try_consume());
        cancel.cancel();

        // several periods later no refill has happened
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(bucket.available(), 1);
        assert!(task.is_finished());
        assert!(task.stop().await.is_ok());

        // admission still works against the frozen count
        assert!(bucket.try_consume());
        assert!(!bucket.try_consume());
    }

    #[tokio::test]
    async fn stop_releases_ticker() {
        let bucket = TokenBucket::new(2, Duration::from_secs(1)).unwrap();
        let cancel = CancellationToken::new();
        let (ticker, mut handle) = ManualTicker::new();
        let task = bucket.spawn_refill_with(ticker, &cancel).unwrap();

        assert!(bucket.try_consume());
        assert!(bucket.try_consume());
        task.stop().await.unwrap();

        // the loop dropped its ticker, so ticks go nowhere
        assert!(!handle.tick().await);
        assert_eq!(bucket.available(), 0);
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test]
    async fn dropping_task_stops_loop() {
        let bucket = TokenBucket::new(1, Duration::from_secs(1)).unwrap();
        let cancel = CancellationToken::new();
        let (ticker, mut handle) = ManualTicker::new();
        let task = bucket.spawn_refill_with(ticker, &cancel).unwrap();

        assert!(handle.tick().await);
        drop(task);

        assert!(bucket.try_consume());
        assert!(!handle.tick().await);
        assert!(!bucket.try_consume());
    }

    #[tokio::test]
    async fn parent_cancellation_reaches_child_loop() {
        let bucket = TokenBucket::new(1, Duration::from_secs(1)).unwrap();
        let parent = CancellationToken::new();
        let (ticker, mut handle) = ManualTicker::new();
        let task = bucket.spawn_refill_with(ticker, &parent).unwrap();

        parent.cancel();
        assert!(task.is_cancelled());
        assert!(task.stop().await.is_ok());
        assert!(!handle.tick().await);
    }

    #[tokio::test]
    async fn closed_tick_source_is_reported() {
        let bucket = TokenBucket::new(1, Duration::from_secs(1)).unwrap();
        let cancel = CancellationToken::new();
        let (ticker, handle) = ManualTicker::new();
        drop(handle);

        let result = bucket.run_with(ticker, cancel).await;
        assert!(matches!(
            result.unwrap_err(),
            LimiterError::Ticker(TickerError::Closed)
        ));
    }

    #[tokio::test]
    async fn already_cancelled_token_never_refills() {
        let bucket = TokenBucket::new(1, Duration::from_secs(1)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(bucket.try_consume());

        let (ticker, _handle) = ManualTicker::new();
        assert!(bucket.run_with(ticker, cancel).await.is_ok());
        assert_eq!(bucket.available(), 0);
    }

    #[tokio::test]
    async fn panicked_refill_loop_is_reported_on_stop() {
        let bucket = TokenBucket::new(2, Duration::from_secs(1)).unwrap();
        let cancel = CancellationToken::new();
        let task = bucket.spawn_refill_with(PanickingTicker, &cancel).unwrap();

        // let the loop run into the panic before stopping it
        while !task.is_finished() {
            tokio::task::yield_now().await;
        }

        match task.stop().await {
            Err(LimiterError::RefillTask(reason)) => assert!(reason.contains("panic")),
            other => panic!("Expected RefillTask, got: {:?}", other),
        }

        // the bucket itself is untouched and still admits calls
        assert!(bucket.try_consume());
        assert_eq!(bucket.available(), 1);
    }
}
