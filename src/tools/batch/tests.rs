#[cfg(test)]
mod tests {
    use crate::tools::batch::{batch, batch_ordered};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tokio::time::{sleep, Duration};

    #[tokio::test]
    async fn test_batch_basic() {
        let pages = vec!["a", "bb", "ccc"];
        let mut lengths = batch(pages, 2, |p| async move { p.len() }).await;
        lengths.sort();
        assert_eq!(lengths, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_batch_empty() {
        let items: Vec<u32> = vec![];
        assert!(batch(items, 4, |n| async move { n }).await.is_empty());
    }

    #[tokio::test]
    async fn test_batch_zero_concurrency_still_runs() {
        let results = batch(vec![1, 2], 0, |n| async move { n + 1 }).await;
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_batch_ordered_keeps_input_order() {
        // later items finish first
        let delays = vec![30u64, 20, 10, 0];
        let results = batch_ordered(delays, 4, |ms| async move {
            sleep(Duration::from_millis(ms)).await;
            ms
        })
        .await;
        assert_eq!(results, vec![30, 20, 10, 0]);
    }

    #[tokio::test]
    async fn test_batch_concurrency_limit() {
        let in_flight = Arc::new(Mutex::new((0usize, 0usize)));
        let handle = Arc::clone(&in_flight);

        let results = batch((0..10).collect::<Vec<_>>(), 3, move |_| {
            let counters = Arc::clone(&handle);
            async move {
                {
                    let mut c = counters.lock().await;
                    c.0 += 1;
                    c.1 = c.1.max(c.0);
                }
                sleep(Duration::from_millis(10)).await;
                counters.lock().await.0 -= 1;
            }
        })
        .await;

        assert_eq!(results.len(), 10);
        let peak = in_flight.lock().await.1;
        assert!(peak <= 3, "peak concurrency was {}", peak);
    }
}
