use crate::core::repository::RateRepository;
use crate::core::{ConversionData, RateSource, RateStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Background exchange rate fetch publishing into a watch slot.
///
/// The slot starts at the default rate. Every successful lookup replaces it;
/// failures leave the previous value in place. Dropping the feed aborts the
/// task.
pub struct RateFeed {
    receiver: watch::Receiver<ConversionData>,
    handle: JoinHandle<()>,
}

impl RateFeed {
    pub fn spawn<S, P>(
        repository: Arc<RateRepository<S, P>>,
        initial: ConversionData,
        refresh: Option<Duration>,
    ) -> Self
    where
        S: RateSource + 'static,
        P: RateStore + 'static,
    {
        let (sender, receiver) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            loop {
                match repository.get_current_rate().await {
                    Ok(data) => {
                        if sender.send(data).is_err() {
                            tracing::debug!("All rate subscribers dropped, stopping feed");
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("⚠️ Keeping previous exchange rate: {}", e);
                    }
                }

                let Some(interval) = refresh else {
                    return;
                };
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = sender.closed() => return,
                }
            }
        });

        Self { receiver, handle }
    }

    /// 目前的匯率快照（可能仍是預設值）
    pub fn current(&self) -> ConversionData {
        self.receiver.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversionData> {
        self.receiver.clone()
    }

    /// Wait for the next published rate. Returns `false` once the task has
    /// finished and nothing more will arrive.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for RateFeed {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConversionRate, RateOrigin, StoredRate};
    use crate::utils::error::{CalcError, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl RateSource for CountingSource {
        async fn fetch_rate(&self, _from: &str, _to: &str) -> Result<ConversionRate> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CalcError::TimeoutError { seconds: 1 });
            }
            ConversionRate::new(160.0 + n as f64, "2024-05-17")
        }
    }

    struct EmptyStore;

    impl RateStore for EmptyStore {
        async fn save(&self, _record: &StoredRate) -> Result<()> {
            Ok(())
        }

        async fn load_last(&self) -> Result<Option<StoredRate>> {
            Ok(None)
        }
    }

    fn repository(fail: bool) -> (Arc<RateRepository<CountingSource, EmptyStore>>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            calls: calls.clone(),
            fail,
        };
        let repo = RateRepository::new(source, EmptyStore, "EUR", "JPY", Duration::from_secs(1));
        (Arc::new(repo), calls)
    }

    #[tokio::test]
    async fn test_feed_starts_with_default_then_publishes() {
        let (repo, _) = repository(false);
        let mut feed = RateFeed::spawn(repo, ConversionData::fallback(170.0), None);

        // 啟動前即可讀到預設值
        assert!(matches!(
            feed.current().origin,
            RateOrigin::Default | RateOrigin::Live
        ));

        if feed.current().origin == RateOrigin::Default {
            assert!(feed.changed().await);
        }
        let data = feed.current();
        assert_eq!(data.origin, RateOrigin::Live);
        assert_eq!(data.rate.value(), 160.0);
    }

    #[tokio::test]
    async fn test_failures_keep_default_rate() {
        let (repo, calls) = repository(true);
        let mut feed = RateFeed::spawn(repo, ConversionData::fallback(170.0), None);

        // 任務結束後 sender 被丟棄，changed() 回傳 false
        assert!(!feed.changed().await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let data = feed.current();
        assert_eq!(data.origin, RateOrigin::Default);
        assert_eq!(data.rate.value(), 170.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_refresh() {
        let (repo, calls) = repository(false);
        let mut feed = RateFeed::spawn(
            repo,
            ConversionData::fallback(170.0),
            Some(Duration::from_secs(60)),
        );

        assert!(feed.changed().await);
        assert!(feed.changed().await);
        assert!(calls.load(Ordering::SeqCst) >= 2);
        assert_eq!(feed.current().rate.value(), 161.0);

        feed.cancel();
        tokio::task::yield_now().await;
        assert!(!feed.changed().await);
    }
}
