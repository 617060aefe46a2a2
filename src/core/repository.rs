use crate::core::{ConversionData, ConversionRate, RateOrigin, RateSource, RateStore, StoredRate};
use crate::utils::error::{CalcError, Result};
use std::time::Duration;

/// Network-first exchange rate lookup with a local fallback.
///
/// A successful live fetch is written to the store; when the fetch fails for
/// any reason the last stored rate is served instead.
pub struct RateRepository<S: RateSource, P: RateStore> {
    source: S,
    store: P,
    from: String,
    to: String,
    timeout: Duration,
}

impl<S: RateSource, P: RateStore> RateRepository<S, P> {
    pub fn new(source: S, store: P, from: &str, to: &str, timeout: Duration) -> Self {
        Self {
            source,
            store,
            from: from.to_string(),
            to: to.to_string(),
            timeout,
        }
    }

    pub fn from_currency(&self) -> &str {
        &self.from
    }

    pub fn to_currency(&self) -> &str {
        &self.to
    }

    pub async fn get_current_rate(&self) -> Result<ConversionData> {
        // 1. 先嘗試遠端 API
        match self.fetch_live().await {
            Ok(rate) => {
                tracing::info!(
                    "💱 Live rate 1 {} = {} {} ({})",
                    self.from,
                    rate.value(),
                    self.to,
                    rate.date()
                );
                if let Err(e) = self.store.save(&StoredRate::from_rate(&rate)).await {
                    tracing::warn!("Failed to persist exchange rate: {}", e);
                }
                return Ok(ConversionData::new(rate, RateOrigin::Live));
            }
            Err(e) => {
                tracing::warn!("Live rate fetch failed, falling back to cache: {}", e);
            }
        }

        // 2. 失敗時使用本地保存的匯率
        match self.store.load_last().await? {
            Some(stored) => {
                let rate = stored.to_rate()?;
                tracing::info!("📁 Using cached rate {} from {}", rate.value(), stored.saved_at);
                Ok(ConversionData::new(rate, RateOrigin::Cached))
            }
            None => Err(CalcError::RateUnavailableError {
                reason: "live fetch failed and no rate has been saved".to_string(),
            }),
        }
    }

    async fn fetch_live(&self) -> Result<ConversionRate> {
        tracing::debug!("Fetching {}/{} rate", self.from, self.to);
        match tokio::time::timeout(self.timeout, self.source.fetch_rate(&self.from, &self.to)).await
        {
            Ok(result) => result,
            Err(_) => Err(CalcError::TimeoutError {
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct MockSource {
        rate: Option<f64>,
        delay: Option<Duration>,
        calls: Arc<AtomicUsize>,
    }

    impl MockSource {
        fn returning(rate: f64) -> Self {
            Self {
                rate: Some(rate),
                delay: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing() -> Self {
            Self {
                rate: None,
                delay: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait::async_trait]
    impl RateSource for MockSource {
        async fn fetch_rate(&self, _from: &str, to: &str) -> Result<ConversionRate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.rate {
                Some(rate) => ConversionRate::new(rate, "2024-05-17"),
                None => Err(CalcError::RateNotFoundError {
                    currency: to.to_string(),
                }),
            }
        }
    }

    #[derive(Clone, Default)]
    struct MockStore {
        saved: Arc<Mutex<Option<StoredRate>>>,
        fail_writes: bool,
    }

    impl MockStore {
        fn with_rate(rate: f64, date: &str) -> Self {
            let stored = StoredRate::from_rate(&ConversionRate::new(rate, date).unwrap());
            Self {
                saved: Arc::new(Mutex::new(Some(stored))),
                fail_writes: false,
            }
        }
    }

    impl RateStore for MockStore {
        async fn save(&self, record: &StoredRate) -> Result<()> {
            if self.fail_writes {
                return Err(CalcError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            *self.saved.lock().await = Some(record.clone());
            Ok(())
        }

        async fn load_last(&self) -> Result<Option<StoredRate>> {
            Ok(self.saved.lock().await.clone())
        }
    }

    fn repository(source: MockSource, store: MockStore) -> RateRepository<MockSource, MockStore> {
        RateRepository::new(source, store, "EUR", "JPY", Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_live_rate_is_returned_and_persisted() {
        let store = MockStore::default();
        let repo = repository(MockSource::returning(162.5), store.clone());

        let data = repo.get_current_rate().await.unwrap();

        assert_eq!(data.origin, RateOrigin::Live);
        assert_eq!(data.rate.value(), 162.5);
        assert_eq!(data.rate.date(), "2024-05-17");
        let saved = store.saved.lock().await.clone().unwrap();
        assert_eq!(saved.rate, 162.5);
    }

    #[tokio::test]
    async fn test_failed_fetch_falls_back_to_cache() {
        let store = MockStore::with_rate(158.0, "2024-05-10");
        let source = MockSource::failing();
        let calls = source.calls.clone();
        let repo = repository(source, store);

        let data = repo.get_current_rate().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(data.origin, RateOrigin::Cached);
        assert_eq!(data.rate.value(), 158.0);
        assert_eq!(data.rate.date(), "2024-05-10");
    }

    #[tokio::test]
    async fn test_no_rate_anywhere_is_an_error() {
        let repo = repository(MockSource::failing(), MockStore::default());

        let err = repo.get_current_rate().await.unwrap_err();
        assert!(matches!(err, CalcError::RateUnavailableError { .. }));
    }

    #[tokio::test]
    async fn test_save_failure_does_not_hide_live_rate() {
        let store = MockStore {
            fail_writes: true,
            ..MockStore::default()
        };
        let repo = repository(MockSource::returning(165.0), store);

        let data = repo.get_current_rate().await.unwrap();
        assert_eq!(data.origin, RateOrigin::Live);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out_to_cache() {
        let store = MockStore::with_rate(150.0, "2024-05-01");
        let source = MockSource::returning(170.0).with_delay(Duration::from_secs(60));
        let repo = repository(source, store);

        let data = repo.get_current_rate().await.unwrap();
        assert_eq!(data.origin, RateOrigin::Cached);
        assert_eq!(data.rate.value(), 150.0);
    }
}
