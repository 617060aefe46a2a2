use crate::domain::model::{ConversionMode, ConversionRate, StoredRate};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 匯率持久化：只保存最後一次成功取得的匯率
pub trait RateStore: Send + Sync {
    fn save(&self, record: &StoredRate) -> impl std::future::Future<Output = Result<()>> + Send;
    fn load_last(&self) -> impl std::future::Future<Output = Result<Option<StoredRate>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn from_currency(&self) -> &str;
    fn to_currency(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn refresh_interval(&self) -> Option<Duration>;
    fn cache_path(&self) -> &str;
    fn default_rate(&self) -> f64;
    fn conversion_mode(&self) -> ConversionMode;
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rate(&self, from: &str, to: &str) -> Result<ConversionRate>;
}
