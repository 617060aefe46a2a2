use crate::core::{RateStore, StoredRate};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

pub const DEFAULT_CACHE_PATH: &str = "./.small-calc/exchange_rate.json";

/// JSON file holding the last successfully fetched rate.
#[derive(Debug, Clone)]
pub struct FileRateStore {
    path: PathBuf,
}

impl FileRateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the new record is written to before it replaces the cache.
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RateStore for FileRateStore {
    async fn save(&self, record: &StoredRate) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // 先寫暫存檔再 rename，中途中斷不會留下半份快取
        let json = serde_json::to_vec_pretty(record)?;
        let staging = self.staging_path();
        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        tracing::debug!("Saved exchange rate to {}", self.path.display());
        Ok(())
    }

    async fn load_last(&self) -> Result<Option<StoredRate>> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record = serde_json::from_slice(&data)?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConversionRate;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRateStore::new(temp_dir.path().join("rate.json"));

        assert!(store.load_last().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRateStore::new(temp_dir.path().join("nested/dir/rate.json"));
        let rate = ConversionRate::new(161.25, "2024-05-17").unwrap();

        store.save(&StoredRate::from_rate(&rate)).await.unwrap();
        let loaded = store.load_last().await.unwrap().unwrap();

        assert!(store.path().exists());
        assert_eq!(loaded.rate, 161.25);
        assert_eq!(loaded.date, "2024-05-17");
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_rate() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRateStore::new(temp_dir.path().join("rate.json"));

        for value in [150.0, 155.0] {
            let rate = ConversionRate::new(value, "2024-05-17").unwrap();
            store.save(&StoredRate::from_rate(&rate)).await.unwrap();
        }

        assert_eq!(store.load_last().await.unwrap().unwrap().rate, 155.0);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rate.json");
        std::fs::write(&path, b"{ broken").unwrap();

        let store = FileRateStore::new(path);
        assert!(store.load_last().await.is_err());
    }

    #[tokio::test]
    async fn test_save_replaces_cache_through_staging_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rate.json");
        let store = FileRateStore::new(&path);

        // 上次中斷留下的暫存檔不影響讀取，也會被下一次寫入覆蓋
        let previous = ConversionRate::new(150.0, "2024-05-16").unwrap();
        store.save(&StoredRate::from_rate(&previous)).await.unwrap();
        std::fs::write(temp_dir.path().join("rate.json.tmp"), b"{ half writ").unwrap();
        assert_eq!(store.load_last().await.unwrap().unwrap().rate, 150.0);

        let rate = ConversionRate::new(161.25, "2024-05-17").unwrap();
        store.save(&StoredRate::from_rate(&rate)).await.unwrap();

        assert!(!temp_dir.path().join("rate.json.tmp").exists());
        assert_eq!(store.load_last().await.unwrap().unwrap().rate, 161.25);
    }
}
