// Adapters layer: concrete implementations of the domain ports (HTTP rate source, file store).

pub mod http;
pub mod storage;

pub use http::FrankfurterClient;
pub use storage::FileRateStore;
