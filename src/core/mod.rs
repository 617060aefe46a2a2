pub mod controller;
pub mod conversion;
pub mod evaluator;
pub mod format;
pub mod rate_feed;
pub mod repository;

pub use crate::domain::model::{
    ConversionData, ConversionMode, ConversionRate, EvaluationResult, InputEvent, RateOrigin,
    StoredRate,
};
pub use crate::domain::ports::{ConfigProvider, RateSource, RateStore};
pub use crate::utils::error::Result;
