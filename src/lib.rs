pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{FileRateStore, FrankfurterClient};
pub use app::CalculatorSession;
pub use core::{
    controller::InputBufferController,
    evaluator::{calculate, evaluate},
    rate_feed::RateFeed,
    repository::RateRepository,
};
pub use utils::error::{CalcError, EvalError, Result};
