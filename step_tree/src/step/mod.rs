//! Classified steps and their exchange-format rendering

pub mod exchange;
pub mod types;

pub use exchange::{ExchangeFolder, ExchangeNode, ExchangeStep, ExchangeTree, EXCHANGE_LANGUAGE};
pub use types::{Category, ClassifiedStep};
