//! Conversion settings
//!
//! Defaults are read from `STEPTREE_*` environment variables; a TOML file or the
//! `with_*` builders override them.

pub mod error;
pub mod locale;
pub mod runtime;

pub use error::{ConfigError, ConfigResult};
pub use locale::{Language, Localization};
pub use runtime::{
    ConversionConfig, LoggingPreferences, SpecialTestStep, DEFAULT_MAX_SUB_CASE_DEPTH,
    DEFAULT_MAX_SUB_CASE_LEVEL,
};
