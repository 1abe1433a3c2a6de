//! Shared text helpers used when building step identifiers and exchange text

pub mod text;

pub use text::{filter_short_name, replace_ascii_ctrl_chars};
