//! Command-line host for the `rpa-core` withholding engine.

pub mod batch;
pub mod config;
pub mod logging;
pub mod output;
pub mod utils;
