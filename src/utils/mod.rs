//! Utility modules

pub mod logging;

pub use logging::{init_logger, init_logger_with_level};
