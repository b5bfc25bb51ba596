pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::LocalStorage;

pub use core::{engine::CaseEngine, pipeline::CasePipeline};
pub use domain::format::{format, PrecisionFormatter, REJECTION_MARKER};
pub use domain::model::{ParseResult, TestCase};
pub use domain::parser::HostDateParser;
pub use domain::ports::DateParser;
pub use utils::error::{CaseError, Result};
