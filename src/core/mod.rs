pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{CaseGroup, CaseOutcome, ParseResult, RenderResult, RunSummary};
pub use crate::domain::ports::{ConfigProvider, DateParser, Pipeline, Storage};
pub use crate::utils::error::Result;
