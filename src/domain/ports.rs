use crate::domain::model::{CaseGroup, ParseResult, RenderResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The host's date parser. Its accept/reject decision is taken as ground truth.
pub trait DateParser: Send + Sync {
    fn parse(&self, input: &str) -> ParseResult;
}

impl<F> DateParser for F
where
    F: Fn(&str) -> ParseResult + Send + Sync,
{
    fn parse(&self, input: &str) -> ParseResult {
        self(input)
    }
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// Case file path (relative to storage) or an http(s) URL.
    fn source(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn rejection_marker(&self) -> &str;
    /// Archive name when outputs are bundled, `None` to write plain files.
    fn archive_name(&self) -> Option<&str>;
    fn request_timeout_seconds(&self) -> u64 {
        30
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<CaseGroup>>;
    async fn transform(&self, groups: Vec<CaseGroup>) -> Result<RenderResult>;
    async fn load(&self, result: RenderResult) -> Result<String>;
}
