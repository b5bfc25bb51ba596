use crate::core::{Pipeline, RunSummary};
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub output_path: String,
    pub summary: RunSummary,
}

/// Runs one rendering pass: extract the cases, format them, write the outputs.
pub struct CaseEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> CaseEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("Starting case rendering");

        tracing::info!("Extracting cases...");
        let groups = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} cases in {} groups",
            groups.iter().map(|g| g.cases.len()).sum::<usize>(),
            groups.len()
        );

        tracing::info!("Formatting cases...");
        let result = self.pipeline.transform(groups).await?;
        let summary = result.summary();
        tracing::info!(
            "Formatted {} cases: {} accepted, {} rejected",
            summary.total,
            summary.accepted,
            summary.rejected
        );
        if summary.mismatched > 0 {
            tracing::warn!(
                "{} cases differ from their expected output",
                summary.mismatched
            );
        }

        tracing::info!("Writing results...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(RunReport {
            output_path,
            summary,
        })
    }
}
