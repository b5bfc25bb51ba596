use crate::core::ConfigProvider;
use crate::domain::format::REJECTION_MARKER;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_output_formats, validate_path,
    validate_source, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "date-cases")]
#[command(about = "Render a table of date-parsing test cases with precision-matched results")]
pub struct CliConfig {
    /// Case table: a CSV path or an http(s) URL
    #[arg(long, default_value = "cases.csv")]
    pub source: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Output formats: csv, tsv, json, html
    #[arg(long, value_delimiter = ',', default_value = "csv,html")]
    pub formats: Vec<String>,

    #[arg(long, default_value = REJECTION_MARKER)]
    pub rejection_marker: String,

    /// Bundle all outputs into this ZIP archive
    #[arg(long)]
    pub archive: Option<String>,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    /// Parse and format the given inputs, print them, and exit
    #[arg(long)]
    pub eval: Vec<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl ConfigProvider for CliConfig {
    fn source(&self) -> &str {
        &self.source
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn rejection_marker(&self) -> &str {
        &self.rejection_marker
    }

    fn archive_name(&self) -> Option<&str> {
        self.archive.as_deref()
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("rejection_marker", &self.rejection_marker)?;

        // --eval never touches the case table or the output directory.
        if !self.eval.is_empty() {
            return Ok(());
        }

        validate_source("source", &self.source)?;
        validate_path("output_path", &self.output_path)?;
        validate_output_formats("formats", &self.formats)?;
        if let Some(archive) = &self.archive {
            validate_file_extensions("archive", std::slice::from_ref(archive), &["zip"])?;
        }
        Ok(())
    }
}
