use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaseError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Case source request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Case source error: {message}")]
    SourceError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Source,
    Processing,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl CaseError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CaseError::InvalidConfigValueError { .. }
            | CaseError::MissingConfigError { .. }
            | CaseError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            CaseError::HttpError(_) | CaseError::SourceError { .. } => ErrorCategory::Source,
            CaseError::CsvError(_) | CaseError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
            CaseError::ZipError(_) | CaseError::SerializationError(_) => ErrorCategory::Output,
            CaseError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Source => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Processing | ErrorCategory::Output => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the command line flags or the TOML configuration file"
            }
            ErrorCategory::Source => "Check that the case source is reachable and retry",
            ErrorCategory::Processing => {
                "Check that the case file is a CSV with at least an 'input' column"
            }
            ErrorCategory::Output => "Check the output formats and the archive settings",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Source => format!("Could not read the test cases: {}", self),
            ErrorCategory::Processing => format!("Could not process the test cases: {}", self),
            ErrorCategory::Output => format!("Could not write the results: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

impl ErrorSeverity {
    /// Process exit code for a failed run at this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, CaseError>;
