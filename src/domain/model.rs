use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of handing a raw date string to the host parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "timestamp", rename_all = "lowercase")]
pub enum ParseResult {
    Rejected,
    Accepted(DateTime<Utc>),
}

impl ParseResult {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ParseResult::Rejected)
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            ParseResult::Accepted(ts) => Some(*ts),
            ParseResult::Rejected => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub raw_input: String,
    pub description: Option<String>,
    pub expected: Option<String>,
    pub reference: Option<Reference>,
}

impl TestCase {
    pub fn new(raw_input: impl Into<String>) -> Self {
        Self {
            raw_input: raw_input.into(),
            description: None,
            expected: None,
            reference: None,
        }
    }
}

/// Consecutive cases sharing a heading. An empty title renders no group head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseGroup {
    pub title: String,
    pub cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub group: String,
    pub case: TestCase,
    pub result: ParseResult,
    pub output: String,
}

impl CaseOutcome {
    /// `None` when the case does not state an expected output.
    pub fn matches_expected(&self) -> Option<bool> {
        self.case
            .expected
            .as_deref()
            .filter(|expected| !expected.is_empty())
            .map(|expected| expected == self.output)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub mismatched: usize,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[CaseOutcome]) -> Self {
        let mut summary = RunSummary::default();
        for outcome in outcomes {
            summary.total += 1;
            if outcome.result.is_rejected() {
                summary.rejected += 1;
            } else {
                summary.accepted += 1;
            }
            if outcome.matches_expected() == Some(false) {
                summary.mismatched += 1;
            }
        }
        summary
    }
}

#[derive(Debug, Clone)]
pub struct RenderResult {
    pub outcomes: Vec<CaseOutcome>,
    pub csv_output: String,
    pub tsv_output: String,
    pub html_output: String,
    pub rejected: Vec<CaseOutcome>,
}

impl RenderResult {
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_outcomes(&self.outcomes)
    }
}
