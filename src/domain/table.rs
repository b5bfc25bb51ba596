//! Case table input and rendered outputs.
//!
//! Cases come from a CSV file with the header
//! `group,input,description,expected,reference,reference_url`; only `input`
//! is required. Consecutive rows sharing a `group` value form one group.

use crate::domain::model::{CaseGroup, CaseOutcome, Reference, TestCase};
use crate::utils::error::{CaseError, Result};
use serde::Deserialize;

/// Input, description, expected, reference and result.
pub const TABLE_COLUMNS: usize = 5;

pub const LINK_SUFFIX: &str = "→";

#[derive(Debug, Deserialize)]
struct CaseRow {
    #[serde(default)]
    group: String,
    input: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    expected: String,
    #[serde(default)]
    reference: String,
    #[serde(default)]
    reference_url: String,
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl From<CaseRow> for TestCase {
    fn from(row: CaseRow) -> Self {
        let reference = non_empty(row.reference_url).map(|url| Reference {
            label: non_empty(row.reference).unwrap_or_else(|| url.clone()),
            url,
        });

        TestCase {
            raw_input: row.input,
            description: non_empty(row.description),
            expected: non_empty(row.expected),
            reference,
        }
    }
}

pub fn read_case_table(data: &[u8]) -> Result<Vec<CaseGroup>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    if !headers.iter().any(|h| h == "input") {
        return Err(CaseError::ProcessingError {
            message: format!(
                "case table has no 'input' column (found: {})",
                headers.iter().collect::<Vec<_>>().join(", ")
            ),
        });
    }

    let mut groups: Vec<CaseGroup> = Vec::new();
    for row in reader.deserialize::<CaseRow>() {
        let row = row?;
        let title = row.group.trim().to_string();
        let case = TestCase::from(row);

        match groups.last_mut() {
            Some(group) if group.title == title => group.cases.push(case),
            _ => groups.push(CaseGroup {
                title,
                cases: vec![case],
            }),
        }
    }

    tracing::debug!(
        "Read {} groups with {} cases",
        groups.len(),
        groups.iter().map(|g| g.cases.len()).sum::<usize>()
    );
    Ok(groups)
}

pub fn escape_html_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_html_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn text_cell(value: Option<&str>) -> String {
    format!("<td>{}</td>", escape_html_text(value.unwrap_or_default()))
}

fn reference_cell(reference: Option<&Reference>) -> String {
    match reference {
        Some(reference) => {
            let url = escape_html_attr(&reference.url);
            format!(
                "<td data-ref=\"{url}\"><a href=\"{url}\" target=\"_blank\">{}{LINK_SUFFIX}</a></td>",
                escape_html_text(&reference.label)
            )
        }
        None => "<td></td>".to_string(),
    }
}

fn result_cell(outcome: &CaseOutcome) -> String {
    if outcome.result.is_rejected() {
        format!("<td><code>{}</code></td>", escape_html_text(&outcome.output))
    } else {
        text_cell(Some(&outcome.output))
    }
}

pub fn render_group_head(title: &str) -> String {
    format!(
        "<tr class=\"group-head\"><th colspan=\"{TABLE_COLUMNS}\">{}</th></tr>",
        escape_html_text(title)
    )
}

pub fn render_case_row(outcome: &CaseOutcome) -> String {
    let case = &outcome.case;
    format!(
        "<tr>{}{}{}{}{}</tr>",
        text_cell(Some(&case.raw_input)),
        text_cell(case.description.as_deref()),
        text_cell(case.expected.as_deref()),
        reference_cell(case.reference.as_ref()),
        result_cell(outcome)
    )
}

/// Renders outcomes in order, opening a group head whenever the group title
/// changes to a non-empty one.
pub fn render_html(outcomes: &[CaseOutcome]) -> String {
    let mut lines = vec!["<table class=\"cases\">".to_string(), "<tbody>".to_string()];
    let mut current_group: Option<&str> = None;

    for outcome in outcomes {
        if current_group != Some(outcome.group.as_str()) {
            current_group = Some(outcome.group.as_str());
            if !outcome.group.is_empty() {
                lines.push(render_group_head(&outcome.group));
            }
        }
        lines.push(render_case_row(outcome));
    }

    lines.push("</tbody>".to_string());
    lines.push("</table>".to_string());
    lines.join("\n")
}

fn status(outcome: &CaseOutcome) -> &'static str {
    if outcome.result.is_rejected() {
        "rejected"
    } else {
        "accepted"
    }
}

fn matches_label(outcome: &CaseOutcome) -> &'static str {
    match outcome.matches_expected() {
        Some(true) => "yes",
        Some(false) => "no",
        None => "",
    }
}

/// CSV (`b','`) or TSV (`b'\t'`) listing of every outcome.
pub fn render_delimited(outcomes: &[CaseOutcome], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(["group", "input", "description", "expected", "output", "status", "matches"])?;
    for outcome in outcomes {
        writer.write_record([
            outcome.group.as_str(),
            outcome.case.raw_input.as_str(),
            outcome.case.description.as_deref().unwrap_or_default(),
            outcome.case.expected.as_deref().unwrap_or_default(),
            outcome.output.as_str(),
            status(outcome),
            matches_label(outcome),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| CaseError::ProcessingError {
        message: format!("failed to flush delimited output: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| CaseError::ProcessingError {
        message: format!("delimited output is not UTF-8: {}", e),
    })
}
