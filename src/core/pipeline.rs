use crate::core::{CaseGroup, CaseOutcome, ConfigProvider, Pipeline, RenderResult, Storage};
use crate::domain::format::PrecisionFormatter;
use crate::domain::parser::HostDateParser;
use crate::domain::ports::DateParser;
use crate::domain::table::{read_case_table, render_delimited, render_html};
use crate::utils::error::{CaseError, Result};
use crate::utils::validation::is_http_source;
use reqwest::Client;
use std::io::Write;
use std::time::Duration;
use zip::write::{FileOptions, ZipWriter};

pub struct CasePipeline<S: Storage, C: ConfigProvider, P: DateParser = HostDateParser> {
    storage: S,
    config: C,
    parser: P,
    formatter: PrecisionFormatter,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> CasePipeline<S, C, HostDateParser> {
    pub fn new(storage: S, config: C) -> Self {
        Self::with_parser(storage, config, HostDateParser::new())
    }
}

impl<S: Storage, C: ConfigProvider, P: DateParser> CasePipeline<S, C, P> {
    pub fn with_parser(storage: S, config: C, parser: P) -> Self {
        let formatter = PrecisionFormatter::new(config.rejection_marker());
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds()))
            .build()
            .unwrap_or_default();

        Self {
            storage,
            config,
            parser,
            formatter,
            client,
        }
    }

    fn output_file(&self, name: &str) -> String {
        format!("{}/{}", self.config.output_path().trim_end_matches('/'), name)
    }

    fn wants(&self, format: &str) -> bool {
        self.config.output_formats().iter().any(|f| f == format)
    }

    async fn fetch_source(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Fetching case table from: {}", url);
        let response = self.client.get(url).send().await?;
        tracing::debug!("Case source response status: {}", response.status());

        if !response.status().is_success() {
            return Err(CaseError::SourceError {
                message: format!("{} returned status {}", url, response.status()),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    fn html_document(&self, table: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Date parsing cases</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            table
        )
    }

    fn output_files(&self, result: &RenderResult) -> Result<Vec<(String, Vec<u8>)>> {
        let mut files = Vec::new();

        if self.wants("csv") {
            files.push(("results.csv".to_string(), result.csv_output.clone().into_bytes()));
        }
        if self.wants("tsv") {
            files.push(("results.tsv".to_string(), result.tsv_output.clone().into_bytes()));
        }
        if self.wants("html") {
            let document = self.html_document(&result.html_output);
            files.push(("results.html".to_string(), document.into_bytes()));
        }
        if self.wants("json") {
            let report = serde_json::json!({
                "summary": result.summary(),
                "outcomes": result.outcomes,
            });
            files.push((
                "results.json".to_string(),
                serde_json::to_string_pretty(&report)?.into_bytes(),
            ));

            if !result.rejected.is_empty() {
                files.push((
                    "rejected.json".to_string(),
                    serde_json::to_string_pretty(&result.rejected)?.into_bytes(),
                ));
            }
        }

        Ok(files)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, P: DateParser> Pipeline for CasePipeline<S, C, P> {
    async fn extract(&self) -> Result<Vec<CaseGroup>> {
        let source = self.config.source();

        let data = if is_http_source(source) {
            self.fetch_source(source).await?
        } else {
            tracing::debug!("Reading case table from: {}", source);
            self.storage.read_file(source).await?
        };

        read_case_table(&data)
    }

    async fn transform(&self, groups: Vec<CaseGroup>) -> Result<RenderResult> {
        let mut outcomes = Vec::new();

        for group in groups {
            for case in group.cases {
                let result = self.parser.parse(&case.raw_input);
                let output = self.formatter.format(&case.raw_input, &result);
                tracing::debug!("{:?} -> {}", case.raw_input, output);

                outcomes.push(CaseOutcome {
                    group: group.title.clone(),
                    case,
                    result,
                    output,
                });
            }
        }

        let rejected: Vec<CaseOutcome> = outcomes
            .iter()
            .filter(|o| o.result.is_rejected())
            .cloned()
            .collect();

        Ok(RenderResult {
            csv_output: render_delimited(&outcomes, b',')?,
            tsv_output: render_delimited(&outcomes, b'\t')?,
            html_output: render_html(&outcomes),
            rejected,
            outcomes,
        })
    }

    async fn load(&self, result: RenderResult) -> Result<String> {
        let files = self.output_files(&result)?;

        let Some(archive) = self.config.archive_name() else {
            for (name, data) in &files {
                let path = self.output_file(name);
                tracing::debug!("Writing {} ({} bytes)", path, data.len());
                self.storage.write_file(&path, data).await?;
            }
            return Ok(self.config.output_path().to_string());
        };

        tracing::debug!("Creating ZIP file with {} files", files.len());
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (name, data) in &files {
                zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                zip.write_all(data)?;
            }
            zip.finish()?.into_inner()
        };

        let path = self.output_file(archive);
        tracing::debug!("Writing ZIP file ({} bytes) to {}", zip_data.len(), path);
        self.storage.write_file(&path, &zip_data).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ParseResult;
    use crate::domain::model::TestCase;
    use chrono::{TimeZone, Utc};
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const CASES: &str = "\
group,input,expected
ISO,2024-03-05,2024-03-05T00:00Z
ISO,2024-03-05T10:20,2024-03-05T10:20Z
Invalid,nope,NaN
";

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn with_file(path: &str, data: &str) -> Self {
            let storage = Self::new();
            storage
                .files
                .lock()
                .await
                .insert(path.to_string(), data.as_bytes().to_vec());
            storage
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                CaseError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        source: String,
        output_path: String,
        output_formats: Vec<String>,
        rejection_marker: String,
        archive: Option<String>,
    }

    impl MockConfig {
        fn new(source: impl Into<String>) -> Self {
            Self {
                source: source.into(),
                output_path: "test_output".to_string(),
                output_formats: vec!["csv".to_string(), "tsv".to_string()],
                rejection_marker: "NaN".to_string(),
                archive: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn source(&self) -> &str {
            &self.source
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn rejection_marker(&self) -> &str {
            &self.rejection_marker
        }

        fn archive_name(&self) -> Option<&str> {
            self.archive.as_deref()
        }
    }

    fn group(title: &str, inputs: &[&str]) -> CaseGroup {
        CaseGroup {
            title: title.to_string(),
            cases: inputs.iter().map(|i| TestCase::new(*i)).collect(),
        }
    }

    #[tokio::test]
    async fn test_extract_from_storage() {
        let storage = MockStorage::with_file("cases.csv", CASES).await;
        let pipeline = CasePipeline::new(storage, MockConfig::new("cases.csv"));

        let groups = pipeline.extract().await.unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].cases.len(), 2);
        assert_eq!(groups[1].cases[0].raw_input, "nope");
    }

    #[tokio::test]
    async fn test_extract_missing_file() {
        let pipeline = CasePipeline::new(MockStorage::new(), MockConfig::new("missing.csv"));

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, CaseError::IoError(_)));
    }

    #[tokio::test]
    async fn test_extract_from_http_source() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/cases.csv");
            then.status(200)
                .header("Content-Type", "text/csv")
                .body(CASES);
        });

        let pipeline =
            CasePipeline::new(MockStorage::new(), MockConfig::new(server.url("/cases.csv")));
        let groups = pipeline.extract().await.unwrap();

        api_mock.assert();
        assert_eq!(groups.len(), 2);
    }

    #[tokio::test]
    async fn test_extract_http_failure_is_source_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/cases.csv");
            then.status(500);
        });

        let pipeline =
            CasePipeline::new(MockStorage::new(), MockConfig::new(server.url("/cases.csv")));
        let err = pipeline.extract().await.unwrap_err();

        api_mock.assert();
        assert!(matches!(err, CaseError::SourceError { .. }));
    }

    #[tokio::test]
    async fn test_transform_formats_every_case() {
        let pipeline = CasePipeline::new(MockStorage::new(), MockConfig::new("cases.csv"));
        let groups = vec![
            group("ISO", &["2024-03-05", "2024-03-05T10:20:30.123"]),
            group("Invalid", &["nope"]),
        ];

        let result = pipeline.transform(groups).await.unwrap();

        let outputs: Vec<&str> = result.outcomes.iter().map(|o| o.output.as_str()).collect();
        assert_eq!(
            outputs,
            vec!["2024-03-05T00:00Z", "2024-03-05T10:20:30.123Z", "NaN"]
        );
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.outcomes[2].group, "Invalid");
        assert_eq!(result.csv_output.lines().count(), 4);
        assert!(result.html_output.contains("<code>NaN</code>"));
    }

    #[tokio::test]
    async fn test_transform_uses_injected_parser() {
        let fixed = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
        let parser = move |_: &str| ParseResult::Accepted(fixed);
        let pipeline =
            CasePipeline::with_parser(MockStorage::new(), MockConfig::new("cases.csv"), parser);

        let result = pipeline
            .transform(vec![group("", &["2024-03-05 10"])])
            .await
            .unwrap();

        assert_eq!(result.outcomes[0].output, "2024-03-05T10Z");
    }

    #[tokio::test]
    async fn test_transform_uses_configured_marker() {
        let mut config = MockConfig::new("cases.csv");
        config.rejection_marker = "Invalid Date".to_string();
        let pipeline = CasePipeline::new(MockStorage::new(), config);

        let result = pipeline.transform(vec![group("", &["nope"])]).await.unwrap();

        assert_eq!(result.outcomes[0].output, "Invalid Date");
    }

    #[tokio::test]
    async fn test_load_writes_plain_files() {
        let storage = MockStorage::new();
        let pipeline = CasePipeline::new(storage.clone(), MockConfig::new("cases.csv"));
        let result = pipeline
            .transform(vec![group("", &["2024-03-05"])])
            .await
            .unwrap();

        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "test_output");
        assert!(storage.get_file("test_output/results.csv").await.is_some());
        assert!(storage.get_file("test_output/results.tsv").await.is_some());
        assert!(storage.get_file("test_output/results.html").await.is_none());
    }

    #[tokio::test]
    async fn test_load_json_includes_rejected_only_when_present() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new("cases.csv");
        config.output_formats = vec!["json".to_string()];
        let pipeline = CasePipeline::new(storage.clone(), config);

        let result = pipeline
            .transform(vec![group("", &["2024-03-05"])])
            .await
            .unwrap();
        pipeline.load(result).await.unwrap();
        assert!(storage.get_file("test_output/results.json").await.is_some());
        assert!(storage.get_file("test_output/rejected.json").await.is_none());

        let result = pipeline.transform(vec![group("", &["nope"])]).await.unwrap();
        pipeline.load(result).await.unwrap();
        let rejected = storage.get_file("test_output/rejected.json").await.unwrap();
        let rejected: serde_json::Value = serde_json::from_slice(&rejected).unwrap();
        assert_eq!(rejected[0]["case"]["raw_input"], "nope");
    }

    #[tokio::test]
    async fn test_load_zip_archive() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new("cases.csv");
        config.output_formats = vec!["csv".to_string(), "html".to_string()];
        config.archive = Some("date_cases.zip".to_string());
        let pipeline = CasePipeline::new(storage.clone(), config);

        let result = pipeline
            .transform(vec![group("ISO", &["2024-03-05T10:20"])])
            .await
            .unwrap();
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "test_output/date_cases.zip");
        let zip_bytes = storage.get_file("test_output/date_cases.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();

        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();
        assert_eq!(file_names, vec!["results.csv", "results.html"]);

        let html = {
            let mut file = archive.by_name("results.html").unwrap();
            let mut content = String::new();
            std::io::Read::read_to_string(&mut file, &mut content).unwrap();
            content
        };
        assert!(html.contains("<th colspan=\"5\">ISO</th>"));
        assert!(html.contains("<td>2024-03-05T10:20Z</td>"));
    }
}
