use clap::Parser;
use date_cases::core::DateParser;
use date_cases::utils::{logger, validation::Validate};
use date_cases::{CaseEngine, CasePipeline, CliConfig, HostDateParser, LocalStorage, PrecisionFormatter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_logger(config.verbose, config.log_json);

    tracing::info!("Starting date-cases CLI");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.severity().exit_code());
    }

    if !config.eval.is_empty() {
        let parser = HostDateParser::new();
        let formatter = PrecisionFormatter::new(config.rejection_marker.as_str());
        for input in &config.eval {
            let result = parser.parse(input);
            println!("{}\t{}", input, formatter.format(input, &result));
        }
        return Ok(());
    }

    let storage = LocalStorage::new(".");
    let pipeline = CasePipeline::new(storage, config);
    let engine = CaseEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            println!("✅ Rendered {} cases", report.summary.total);
            println!(
                "   accepted: {}, rejected: {}, differing from expected: {}",
                report.summary.accepted, report.summary.rejected, report.summary.mismatched
            );
            println!("📁 Output saved to: {}", report.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Rendering failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}
