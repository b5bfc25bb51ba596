use clap::Parser;
use date_cases::config::toml_config::TomlConfig;
use date_cases::core::ConfigProvider;
use date_cases::utils::{logger, validation::Validate};
use date_cases::{CaseEngine, CasePipeline, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-cases")]
#[command(about = "Render date-parsing cases from a TOML run configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "date-cases.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the output directory from config
    #[arg(long)]
    output_path: Option<String>,

    /// Show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    logger::init_logger(args.verbose || config.verbose(), config.json_logs());
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(output_path) = args.output_path.clone() {
        tracing::info!("🔧 Output path overridden to: {}", output_path);
        config.load.output_path = output_path;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return Ok(());
    }

    let storage = LocalStorage::new(".");
    let pipeline = CasePipeline::new(storage, config);
    let engine = CaseEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            println!(
                "✅ Rendered {} cases ({} accepted, {} rejected, {} differing from expected)",
                report.summary.total,
                report.summary.accepted,
                report.summary.rejected,
                report.summary.mismatched
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
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Run: {}", config.run.name);
    if let Some(description) = &config.run.description {
        println!("  Description: {}", description);
    }
    println!("  Source: {}", config.source());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!("  Rejection marker: {}", config.rejection_marker());

    if let Some(archive) = config.archive_name() {
        println!("  Compression: {} (ZIP)", archive);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
