use anyhow::Context;
use clap::Parser;
use golf_stats_etl::app::pipelines::stats_pipeline::{season_file, CLEAN_FILE, FULL_FILE};
use golf_stats_etl::core::ConfigProvider;
use golf_stats_etl::domain::services::index_url;
use golf_stats_etl::utils::error::ErrorSeverity;
use golf_stats_etl::utils::{logger, validation::Validate};
use golf_stats_etl::{EtlEngine, HttpFetcher, LocalStorage, StatsPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-collect")]
#[command(about = "Collect PGA TOUR stats using a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "golf-stats.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the seasons listed in the config, e.g. --years 2019,2020
    #[arg(long, value_delimiter = ',')]
    years: Option<Vec<u16>>,

    /// Show what would be fetched and written without executing
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

    // 初始化日誌
    if config.json_logs() {
        let level = if args.verbose { Some("debug") } else { config.log_level() };
        logger::init_json_logger(level);
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(years) = args.years.clone() {
        tracing::info!("🔧 Seasons overridden to: {:?}", years);
        config.collect.years = years;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be made");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    let storage = LocalStorage::new(config.output_path().to_string());
    let fetcher = HttpFetcher::from_config(&config).context("failed to build HTTP client")?;
    let pipeline = StatsPipeline::new(storage, fetcher, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Stats collection completed successfully!");
            println!("✅ Stats collection completed successfully!");
            println!("📁 Clean dataset saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Stats collection failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Pipeline: {}", config.pipeline.name);
    if let Some(version) = &config.pipeline.version {
        println!("  Version: {}", version);
    }
    println!("  Source: {}", config.base_url());
    println!("  Output: {}", config.output_path());
    println!("  Seasons: {:?}", config.years());
    println!("  Descriptions from: {}", config.description_year());
    println!("  Reuse descriptions: {}", config.reuse_descriptions());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Requests:");
    println!("  Index: {}", index_url(config.base_url()));
    println!("  Then: every category page, then <stat link><year>.html per stat");
    println!("  Timeout: {}s", config.timeout_seconds());

    println!();
    println!("💾 Files:");
    for &year in config.years() {
        println!("  {}", season_file(year));
    }
    println!("  {}", FULL_FILE);
    println!("  {}", CLEAN_FILE);

    println!();
    println!("✅ Dry run analysis complete.");
}
