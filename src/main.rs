use anyhow::Context;
use clap::Parser;
use golf_stats_etl::utils::error::ErrorSeverity;
use golf_stats_etl::utils::{logger, validation::Validate};
use golf_stats_etl::{CliConfig, EtlEngine, HttpFetcher, LocalStorage, StatsPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose.then_some("debug"));
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting golf-stats-etl CLI");
    tracing::debug!("CLI config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path.clone());
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
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(exit_code(e.severity()));
        }
    }

    Ok(())
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
