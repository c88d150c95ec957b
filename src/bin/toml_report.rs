use anyhow::Context;
use clap::Parser;
use sales_etl::core::ConfigProvider;
use sales_etl::utils::error::ErrorSeverity;
use sales_etl::utils::{display, logger, validation::Validate};
use sales_etl::{EtlEngine, LocalStorage, SalesPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "Sales cleaning report driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "sales-report.toml")]
    config: String,

    /// Override source.path from config
    #[arg(short, long)]
    input: Option<String>,

    /// Override analytics.month from config
    #[arg(long)]
    month: Option<u32>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config)
        .with_context(|| format!("loading config file '{}'", args.config))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config: {:#}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("🚀 Starting TOML-based sales report");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(input) = &args.input {
        config.source.path = Some(input.clone());
        tracing::info!("🔧 Input overridden to: {}", input);
    }
    if let Some(month) = args.month {
        config.analytics.month = Some(month);
        tracing::info!("🔧 Month filter overridden to: {}", month);
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

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    let storage = LocalStorage::new(config.output_path());
    let pipeline = SalesPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output) => {
            display::print_run_report(&output);
            println!("✅ ETL process completed successfully!");
            println!("📁 Output saved to: {}", output.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    if let Some(description) = &config.pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  Input: {}", config.input_path());
    println!(
        "  Delimiter: {:?}, Header row: {}",
        config.delimiter() as char,
        config.has_header()
    );
    if sales_etl::config::is_workbook(config.input_path()) {
        println!("  Sheet layout: {:?}", config.workbook_layout());
    }
    println!("  Fold accents: {}", config.fold_accents());
    println!("  Top products: {}", config.top_products_limit());
    if let Some(month) = config.month_filter() {
        println!("  Month filter: {}", month);
    }
    println!(
        "  Output: {}/{}",
        config.output_path(),
        config.archive_name()
    );
    println!("  Formats: {}", config.output_formats().join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
