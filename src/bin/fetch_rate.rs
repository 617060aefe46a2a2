use clap::Parser;
use small_calc::config::toml_config::TomlConfig;
use small_calc::core::ConfigProvider;
use small_calc::utils::error::ErrorSeverity;
use small_calc::utils::{logger, validation::Validate};
use small_calc::{FileRateStore, FrankfurterClient, RateRepository};

#[derive(Parser)]
#[command(name = "fetch-rate")]
#[command(about = "Fetch the current exchange rate and refresh the local cache")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "calc-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dry run - show what would be fetched without touching the network
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting fetch-rate");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No request will be sent");
        return Ok(());
    }

    let client = FrankfurterClient::new(config.api_endpoint(), config.request_timeout())?;
    let store = FileRateStore::new(config.cache_path());
    let repository = RateRepository::new(
        client,
        store,
        config.from_currency(),
        config.to_currency(),
        config.request_timeout(),
    );

    match repository.get_current_rate().await {
        Ok(data) => {
            println!(
                "1 {} = {} {} ({}) [{}]",
                config.from_currency(),
                data.rate.value(),
                config.to_currency(),
                data.rate.date(),
                data.origin
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Rate fetch failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low | ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Endpoint: {}", config.api_endpoint());
    println!(
        "  Pair: {} -> {}",
        config.from_currency(),
        config.to_currency()
    );
    println!("  Timeout: {}s", config.request_timeout().as_secs());
    println!("  Cache: {}", config.cache_path());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
}
