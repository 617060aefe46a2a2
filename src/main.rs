use clap::Parser;
use small_calc::core::{ConfigProvider, ConversionData, ConversionMode, RateOrigin, RateStore};
use small_calc::domain::model::KEYPAD;
use small_calc::utils::error::ErrorSeverity;
use small_calc::utils::{logger, validation::Validate};
use small_calc::{
    CalculatorSession, CliConfig, FileRateStore, FrankfurterClient, RateFeed, RateRepository,
    TomlConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入 TOML 配置（如有指定）
    let toml_config = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => None,
    };

    init_logging(&cli, toml_config.as_ref());

    tracing::info!("Starting small-calc");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let outcome = match &toml_config {
        Some(config) => run(config, &cli).await,
        None => run(&cli, &cli).await,
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ small-calc failed: {} (Category: {:?}, Severity: {:?})",
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

    Ok(())
}

fn init_logging(cli: &CliConfig, toml_config: Option<&TomlConfig>) {
    let json = cli.json_logs || toml_config.is_some_and(|c| c.json_logs());
    match toml_config.and_then(|c| c.log_level()) {
        // --verbose 優先於設定檔的等級
        Some(level) if !cli.verbose => logger::init_with_level(level, json),
        _ if json => logger::init_json_logger(cli.verbose),
        _ => logger::init_cli_logger(cli.verbose),
    }
}

async fn run<C: ConfigProvider + Validate>(config: &C, cli: &CliConfig) -> small_calc::Result<()> {
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e);
    }

    let mode = cli.mode.unwrap_or_else(|| config.conversion_mode());
    let initial = ConversionData::fallback(config.default_rate());
    let store = FileRateStore::new(config.cache_path());

    let (mut feed, rates) = if cli.offline {
        tracing::info!("📴 Offline mode, reading cached rate from {}", config.cache_path());
        let data = cached_or(&store, initial).await;
        let (_sender, receiver) = watch::channel(data);
        (None, receiver)
    } else {
        let client = FrankfurterClient::new(config.api_endpoint(), config.request_timeout())?;
        let repository = RateRepository::new(
            client,
            store,
            config.from_currency(),
            config.to_currency(),
            config.request_timeout(),
        );
        let feed = RateFeed::spawn(Arc::new(repository), initial, config.refresh_interval());
        let receiver = feed.subscribe();
        (Some(feed), receiver)
    };

    let mut session =
        CalculatorSession::new(config.from_currency(), config.to_currency(), rates, mode);

    match &cli.expr {
        Some(expr) => {
            // 單次計算時，轉換需要匯率：等待第一次結果
            if let Some(feed) = feed.as_mut() {
                if mode != ConversionMode::Off {
                    let wait = config.request_timeout() + Duration::from_secs(1);
                    let _ = tokio::time::timeout(wait, feed.changed()).await;
                }
            }
            session.evaluate_once(expr)?;
            print_result(&session);
        }
        None => interactive(&mut session).await?,
    }

    if let Some(feed) = feed {
        feed.cancel();
    }
    Ok(())
}

async fn cached_or(store: &FileRateStore, initial: ConversionData) -> ConversionData {
    match store.load_last().await {
        Ok(Some(stored)) => match stored.to_rate() {
            Ok(rate) => ConversionData::new(rate, RateOrigin::Cached),
            Err(e) => {
                tracing::warn!("Ignoring cached rate: {}", e);
                initial
            }
        },
        Ok(None) => initial,
        Err(e) => {
            tracing::warn!("Failed to read cached rate: {}", e);
            initial
        }
    }
}

async fn interactive(session: &mut CalculatorSession) -> small_calc::Result<()> {
    print_keypad();
    render(session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "quit" | "exit" | "q" => break,
            "" => {}
            "mode" => {
                session.cycle_mode();
                println!("Mode: {}", session.mode_label());
            }
            "rate" => {
                let data = session.rate();
                println!(
                    "{}  {} ({})",
                    session.date_line(),
                    session.rate_banner(),
                    data.origin
                );
            }
            "keys" => print_keypad(),
            input => {
                if let Err(e) = session.enter(input) {
                    tracing::debug!("Rejected input {:?}: {}", input, e);
                    eprintln!("❌ {}", e.user_friendly_message());
                    eprintln!("💡 {}", e.recovery_suggestion());
                }
            }
        }
        render(session);
    }

    Ok(())
}

fn print_keypad() {
    println!("Keys (separate with spaces; 'mode', 'rate', 'keys', 'quit'):");
    for row in KEYPAD {
        println!("  {}", row.map(|label| format!("{:>3}", label)).join(" "));
    }
    println!();
}

fn render(session: &CalculatorSession) {
    if let (Some(value), Some(currency)) = (session.converted(), session.output_currency()) {
        println!("  [{}] {} {}", session.mode_label(), value, currency);
    }
    match session.input_currency() {
        Some(currency) => println!("> {} {}", currency, session.display()),
        None => println!("> {}", session.display()),
    }
}

fn print_result(session: &CalculatorSession) {
    println!("{}", session.display());
    if let (Some(value), Some(currency)) = (session.converted(), session.output_currency()) {
        println!("{} {}", value, currency);
    }
}
