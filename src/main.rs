use clap::Parser;
use directory_engine::config::Command;
use directory_engine::utils::error::ErrorSeverity;
use directory_engine::utils::{logger, validation::Validate};
use directory_engine::{
    CliConfig, DirectoryEngine, DirectoryError, EngineConfig, FileListingStore, ListingQuery,
};
use serde::Serialize;
use std::sync::Arc;

fn load_engine_config(cli: &CliConfig) -> Result<EngineConfig, DirectoryError> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(
    engine: &DirectoryEngine<FileListingStore>,
    command: &Command,
) -> Result<serde_json::Value, DirectoryError> {
    let value = match command {
        Command::List { .. } => {
            let query = ListingQuery::from_params(command.list_params())?;
            serde_json::to_value(engine.query(&query).await?)?
        }
        Command::Get { slug } => {
            let query = ListingQuery::new().slug(slug.as_str());
            serde_json::to_value(engine.query(&query).await?)?
        }
        Command::Guide { destination } => serde_json::to_value(engine.guide(destination).await?)?,
        Command::Discover => serde_json::to_value(engine.discover())?,
        Command::Stats => serde_json::to_value(engine.stats().await?)?,
        Command::Entitlements { listing_id } => {
            serde_json::to_value(engine.entitlements(listing_id).await?)?
        }
    };
    Ok(value)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 先載入設定，日誌等級可能來自設定檔
    let config = load_engine_config(&cli);
    let level = config.as_ref().ok().and_then(|c| c.log_level().map(str::to_string));
    let json_logs = cli.json_logs || config.as_ref().map(|c| c.json_logs()).unwrap_or(false);
    if json_logs {
        logger::init_json_logger(level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, level.as_deref());
    }

    tracing::info!("Starting directory-engine CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = cli.validate() {
        tracing::error!("❌ Invalid arguments: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let store = match FileListingStore::new(&cli.snapshot) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    tracing::info!("📁 Using snapshot: {}", store.path().display());

    let engine = DirectoryEngine::new(store, Arc::new(config));

    match run(&engine, &cli.command).await {
        Ok(value) => print_json(&value)?,
        Err(e) => {
            tracing::error!(
                "❌ Query failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 4,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
