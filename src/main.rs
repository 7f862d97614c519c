use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use yuzu_bot::application::errors::BotError;
use yuzu_bot::application::i18n::{read_table, Translator};
use yuzu_bot::application::messaging::{CommandDispatcher, CommandRegistry, Dispatch};
use yuzu_bot::application::services::register_defaults;
use yuzu_bot::application::state::AppState;
use yuzu_bot::domain::entities::Message;
use yuzu_bot::domain::traits::{Bot, Reply, Store};
use yuzu_bot::infrastructure::adapters::ConsoleAdapter;
use yuzu_bot::infrastructure::config::Config;
use yuzu_bot::infrastructure::database::SqliteStore;
use yuzu_bot::infrastructure::storage::MemoryStore;

#[derive(Parser)]
#[command(name = "yuzu-bot")]
#[command(about = "A localized command bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot on the console
    Run {
        /// Pretend messages come from this guild
        #[arg(long)]
        guild: Option<i64>,

        /// Author id for console messages
        #[arg(long, default_value_t = 100)]
        user: i64,

        /// Keep state in memory instead of SQLite
        #[arg(long)]
        memory: bool,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
    /// Load a translation file and list its locales
    CheckLocales {
        /// Defaults to the configured path
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { guild, user, memory } => load_config(&cli.config).and_then(|config| {
            runtime()?.block_on(run_bot(config, guild, user, memory))
        }),
        Commands::Version => {
            println!("yuzu-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
        Commands::CheckLocales { path } => load_config(&cli.config).and_then(|config| {
            let path = path.unwrap_or(config.locales.path);
            runtime()?.block_on(check_locales(&path))
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, BotError> {
    tokio::runtime::Runtime::new().map_err(|e| BotError::Platform(format!("Failed to start runtime: {}", e)))
}

fn load_config(path: &str) -> Result<Config, BotError> {
    let config = if Path::new(path).exists() {
        let mut config = Config::load(path)?;
        config.apply_env()?;
        config
    } else {
        tracing::info!("No config at {}, using defaults", path);
        Config::load_env()?
    };

    config.validate()?;
    Ok(config)
}

async fn run_bot(config: Config, guild: Option<i64>, user: i64, memory: bool) -> Result<(), BotError> {
    tracing::info!("Starting yuzu-bot: {}", config.bot.name);

    let store: Arc<dyn Store> = if memory {
        tracing::info!("Using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        tracing::info!("Database: {}", config.database.path.display());
        Arc::new(SqliteStore::open(&config.database.path)?)
    };

    let translator = Translator::load(&config.locales.path).await?;
    tracing::info!("Loaded locales: {}", translator.locales().join(", "));

    let console = Arc::new(ConsoleAdapter::new(config.bot.name.clone()));
    let bot: Arc<dyn Bot> = console.clone();

    let state = Arc::new(AppState::new(
        store,
        translator,
        config.runtime_options(bot.bot_info().id),
    )?);
    let (users, guilds) = state.warm_caches().await?;
    tracing::info!(users, guilds, "Caches warmed");

    if let Some(guild_id) = guild {
        state.register_guild(guild_id, &[user]).await?;
    }

    let mut registry = CommandRegistry::new();
    register_defaults(&mut registry);
    tracing::info!("Registered {} commands", registry.len());

    let dispatcher = CommandDispatcher::new(state, Arc::clone(&bot), registry);

    bot.start().await?;
    let channel_id = guild.unwrap_or(user);

    while let Some(input) = console.read_line("> ").await {
        if input.is_empty() {
            continue;
        }

        let message = match guild {
            Some(id) => Message::new(channel_id, user, input).in_guild(id),
            None => Message::new(channel_id, user, input),
        };

        match dispatcher.dispatch(&message).await {
            Ok(Dispatch::UnknownCommand(name)) => tracing::debug!("No command named {}", name),
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Command failed: {}", e);
                let _ = bot.send_reply(channel_id, &Reply::text("Something went wrong.")).await;
            }
        }
    }

    tracing::info!("Input closed, shutting down");
    Ok(())
}

async fn check_locales(path: &Path) -> Result<(), BotError> {
    let table = read_table(path).await?;
    let mut locales: Vec<&str> = table.locales().collect();
    locales.sort_unstable();

    println!("{}: {} locale(s)", path.display(), locales.len());
    for locale in locales {
        println!("  {}", locale);
    }
    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let yaml = Config::default().to_yaml()?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
