//! Pulse CLI - news feed, chat and profile backed by a local SQLite store

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use pulse::config::{self, PulseConfig};
use pulse::message::MessageKind;
use pulse::storage::{self, SharedStore, SqliteStore};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "pulse")]
#[command(version)]
#[command(about = "News headlines with an offline cache, a chat simulator and a user profile")]
#[command(long_about = r#"
Pulse keeps a local copy of the news so the feed still works offline:
  • Headlines and search are fetched from NewsAPI and cached in SQLite
  • When the network fails, the cached articles are shown instead
  • A simulated chat and a user profile live in the same database

Example usage:
  pulse init --api-key <KEY> --name Ada
  pulse headlines
  pulse search "climate"
  pulse chat send "hello" && pulse chat reply
  pulse serve --port 8787 --sync-every 300
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// NewsAPI key (overrides the config)
    #[arg(long, global = true, env = config::API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create the database
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,

        /// Display name for the profile
        #[arg(short, long)]
        name: Option<String>,

        /// Country code for top headlines
        #[arg(long)]
        country: Option<String>,
    },

    /// Fetch top headlines (falls back to the cache when offline)
    Headlines {
        /// Maximum number of articles to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Search articles (falls back to the cache when offline)
    Search {
        /// Search query
        query: String,

        /// Maximum number of articles to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show cached articles without touching the network
    Cached {
        /// Only show cached articles matching this text
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Simulated chat
    Chat {
        #[command(subcommand)]
        action: ChatAction,
    },

    /// User profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Edit the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show database statistics
    Stats,

    /// Refresh the headline cache once, or every N seconds
    Sync {
        /// Keep refreshing every N seconds until interrupted
        #[arg(long)]
        every: Option<u64>,
    },

    /// Serve the local JSON API
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8787")]
        port: u16,

        /// Refresh headlines in the background every N seconds
        #[arg(long)]
        sync_every: Option<u64>,
    },

    /// Delete every article, message and the profile
    Reset {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ChatAction {
    /// Send a message as the local user
    Send {
        /// Message text
        #[arg(default_value = "")]
        text: String,

        /// Message kind (text, image, audio)
        #[arg(short, long, default_value = "text")]
        kind: MessageKind,

        /// Image attachment URI
        #[arg(long)]
        image: Option<String>,

        /// Audio attachment URI
        #[arg(long)]
        audio: Option<String>,
    },

    /// Record a message from the other side (random canned reply if no text)
    Reply {
        text: Option<String>,
    },

    /// Show the conversation
    List {
        /// Render as a table
        #[arg(short, long)]
        table: bool,
    },

    /// Delete the conversation
    Clear,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the stored profile
    Show,

    /// Change the display name
    Name { name: String },

    /// Change the profile image URI
    Image { uri: String },

    /// Set the location label by hand
    Location {
        label: String,

        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },

    /// Resolve coordinates to a place name and store them
    Locate {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config
    Show,

    /// Store the NewsAPI key
    SetKey { key: String },

    /// Store the country used for top headlines
    SetCountry { country: String },

    /// Store the display name used until a profile is saved
    SetName { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(self) -> bool {
        self == OutputMode::Human
    }
}

/// Print `{ "ok": true, "command": ..., "data": ... }` on stdout
pub fn emit_success(output_mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if output_mode == OutputMode::Json {
        let envelope = serde_json::json!({
            "ok": true,
            "command": command,
            "data": data,
        });
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    Ok(())
}

fn emit_error(output_mode: OutputMode, err: &anyhow::Error) {
    match output_mode {
        OutputMode::Human => pulse::ui::error(&format!("{:#}", err)),
        OutputMode::Json => {
            let envelope = serde_json::json!({
                "ok": false,
                "error": format!("{:#}", err),
            });
            println!("{}", envelope);
        }
    }
}

/// Everything a command needs, resolved from flags, environment and config
pub struct App {
    pub output: OutputMode,
    pub config_path: PathBuf,
    pub config: PulseConfig,
    pub database: PathBuf,
    pub api_key: Option<String>,
    pub store: SharedStore,
}

impl App {
    fn open(cli: &Cli, output: OutputMode) -> anyhow::Result<Self> {
        let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
        let config = config::load_config(Some(&config_path))?.unwrap_or_default();
        let database = match &cli.database {
            Some(path) => path.clone(),
            None => config.database_path(&std::env::current_dir()?),
        };
        // clap already folded PULSE_API_KEY into --api-key
        let api_key = config.resolve_api_key(cli.api_key.as_deref(), None);

        config::ensure_db_dir(&database)?;
        tracing::debug!("Opening database {}", database.display());
        let store = storage::shared(SqliteStore::open(&database)?);

        Ok(Self {
            output,
            config_path,
            config,
            database,
            api_key,
            store,
        })
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output = if cli.json { OutputMode::Json } else { OutputMode::Human };

    if let Err(err) = run(cli, output).await {
        emit_error(output, &err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: OutputMode) -> anyhow::Result<()> {
    if let Commands::Version = cli.command {
        return commands::run_version(output);
    }
    if let Commands::Init { force, name, country } = &cli.command {
        return commands::run_init(&cli, output, *force, name.as_deref(), country.as_deref()).await;
    }

    let app = App::open(&cli, output)?;

    match cli.command {
        Commands::Headlines { limit } => commands::run_headlines(&app, limit).await,
        Commands::Search { query, limit } => commands::run_search(&app, &query, limit).await,
        Commands::Cached { query } => commands::run_cached(&app, query.as_deref()).await,
        Commands::Chat { action } => match action {
            ChatAction::Send { text, kind, image, audio } => {
                commands::run_chat_send(&app, &text, kind, image.as_deref(), audio.as_deref()).await
            }
            ChatAction::Reply { text } => commands::run_chat_reply(&app, text.as_deref()).await,
            ChatAction::List { table } => commands::run_chat_list(&app, table).await,
            ChatAction::Clear => commands::run_chat_clear(&app).await,
        },
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::run_profile_show(&app).await,
            ProfileAction::Name { name } => commands::run_profile_name(&app, &name).await,
            ProfileAction::Image { uri } => commands::run_profile_image(&app, &uri).await,
            ProfileAction::Location { label, lat, lng } => {
                commands::run_profile_location(&app, &label, lat, lng).await
            }
            ProfileAction::Locate { lat, lng } => commands::run_profile_locate(&app, lat, lng).await,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::run_config_show(&app),
            ConfigAction::SetKey { key } => commands::run_config_set(&app, |c| c.api_key = Some(key)),
            ConfigAction::SetCountry { country } => {
                commands::run_config_set(&app, |c| c.country = Some(country))
            }
            ConfigAction::SetName { name } => {
                commands::run_config_set(&app, |c| c.user_name = Some(name.trim().to_string()))
            }
        },
        Commands::Stats => commands::run_stats(&app).await,
        Commands::Reset { yes } => commands::run_reset(&app, yes).await,
        Commands::Sync { every } => commands::run_sync(&app, every).await,
        Commands::Serve { port, sync_every } => commands::run_serve(&app, port, sync_every).await,
        Commands::Init { .. } | Commands::Version => Ok(()),
    }
}
