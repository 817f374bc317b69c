use catalog_ratings_config::PathManager;
use catalog_ratings_models::ItemType;
use clap::{ArgAction, Args, Parser, Subcommand};
use commands::{config, get};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "ratings")]
#[command(about = "Look up your likes and dislikes for catalog songs, albums, playlists, music videos and stations")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to a daily-rotated file instead of stderr (defaults to the logs directory)
    #[arg(long, global = true, value_name = "PATH", num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Commands,
}

/// Identifiers to look up, either all of one type or grouped per type.
#[derive(Args, Debug, Clone)]
pub struct ItemSelection {
    /// Item type for the positional identifiers (defaults to the configured type)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    item_type: Option<ItemType>,

    /// Song identifiers
    #[arg(long = "song", value_name = "ID")]
    songs: Vec<String>,

    /// Album identifiers
    #[arg(long = "album", value_name = "ID")]
    albums: Vec<String>,

    /// Playlist identifiers
    #[arg(long = "playlist", value_name = "ID")]
    playlists: Vec<String>,

    /// Music video identifiers
    #[arg(long = "music-video", value_name = "ID")]
    music_videos: Vec<String>,

    /// Station identifiers
    #[arg(long = "station", value_name = "ID")]
    stations: Vec<String>,

    /// Catalog identifiers; several may be given and are fetched in one request
    #[arg(value_name = "ID")]
    ids: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch ratings for catalog items
    #[command(long_about = "Fetch the current user's ratings for one or more catalog items. Identifiers of the same type are batched into a single request; different types are requested concurrently. Items without a rating are reported as such, not as errors.")]
    Get {
        #[command(flatten)]
        selection: ItemSelection,
    },
    /// Print the ratings endpoint URL without sending a request
    Endpoint {
        #[command(flatten)]
        selection: ItemSelection,
    },
    /// Configure the catalog service and credentials
    #[command(long_about = "Manage configuration and credentials. Tokens can also be supplied through the CATALOG_RATINGS_DEVELOPER_TOKEN and CATALOG_RATINGS_USER_TOKEN environment variables, which take precedence over stored values.")]
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks tokens)
    Show {
        /// Show full tokens instead of masked values
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Change catalog settings
    Set {
        /// Catalog API root, e.g. https://api.music.apple.com/v1/
        #[arg(long)]
        base_url: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Item type used when `--type` is omitted
        #[arg(long)]
        default_type: Option<ItemType>,
    },

    /// Store API tokens
    #[command(long_about = "Store the developer token and music user token used to authenticate ratings requests. Omitted tokens are prompted for with masked input.")]
    Token {
        /// Developer token (JWT)
        #[arg(long)]
        developer_token: Option<String>,

        /// Music user token
        #[arg(long)]
        user_token: Option<String>,

        /// Developer token expiry as an RFC 3339 timestamp
        #[arg(long)]
        expires: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .clone()
        .map(|path| path.unwrap_or_else(|| PathManager::default().default_log_file()));
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Get { selection } => get::run_get(selection, &output).await,
        Commands::Endpoint { selection } => get::run_endpoint(selection, &output),
        Commands::Config { cmd } => config::run_config(cmd, &output),
    }
}
