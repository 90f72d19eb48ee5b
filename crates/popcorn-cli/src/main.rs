use clap::{ArgAction, Parser, Subcommand};
use commands::{config, interactive, search, show, watched};
use popcorn_config::{Config, PathManager};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "popcorn")]
#[command(about = "popcorn - Search movies and keep track of what you've watched")]
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

    /// Write logs to a daily-rotated file (PATH.YYYY-MM-DD) instead of stderr.
    /// Without a value the file goes to the data directory: --log-file or --log-file=PATH
    #[arg(long, value_name = "PATH", global = true, num_args = 0..=1, require_equals = true)]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search OMDb for movies matching a title
    #[command(long_about = "Run a single search and print the results. Queries shorter than the configured minimum (5 characters by default) are not sent.")]
    Search {
        /// Title to search for (multiple words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show details for one movie
    Show {
        /// IMDb id, e.g. tt0372784
        imdb_id: String,
    },
    /// Manage the watched list
    Watched {
        #[command(subcommand)]
        cmd: WatchedCommands,
    },
    /// Interactive session: type to search, select, rate
    #[command(long_about = "Start a line-driven session. Every plain line is a new search that replaces the one in flight. Lines starting with ':' are commands: :select N, :close, :rate N, :watched, :rm ID, :help, :quit.")]
    Interactive,
    /// Manage configuration and the OMDb API key
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum WatchedCommands {
    /// List watched movies with their averages
    List,
    /// Show averages only
    Summary,
    /// Fetch a movie by id, rate it and add it
    Add {
        /// IMDb id of the movie
        imdb_id: String,

        /// Your rating, 1 to 10
        #[arg(long, short)]
        rating: u8,
    },
    /// Remove a movie by id
    Remove {
        /// IMDb id of the movie
        imdb_id: String,
    },
    /// Remove every movie from the watched list
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Store the OMDb API key in the credentials file
    #[command(long_about = "Store the OMDb API key in credentials.toml. Get a free key at https://www.omdbapi.com/apikey.aspx. The OMDB_API_KEY environment variable takes precedence over the stored key.")]
    SetKey {
        /// API key (if not provided, will prompt)
        #[arg(long)]
        key: Option<String>,
    },
    /// Write a default config.toml
    Init {
        /// Overwrite an existing file without asking
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Logging settings are read leniently; commands report a broken config themselves
    let paths = PathManager::default();
    let logging_config = Config::load_or_default(&paths.config_file())
        .map(|c| c.logging)
        .unwrap_or_default();
    let log_file = match cli.log_file {
        Some(Some(path)) => Some(path),
        Some(None) => Some(paths.log_file()),
        None => logging_config.file,
    };

    logging::init_logging(cli.verbose, cli.quiet, logging_config.level.as_deref(), log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { query } => search::run_search(query.join(" "), &output).await,
        Commands::Show { imdb_id } => show::run_show(&imdb_id, &output).await,
        Commands::Watched { cmd } => watched::run_watched(cmd, &output).await,
        Commands::Interactive => interactive::run_interactive(output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
    }
}
