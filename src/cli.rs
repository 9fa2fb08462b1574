use crate::cli::cache::{CacheCommand, CacheOptions};
use crate::cli::fetch::{FetchCommand, FetchOptions};
use crate::cli::push::{PushCommand, PushOptions, SyncCommand};

use clap::Parser;

pub mod cache;
pub mod fetch;
pub mod push;

#[derive(Parser)]
#[command(about = "Offline cache proxy for a single page site")]
struct Args {
    #[clap(subcommand)]
    pub command: Command,
    /// Origin of the site being proxied. Selects the config entries and
    /// decides which requests are same-origin.
    #[clap(long, global = true, default_value = "http://localhost:5173")]
    pub origin: String,
    /// Path to the config file. Defaults to ~/.config/oproxy/config
    #[clap(long, global = true)]
    pub config: Option<String>,
    /// Use an in-process cache that keeps nothing between runs
    #[clap(long, global = true)]
    pub no_cache: bool,
    /// Verbose mode. Logs lifecycle and cache decisions
    #[clap(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Parser)]
enum Command {
    #[clap(about = "Cache the install manifest and activate the current version")]
    Install,
    #[clap(about = "Delete cache partitions of previous versions")]
    Activate,
    #[clap(about = "Run a request through the proxy")]
    Fetch(FetchCommand),
    #[clap(about = "Inspect the local cache")]
    Cache(CacheCommand),
    #[clap(about = "Render the notification for a push payload")]
    Push(PushCommand),
    #[clap(about = "Run a background sync job")]
    Sync(SyncCommand),
}

pub struct CliArgs {
    pub origin: String,
    pub config: Option<String>,
    pub no_cache: bool,
    pub verbose: bool,
}

pub struct OptionArgs {
    pub cli_options: CliOptions,
    pub cli_args: CliArgs,
}

pub enum CliOptions {
    Install,
    Activate,
    Fetch(FetchOptions),
    Cache(CacheOptions),
    Push(PushOptions),
    Sync { tag: String },
}

// Parse cli and return the options. Clap structs stay private to this module
// and get converted into the public option types used by the commands.
pub fn parse_cli() -> OptionArgs {
    let args = Args::parse();
    let cli_args = CliArgs {
        origin: args.origin,
        config: args.config,
        no_cache: args.no_cache,
        verbose: args.verbose,
    };
    let cli_options = match args.command {
        Command::Install => CliOptions::Install,
        Command::Activate => CliOptions::Activate,
        Command::Fetch(sub_matches) => CliOptions::Fetch(sub_matches.into()),
        Command::Cache(sub_matches) => CliOptions::Cache(sub_matches.into()),
        Command::Push(sub_matches) => CliOptions::Push(sub_matches.into()),
        Command::Sync(sub_matches) => CliOptions::Sync {
            tag: sub_matches.tag,
        },
    };
    OptionArgs {
        cli_options,
        cli_args,
    }
}
