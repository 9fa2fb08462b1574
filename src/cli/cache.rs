use clap::Parser;

#[derive(Parser)]
pub struct CacheCommand {
    #[clap(subcommand)]
    subcommand: CacheSubcommand,
}

#[derive(Parser)]
enum CacheSubcommand {
    #[clap(name = "list", about = "List cache partitions and their entry count")]
    List,
    #[clap(name = "info", about = "Get local cache size and location")]
    Info,
}

pub enum CacheOptions {
    List,
    Info,
}

impl From<CacheCommand> for CacheOptions {
    fn from(options: CacheCommand) -> Self {
        match options.subcommand {
            CacheSubcommand::List => CacheOptions::List,
            CacheSubcommand::Info => CacheOptions::Info,
        }
    }
}
