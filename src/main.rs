use std::{fs::File, io, path::PathBuf, sync::Arc};

use env_logger::Env;
use oproxy::{
    cli::{parse_cli, CliArgs, CliOptions},
    cmds::{cache, common, fetch, lifecycle, push},
    config::{Config, ConfigProperties},
    error::{AddContext, ProxyError},
    notify::Notifier,
    refresh::ThreadSpawner,
    Result,
};
use url::Url;

const CONFIG_PATH: &str = ".config/oproxy/config";

fn main() -> Result<()> {
    let option_args = parse_cli();
    let cli_args = option_args.cli_args;
    let filter = if cli_args.verbose { "info" } else { "warn" };
    env_logger::init_from_env(Env::default().default_filter_or(filter));

    let origin = Url::parse(&cli_args.origin).map_err(|err| {
        ProxyError::InvalidUrl(format!("Invalid origin {}: {err}", cli_args.origin))
    })?;
    let config = Arc::new(read_config(&cli_args, &origin)?);
    let mut stdout = io::stdout();
    let spawner = Arc::new(ThreadSpawner::default());
    let notifier = || Notifier::new(origin.clone(), config.icon());
    let proxy = |spawner: Arc<ThreadSpawner>| {
        common::proxy(origin.clone(), config.clone(), cli_args.no_cache, spawner)
    };
    match option_args.cli_options {
        CliOptions::Install => lifecycle::install(&proxy(spawner)?, &mut stdout),
        CliOptions::Activate => lifecycle::activate(&proxy(spawner)?, &mut stdout),
        CliOptions::Fetch(options) => {
            let result = fetch::execute(options, &proxy(spawner.clone())?, &mut stdout);
            // Let background refreshes land in the cache before exiting.
            spawner.wait();
            result
        }
        CliOptions::Cache(options) => {
            cache::execute(options, config.clone(), cli_args.no_cache, &mut stdout)
        }
        CliOptions::Push(options) => push::execute(options, &notifier(), io::stdin(), &mut stdout),
        CliOptions::Sync { tag } => push::sync(&tag, &notifier(), &mut stdout),
    }
}

// Entries are read for the origin's host. Without a config file the
// defaults apply, which is enough for --no-cache and the side channels.
fn read_config(cli_args: &CliArgs, origin: &Url) -> Result<Config> {
    let config_file = match &cli_args.config {
        Some(path) => PathBuf::from(path),
        None => match std::env::var("HOME") {
            Ok(home_dir) => PathBuf::from(home_dir).join(CONFIG_PATH),
            Err(_) => return Ok(Config::default()),
        },
    };
    if !config_file.exists() {
        if cli_args.config.is_some() {
            return Err(ProxyError::ConfigurationError(format!(
                "Config file {} does not exist",
                config_file.display()
            ))
            .into());
        }
        return Ok(Config::default());
    }
    let host = origin.host_str().unwrap_or_default();
    let f = File::open(&config_file)
        .err_context(format!("Unable to open config file {}", config_file.display()))?;
    Config::new(f, host)
}
