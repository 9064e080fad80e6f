use anyhow::Result;
use env_logger::{Env, Target};
use log::warn;
use std::fs::OpenOptions;

use projdash::cli::{
    commands::{handle_command, load_effective_config},
    Cli, Parser,
};
use projdash::models::Config;
use projdash::utils::config::get_log_path;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Config commands must still work when the file is broken
    let (config, load_error) = match load_effective_config(&cli) {
        Ok(config) => (config, None),
        Err(e) if !cli.uses_api() => (Config::default(), Some(e)),
        Err(e) => return Err(e),
    };

    init_logging(&cli, &config)?;
    if let Some(e) = load_error {
        warn!("Using default configuration: {:#}", e);
    }

    // Handle the command
    handle_command(cli, config).await
}

fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let default_level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(default_level));

    // The dashboard owns the terminal, so its logs go to a file
    if cli.runs_tui() {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(get_log_path()?)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}
