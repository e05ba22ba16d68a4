use anyhow::Result;
use clap::Parser;
use meow_cli::commands::Cli;
use meow_cli::config::CliConfig;
use meow_core::logger::Logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = if cli.global.no_config {
        CliConfig::default()
    } else {
        CliConfig::load()?
    };
    config.merge(cli.global.overrides());

    let _guard = Logger::builder().level(config.log_level).stdout().build().init()?;
    tracing::debug!(folder = %config.store.folder.display(), "using log folder");

    cli.handle(&config.store)
}
