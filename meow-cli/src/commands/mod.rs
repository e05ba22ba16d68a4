mod add;
mod demo;
mod list;
mod read;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use console::{StyledObject, style};
use meow_core::logger::LogLevel;
use meow_core::logstore::{LogRecord, Severity, StoreConfig, TIMESTAMP_FORMAT};

use crate::config::CliOverride;

#[derive(Parser)]
#[command(name = "meow")]
#[command(about = "Append-only log store with line-based rotation", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Log folder, overrides the configured one
    #[arg(long, global = true)]
    pub folder: Option<PathBuf>,

    /// Lines per file before rotating
    #[arg(long, global = true)]
    pub max_lines: Option<usize>,

    /// Diagnostic log level of the tool itself
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Ignore the persisted configuration file
    #[arg(long, global = true)]
    pub no_config: bool,
}

impl GlobalArgs {
    pub fn overrides(&self) -> CliOverride {
        CliOverride {
            folder: self.folder.clone(),
            max_lines_per_file: self.max_lines,
            log_level: self.log_level,
        }
    }
}

impl Cli {
    pub fn handle(&self, store: &StoreConfig) -> Result<()> {
        match &self.command {
            Commands::Add(add_cli) => add_cli.handle(store),
            Commands::List(list_cli) => list_cli.handle(store),
            Commands::Read(read_cli) => read_cli.handle(),
            Commands::Demo(demo_cli) => demo_cli.handle(store),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Append one record
    Add(add::AddCli),
    /// List log files in chronological order
    List(list::ListCli),
    /// Print the records of one log file
    Read(read::ReadCli),
    /// Write sample records of every severity and print them back
    Demo(demo::DemoCli),
}

fn styled_severity(severity: Severity) -> StyledObject<&'static str> {
    let name = style(severity.as_str());
    match severity {
        Severity::Message => name,
        Severity::Tip => name.cyan(),
        Severity::Warning => name.yellow(),
        Severity::Error => name.red().bold(),
    }
}

pub(crate) fn format_record(record: &LogRecord) -> String {
    format!(
        "[{}][{}][{}] {}",
        record.timestamp().format(TIMESTAMP_FORMAT),
        styled_severity(record.severity()),
        record.name(),
        record.content()
    )
}
