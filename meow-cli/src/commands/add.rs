use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use meow_core::logstore::{LogWriter, Severity, StoreConfig};

use super::format_record;

#[derive(Parser)]
pub struct AddCli {
    /// Message, Tip, Warning or Error (any casing)
    #[arg(short, long, default_value = "message")]
    pub severity: Severity,

    /// Record name
    #[arg(short, long)]
    pub name: String,

    /// Record content
    #[arg(short, long)]
    pub content: String,
}

impl AddCli {
    pub fn handle(&self, store: &StoreConfig) -> Result<()> {
        let mut writer = LogWriter::from_config(store)
            .with_context(|| format!("cannot open log folder {}", store.folder.display()))?;
        writer.on_record(|record| println!("  {} {}", style("✓").green(), format_record(record)));

        writer
            .add_log(self.severity, self.name.as_str(), self.content.as_str())
            .context("failed to append record")?;

        if let Some(path) = writer.active_file() {
            println!("{}", style(format!("Appended to {}", path.display())).dim());
        }
        Ok(())
    }
}
