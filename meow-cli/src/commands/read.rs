use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use meow_core::logstore::read_log_file;

use super::format_record;

#[derive(Parser)]
pub struct ReadCli {
    /// Log file to read
    pub path: PathBuf,

    /// Print one JSON object per record
    #[arg(long)]
    pub json: bool,
}

impl ReadCli {
    pub fn handle(&self) -> Result<()> {
        let records = read_log_file(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;

        for record in &records {
            if self.json {
                println!("{}", serde_json::to_string(record)?);
            } else {
                println!("{}", format_record(record));
            }
        }
        tracing::debug!(path = %self.path.display(), records = records.len(), "read finished");
        Ok(())
    }
}
