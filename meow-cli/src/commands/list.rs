use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use meow_core::logstore::{LogReader, StoreConfig, read_log_file};
use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Records")]
    records: usize,
    #[tabled(rename = "Bytes")]
    bytes: u64,
}

#[derive(Parser)]
pub struct ListCli;

impl ListCli {
    pub fn handle(&self, store: &StoreConfig) -> Result<()> {
        let reader = LogReader::open(&store.folder)
            .with_context(|| format!("cannot list {}", store.folder.display()))?;

        if reader.list_files().is_empty() {
            println!("{}", style("No log files found.").yellow());
            return Ok(());
        }

        let mut rows = Vec::with_capacity(reader.list_files().len());
        for path in reader.list_files() {
            let records = read_log_file(path)?.len();
            let bytes = std::fs::metadata(path)
                .with_context(|| format!("cannot stat {}", path.display()))?
                .len();
            rows.push(FileRow {
                file: path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default(),
                records,
                bytes,
            });
        }

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
