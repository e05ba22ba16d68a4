use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use meow_core::logstore::{LogReader, LogWriter, Severity, StoreConfig, read_log_file};

use super::format_record;

#[derive(Parser)]
pub struct DemoCli {
    /// Number of rounds, each round writes one record per severity
    #[arg(short, long, default_value_t = 200)]
    pub rounds: usize,
}

fn sample(severity: Severity, round: usize) -> (String, String) {
    match severity {
        Severity::Message => (format!("消息{round}"), format!("消息内容{round}")),
        Severity::Tip => (format!("提示{round}"), format!("提示内容{round}")),
        Severity::Warning => (format!("警告{round}"), format!("警告内容{round}")),
        Severity::Error => (format!("错误{round}"), format!("错误内容{round}")),
    }
}

impl DemoCli {
    pub fn handle(&self, store: &StoreConfig) -> Result<()> {
        let mut writer = LogWriter::from_config(store)
            .with_context(|| format!("cannot open log folder {}", store.folder.display()))?;

        for round in 0..self.rounds {
            for severity in Severity::ALL {
                let (name, content) = sample(severity, round);
                writer.add_log(severity, name, content)?;
            }
        }
        println!(
            "{}",
            style(format!(
                "Wrote {} record(s) into {}",
                self.rounds * Severity::ALL.len(),
                store.folder.display()
            ))
            .cyan()
        );

        let reader = LogReader::open(writer.folder())?;
        for path in reader.list_files() {
            println!("{}", style(path.display()).bold());
            for record in read_log_file(path)? {
                println!("  {}", format_record(&record));
            }
        }
        Ok(())
    }
}
