use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rewind_history::HistoryConfig;

mod session;

use session::{Reply, Session};

/// Interactive undo/redo playground over a single integer value.
///
/// Commands: set <n>, add <n>, undo, redo, clear, status, history, value, quit.
#[derive(Parser, Debug)]
#[command(name = "rewind", version, about)]
struct Cli {
    /// Maximum number of actions kept in history. Overrides the config file.
    #[arg(long = "max-history-size")]
    max_history_size: Option<usize>,

    /// JSON config file. Created with defaults if missing.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Resolution order: command-line flag, config file, built-in default.
    fn history_config(&self) -> HistoryConfig {
        let mut config = match &self.config {
            Some(path) => HistoryConfig::load_or_create(path),
            None => HistoryConfig::default(),
        };
        if let Some(size) = self.max_history_size {
            config.max_history_size = size;
        }
        config.sanitize();
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.history_config();
    tracing::info!(
        "Starting rewind with max_history_size = {}",
        config.max_history_size
    );

    let mut session = Session::new(config);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        match session.execute(&line) {
            Ok(Reply::Output(text)) if text.is_empty() => {}
            Ok(Reply::Output(text)) => writeln!(stdout, "{text}")?,
            Ok(Reply::Quit) => break,
            Err(e) => writeln!(stdout, "error: {e:#}")?,
        }
        stdout.flush()?;
    }

    tracing::info!("Exiting rewind");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_overrides_default() {
        let cli = Cli::parse_from(["rewind", "--max-history-size", "7"]);
        assert_eq!(cli.history_config().max_history_size, 7);
    }

    #[test]
    fn test_flag_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rewind.json");
        std::fs::write(&path, r#"{"max_history_size": 3}"#).unwrap();

        let cli = Cli::parse_from([
            "rewind",
            "--config",
            path.to_str().unwrap(),
            "--max-history-size",
            "9",
        ]);
        assert_eq!(cli.history_config().max_history_size, 9);

        let cli = Cli::parse_from(["rewind", "--config", path.to_str().unwrap()]);
        assert_eq!(cli.history_config().max_history_size, 3);
    }

    #[test]
    fn test_zero_flag_is_sanitized() {
        let cli = Cli::parse_from(["rewind", "--max-history-size", "0"]);
        assert_eq!(cli.history_config().max_history_size, 1);
    }
}
