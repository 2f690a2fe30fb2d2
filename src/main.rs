//! # Subspace - A Modal Text Editor Core
//!
//! The binary drives an [`EditorSession`] headlessly: it opens a file,
//! replays a key script through the same dispatch a frontend would use,
//! optionally saves, and prints the resulting document.
//!
//! ## Quick Start
//!
//! ```bash
//! # Print a file through the editor
//! cargo run -- notes.txt
//!
//! # Toggle Command mode with F2, jump to line 5, type, save
//! cargo run -- notes.txt --keys "f2 G 5 G f2 h i" --save
//!
//! # Debug logging for the dispatch
//! SUBSPACE_LOG=subspace_core=debug cargo run -- notes.txt --keys "f2 G G"
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subspace_core::{Config, EditorSession, KeyOutcome, KeyPress};

/// Subspace - a modal text editor core
#[derive(Parser, Debug)]
#[command(name = "subspace")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to open
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Whitespace-separated keys to replay, e.g. "f2 G 1 2 G f2 x"
    #[arg(short, long, value_name = "SCRIPT")]
    keys: Option<String>,

    /// Save the file after replaying the keys
    #[arg(short, long)]
    save: bool,

    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the effective config to the config path, then continue
    #[arg(long)]
    write_config: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    tracing::info!("Starting Subspace v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load(),
    };

    if args.write_config {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => Config::default_path()?,
        };
        config
            .save_to(&path)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        tracing::info!("Wrote config to {}", path.display());
    }

    let text = run(&args, config)?;
    print!("{}", text);
    Ok(())
}

/// `SUBSPACE_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::try_from_env("SUBSPACE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(filter)
        .init();
}

/// Replays the session described by `args` and returns the visible text.
fn run(args: &Args, config: Config) -> anyhow::Result<String> {
    let mut session = EditorSession::from_config(config).context("Failed to start session")?;

    if let Some(file) = &args.file {
        session
            .swap_file(file)
            .with_context(|| format!("Failed to open {}", file.display()))?;
    }

    if let Some(script) = &args.keys {
        let keys = KeyPress::parse_sequence(script).context("Invalid key script")?;
        for key in &keys {
            match session.handle_key(key) {
                Ok(KeyOutcome::Handled) => {}
                Ok(outcome) => tracing::debug!("{}: {:?}", key, outcome),
                Err(e) => tracing::warn!("{}: {}", key, e),
            }
        }
    }

    if args.save {
        session.save().context("Failed to save")?;
    } else if session.buffers().has_unsaved() {
        tracing::warn!("Edits were not saved; pass --save to write them");
    }

    let cursor = session.view().cursor_position();
    tracing::info!(
        "Cursor {} | {} | {}",
        cursor,
        session.mode().as_str(),
        session.title()
    );
    Ok(session.view().text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["subspace"]);
        assert!(args.file.is_none());
        assert!(args.keys.is_none());
        assert!(!args.save);
        assert!(!args.write_config);
    }

    #[test]
    fn test_args_with_file_and_keys() {
        let args = Args::parse_from(["subspace", "test.txt", "--keys", "f2 G 3 G", "-s", "-vv"]);
        assert_eq!(args.file, Some(PathBuf::from("test.txt")));
        assert_eq!(args.keys.as_deref(), Some("f2 G 3 G"));
        assert!(args.save);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_run_replays_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "one\ntwo\nthree").unwrap();

        let args = Args::parse_from([
            "subspace",
            path.to_str().unwrap(),
            "--keys",
            "f2 G 2 G f2 ( x",
            "--save",
        ]);
        let text = run(&args, Config::default()).unwrap();

        assert_eq!(text, "one\n(x)two\nthree");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn test_run_without_save_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "one").unwrap();

        let args = Args::parse_from(["subspace", path.to_str().unwrap(), "--keys", "x"]);
        assert_eq!(run(&args, Config::default()).unwrap(), "xone");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one");
    }

    #[test]
    fn test_run_rejects_bad_script() {
        let args = Args::parse_from(["subspace", "--keys", "f2 nonsense"]);
        assert!(run(&args, Config::default()).is_err());
    }
}
