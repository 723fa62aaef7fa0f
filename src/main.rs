//! taskfmt - task result formatter
//!
//! CLI entry point: reads the host's lifecycle events as JSON lines and
//! renders them to the terminal.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use taskfmt::callback::Host;
use taskfmt::cli::OutputSink;
use taskfmt::{parse_event, Console, DisplayConfig, ResultFormatter};

/// Task result formatter
///
/// Reads one lifecycle event per line (play_start, task_start,
/// runner_result, item_result, ...) and prints banners, command
/// transcripts and result dumps.
#[derive(Parser, Debug)]
#[command(name = "taskfmt", version, about)]
struct Cli {
    /// Path to a taskfmt.toml configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read events from this file instead of stdin
    #[arg(long)]
    input: Option<PathBuf>,

    /// Show task arguments in banners
    #[arg(long)]
    show_args: bool,

    /// Disable colors
    #[arg(long)]
    no_color: bool,

    /// Increase verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Load the config file (or defaults), then environment, then CLI flags.
fn load_config(cli: &Cli) -> Result<DisplayConfig> {
    let mut config = match &cli.config {
        Some(path) => DisplayConfig::from_path(path)
            .with_context(|| format!("Failed to load config from '{}'", path.display()))?,
        None => DisplayConfig::default(),
    };
    config
        .apply_env(|key| std::env::var(key).ok())
        .context("Invalid display setting in environment")?;
    apply_cli_overrides(&mut config, cli);
    Ok(config)
}

fn apply_cli_overrides(config: &mut DisplayConfig, cli: &Cli) {
    if cli.show_args {
        config.display.show_args = true;
    }
    if cli.no_color {
        config.display.nocolor = true;
    }
    if cli.verbose > 0 {
        config.display.verbosity = cli.verbose;
    }
}

fn init_tracing() {
    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::new("warn"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Feed every event line from `reader` to the formatter. Returns the number
/// of events handled.
async fn pump<R, S, H>(reader: R, formatter: &mut ResultFormatter<S, H>) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    S: OutputSink,
    H: Host,
{
    let mut lines = reader.lines();
    let mut line_num = 0;
    let mut handled = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read event stream")?
    {
        line_num += 1;
        let Some(event) =
            parse_event(&line).with_context(|| format!("Invalid event on line {line_num}"))?
        else {
            continue;
        };
        formatter.handle(&event);
        handled += 1;
    }

    Ok(handled)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_config(&cli)?;
    tracing::debug!(config = ?config, "display configuration loaded");

    let mut formatter = ResultFormatter::from_config(&config, Console)?;

    let handled = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open '{}'", path.display()))?;
            pump(BufReader::new(file), &mut formatter).await?
        }
        None => pump(BufReader::new(tokio::io::stdin()), &mut formatter).await?,
    };

    tracing::debug!(
        events = handled,
        tasks = formatter.task_counter(),
        "event stream finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskfmt::callback::FormatterOptions;
    use taskfmt::{BufferSink, DefaultHost, Palette};

    fn plain_formatter() -> ResultFormatter<BufferSink> {
        let options = FormatterOptions {
            palette: Palette::plain(),
            ..FormatterOptions::default()
        };
        ResultFormatter::new(BufferSink::new(), DefaultHost::new(Palette::plain(), 0), options)
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from(["taskfmt", "--show-args", "--no-color", "-vv"]).unwrap();
        let mut config = DisplayConfig::default();
        apply_cli_overrides(&mut config, &cli);

        assert!(config.display.show_args);
        assert!(config.display.nocolor);
        assert_eq!(config.display.verbosity, 2);
    }

    #[test]
    fn test_cli_without_flags_keeps_config() {
        let cli = Cli::try_parse_from(["taskfmt"]).unwrap();
        let mut config = DisplayConfig::parse("[display]\nshow_args = true\nverbosity = 1\n").unwrap();
        apply_cli_overrides(&mut config, &cli);

        assert!(config.display.show_args);
        assert_eq!(config.display.verbosity, 1);
    }

    #[test]
    fn test_load_config_missing_file() {
        let cli = Cli::try_parse_from(["taskfmt", "--config", "/nonexistent/taskfmt.toml"]).unwrap();
        let err = load_config(&cli).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[tokio::test]
    async fn test_pump_renders_events() {
        let input = concat!(
            r#"{"event":"play_start","play":{"name":"p","tasks":[[{"action":"command"}]]}}"#,
            "\n\n",
            r#"{"event":"task_start","task":{"name":"Say hi","action":"command"}}"#,
            "\n",
            r#"{"event":"runner_result","status":"ok","result":{"host":"h","task":{"name":"Say hi","action":"command"},"payload":{"cmd":"echo hi","stdout":"hi"}}}"#,
            "\n"
        );
        let mut formatter = plain_formatter();

        let handled = pump(input.as_bytes(), &mut formatter).await.unwrap();

        assert_eq!(handled, 3);
        let text = formatter.sink().text();
        assert!(text.contains("[OK] 1/1 Say hi (0s)"));
        assert!(text.contains("$ echo hi\nhi"));
    }

    #[tokio::test]
    async fn test_pump_reports_line_number() {
        let input = "{\"event\":\"task_start\",\"task\":{\"action\":\"ping\"}}\nnot json\n";
        let mut formatter = plain_formatter();

        let err = pump(input.as_bytes(), &mut formatter).await.unwrap_err();

        assert!(err.to_string().contains("line 2"));
        // The first event was still handled
        assert_eq!(formatter.task_counter(), 1);
    }
}
