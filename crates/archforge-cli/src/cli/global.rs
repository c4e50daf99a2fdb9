//! Flags shared by every archforge subcommand.
//!
//! Flattened into [`super::Cli`] with `global = true`, so
//! `archforge generate arch.yaml -vv --output-format json` and
//! `archforge -vv generate arch.yaml` mean the same thing.

use std::path::PathBuf;

use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Log more about the generation run on stderr.
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        long_help = "Log more about the generation run on stderr:
    (none)  - warnings, e.g. components rendered as placeholders
    -v      - one line per emitted format
    -vv     - one line per component and its allocated identifier
    -vvv    - every span and event archforge records

RUST_LOG overrides this when set."
    )]
    pub verbose: u8,

    /// Print only errors; the written files are the result.
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print without ANSI colours (also enabled by a non-empty NO_COLOR).
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Read defaults from this TOML file instead of `.archforge.toml`.
    ///
    /// `ARCHFORGE_*` environment variables and command-line flags still win
    /// over values from the file.
    #[arg(short = 'c', long = "config", global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// How summaries and degradation reports are printed.
    #[arg(long = "output-format", global = true, value_enum, default_value = "auto")]
    pub output_format: OutputFormat,
}

/// Rendering of summaries and degradation reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `human` on a terminal, `plain` when piped.
    #[default]
    Auto,
    /// Coloured, with a symbol per message.
    Human,
    /// Same text as `human`, no colour.
    Plain,
    /// One JSON summary per run on stdout, JSON log lines on stderr.
    Json,
}
