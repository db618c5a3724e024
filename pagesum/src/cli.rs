use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command line interface for pagesum
#[derive(Parser, Debug)]
#[command(author, version, about = "pagesum: summarize web pages into safe HTML")]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long)]
  pub verbose: bool,

  /// Path to the configuration file (TOML)
  #[arg(short = 'c', long = "config-file")]
  pub config_file: Option<PathBuf>,
}

/// How the summary is written out.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
  /// Raw markdown as returned by the model.
  Markdown,
  /// Rendered (and by default sanitized) HTML fragment.
  Fragment,
  /// Standalone HTML document with title, source URL, and timestamp.
  Page,
}

/// All supported subcommands for the pagesum CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new pagesum configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "pagesum.toml")]
    output: PathBuf,

    /// Force overwrite if the file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Render markdown text to HTML without calling the API.
  Render {
    /// Input file ('-' or omitted reads stdin)
    input: Option<String>,

    /// Run the rendered HTML through the sanitizer as well
    #[arg(long)]
    sanitize: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
  },

  /// Fetch a page, extract its readable text, and summarize it.
  Summarize {
    /// Page to summarize: a URL, a file path, or '-'/omitted for stdin
    input: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'F', long, value_enum, default_value = "page")]
    format: OutputFormat,

    /// Skip HTML sanitization of the rendered summary
    #[arg(long)]
    no_sanitize: bool,

    /// Override the configured model for this run
    #[arg(long)]
    model: Option<String>,

    /// Translate the summary into the given language (ISO 639-1 code)
    #[arg(long = "translate-to")]
    translate_to: Option<String>,
  },
}

impl Cli {
  /// Parse command line arguments.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
