use std::{
  fs,
  io::Read,
  path::Path,
};

use color_eyre::eyre::{Context, Result, bail};
use log::{LevelFilter, info};

mod cli;
mod config;
mod error;
mod extract;
mod page;
mod source;
mod summarize;

use cli::{Cli, Commands, OutputFormat};
use config::Config;
use pagesum_render::{render_markdown, sanitize_html};

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match &cli.command {
    Commands::Init { output, force } => {
      if output.exists() && !force {
        bail!(
          "Configuration file already exists: {}. Use --force to overwrite.",
          output.display()
        );
      }

      Config::generate_default_config(output).wrap_err_with(|| {
        format!(
          "Failed to generate configuration file: {}",
          output.display()
        )
      })?;

      info!(
        "Configuration file created at {}. Add your API key to it or set \
         PAGESUM_API_KEY.",
        output.display()
      );
      Ok(())
    },

    Commands::Render {
      input,
      sanitize,
      output,
    } => {
      let markdown = read_text_input(input.as_deref())?;
      let mut html = render_markdown(&markdown);
      if *sanitize {
        html = sanitize_html(&html);
      }
      write_output(output.as_deref(), &html)
    },

    Commands::Summarize {
      input,
      output,
      format,
      no_sanitize,
      model,
      translate_to,
    } => {
      let mut config = Config::load(cli.config_file.as_deref())?;
      if let Some(model) = model {
        config.model.clone_from(model);
      }
      if let Some(language) = translate_to {
        config.translate_to = Some(language.clone());
      }

      let source = source::select_source(input.as_deref());
      info!("Reading page from {}", source.describe());
      let page = source.fetch()?;

      let content = extract::extract_content(&page.html)?;
      info!(
        "Extracted {} characters of content",
        content.text.chars().count()
      );

      let summary = summarize::summarize(&config, &content.text)?;

      let rendered = match format {
        OutputFormat::Markdown => summary,
        OutputFormat::Fragment | OutputFormat::Page => {
          let mut html = render_markdown(&summary);
          if !no_sanitize {
            html = sanitize_html(&html);
          }
          if *format == OutputFormat::Page {
            page::build_page(
              content.title.as_deref(),
              page.url.as_deref(),
              &html,
            )
          } else {
            html
          }
        },
      };

      write_output(output.as_deref(), &rendered)
    },
  }
}

/// Read markdown for the `render` subcommand: a file path, or stdin when
/// the argument is `-` or missing.
fn read_text_input(input: Option<&str>) -> Result<String> {
  match input {
    None | Some("-") => {
      let mut text = String::new();
      std::io::stdin().read_to_string(&mut text)?;
      Ok(text)
    },
    Some(path) => fs::read_to_string(path)
      .wrap_err_with(|| format!("Failed to read input file: {path}")),
  }
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
  match output {
    Some(path) => {
      fs::write(path, content).wrap_err_with(|| {
        format!("Failed to write output file: {}", path.display())
      })?;
      info!("Wrote {}", path.display());
    },
    None => println!("{content}"),
  }
  Ok(())
}
