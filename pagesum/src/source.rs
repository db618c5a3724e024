use std::{
  fs,
  io::Read,
  path::PathBuf,
  thread,
  time::Duration,
};

use log::{debug, warn};

use crate::error::{PagesumError, Result};

/// Attempts made before a URL fetch is reported as failed.
const FETCH_ATTEMPTS: u32 = 3;

/// Pause between fetch attempts.
const FETCH_RETRY_DELAY: Duration = Duration::from_millis(500);

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw page HTML along with where it came from.
#[derive(Debug, Clone)]
pub struct FetchedPage {
  pub html: String,
  /// Source URL when the page was fetched over HTTP
  pub url:  Option<String>,
}

/// Something that can produce a page to summarize.
pub trait PageSource {
  /// Human-readable description used in log and error messages.
  fn describe(&self) -> String;

  /// Produce the page HTML.
  fn fetch(&self) -> Result<FetchedPage>;
}

/// Fetches a page over HTTP(S), retrying transient failures.
pub struct UrlSource {
  url: String,
}

impl UrlSource {
  #[must_use]
  pub fn new(url: impl Into<String>) -> Self {
    Self { url: url.into() }
  }

  /// One fetch attempt. An empty body counts as a failure so it is retried
  /// like any transport error.
  fn try_fetch(
    client: &reqwest::blocking::Client,
    url: &str,
  ) -> std::result::Result<String, String> {
    let response = client
      .get(url)
      .send()
      .and_then(reqwest::blocking::Response::error_for_status)
      .map_err(|e| e.to_string())?;
    let html = response.text().map_err(|e| e.to_string())?;
    if html.trim().is_empty() {
      return Err("response body was empty".to_string());
    }
    Ok(html)
  }
}

impl PageSource for UrlSource {
  fn describe(&self) -> String {
    self.url.clone()
  }

  fn fetch(&self) -> Result<FetchedPage> {
    let client = reqwest::blocking::Client::builder()
      .timeout(FETCH_TIMEOUT)
      .build()?;

    let mut last_error = String::new();
    for attempt in 1..=FETCH_ATTEMPTS {
      debug!("Fetching {} (attempt {attempt}/{FETCH_ATTEMPTS})", self.url);
      match Self::try_fetch(&client, &self.url) {
        Ok(html) => {
          return Ok(FetchedPage {
            html,
            url: Some(self.url.clone()),
          });
        },
        Err(e) => {
          warn!("Fetching {} failed: {e}", self.url);
          last_error = e;
        },
      }
      if attempt < FETCH_ATTEMPTS {
        thread::sleep(FETCH_RETRY_DELAY);
      }
    }

    Err(PagesumError::Source(format!(
      "Failed to fetch {} after {FETCH_ATTEMPTS} attempts: {last_error}",
      self.url
    )))
  }
}

/// Reads a saved page from disk.
pub struct FileSource {
  path: PathBuf,
}

impl FileSource {
  #[must_use]
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl PageSource for FileSource {
  fn describe(&self) -> String {
    self.path.display().to_string()
  }

  fn fetch(&self) -> Result<FetchedPage> {
    let html = fs::read_to_string(&self.path).map_err(|e| {
      PagesumError::Source(format!(
        "Failed to read {}: {e}",
        self.path.display()
      ))
    })?;
    Ok(FetchedPage { html, url: None })
  }
}

/// Reads a page from standard input.
pub struct StdinSource;

impl PageSource for StdinSource {
  fn describe(&self) -> String {
    "stdin".to_string()
  }

  fn fetch(&self) -> Result<FetchedPage> {
    let mut html = String::new();
    std::io::stdin().read_to_string(&mut html)?;
    Ok(FetchedPage { html, url: None })
  }
}

/// Pick the right source for a CLI input argument. URLs are anything
/// starting with an HTTP scheme, `-` or a missing argument means stdin,
/// and everything else is treated as a file path.
#[must_use]
pub fn select_source(input: Option<&str>) -> Box<dyn PageSource> {
  match input {
    None | Some("-") => Box::new(StdinSource),
    Some(input)
      if input.starts_with("http://") || input.starts_with("https://") =>
    {
      Box::new(UrlSource::new(input))
    },
    Some(input) => Box::new(FileSource::new(input)),
  }
}
