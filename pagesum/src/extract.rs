use kuchikikiki::NodeRef;
use log::debug;
use tendril::TendrilSink;

use crate::error::{PagesumError, Result};

/// Elements that never contribute readable prose, removed before any
/// content selection happens.
const UNWANTED_SELECTORS: &str = "script, style, nav, header, footer, aside, \
                                  .advertisement, .ads, .popup, .modal, \
                                  .cookie-banner, [class*=\"ad-\"], \
                                  [id*=\"ad-\"], [class*=\"sponsor\"]";

/// Containers likely to hold the main article, tried in order.
const CONTENT_SELECTORS: &[&str] = &[
  "main",
  "article",
  "[role=\"main\"]",
  ".content",
  ".main-content",
  ".post-content",
  ".entry-content",
  ".article-content",
  ".story-body",
  ".post-body",
];

/// A candidate must carry at least this much text to count as the article.
const MIN_CONTENT_CHARS: usize = 50;

/// Hard cap on extracted text, to bound the tokens sent upstream.
const MAX_CONTENT_CHARS: usize = 15_000;

/// Readable content pulled out of a fetched page.
#[derive(Debug, Clone)]
pub struct PageContent {
  /// Document title, if the page has one
  pub title: Option<String>,
  /// Whitespace-normalized article text, capped at 15000 characters
  pub text:  String,
}

/// Extract the readable text and title from raw HTML.
///
/// Boilerplate elements are stripped first, then known content containers
/// are tried in priority order; the whole body is the fallback when none of
/// them holds enough text.
pub fn extract_content(html: &str) -> Result<PageContent> {
  let document = kuchikikiki::parse_html().one(html);

  let title = document
    .select_first("title")
    .ok()
    .map(|node| normalize_whitespace(&node.text_contents()))
    .filter(|text| !text.is_empty());

  remove_unwanted(&document);

  let mut text = String::new();
  for selector in CONTENT_SELECTORS {
    if let Some(candidate) = first_match_text(&document, selector) {
      if candidate.chars().count() >= MIN_CONTENT_CHARS {
        debug!("Extracted content via selector {selector}");
        text = candidate;
        break;
      }
    }
  }

  if text.is_empty() {
    debug!("No content container matched, falling back to <body>");
    text = first_match_text(&document, "body")
      .unwrap_or_else(|| normalize_whitespace(&document.text_contents()));
  }

  if text.is_empty() {
    return Err(PagesumError::Extract(
      "Page contains no readable text".to_string(),
    ));
  }

  Ok(PageContent {
    title,
    text: truncate_chars(&text, MAX_CONTENT_CHARS),
  })
}

/// Detach every element matching [`UNWANTED_SELECTORS`] from the tree.
fn remove_unwanted(document: &NodeRef) {
  let Ok(matches) = document.select(UNWANTED_SELECTORS) else {
    return;
  };
  // Collect before detaching so iteration does not walk a mutating tree.
  let nodes: Vec<NodeRef> =
    matches.map(|node| node.as_node().clone()).collect();
  debug!("Removing {} boilerplate elements", nodes.len());
  for node in nodes {
    node.detach();
  }
}

/// Normalized text of the first element matching `selector`, if any.
fn first_match_text(document: &NodeRef, selector: &str) -> Option<String> {
  let node = document.select_first(selector).ok()?;
  let text = normalize_whitespace(&node.text_contents());
  if text.is_empty() { None } else { Some(text) }
}

/// Collapse all whitespace runs to single spaces and trim the ends.
fn normalize_whitespace(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `limit` characters, marking the cut with `...`.
fn truncate_chars(text: &str, limit: usize) -> String {
  match text.char_indices().nth(limit) {
    Some((idx, _)) => {
      let mut truncated = text[..idx].to_string();
      truncated.push_str("...");
      truncated
    },
    None => text.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::{extract_content, normalize_whitespace, truncate_chars};

  const FILLER: &str = "This paragraph exists so the extracted container \
                        clears the minimum length check applied to every \
                        candidate element.";

  #[test]
  fn prefers_main_over_body() {
    let html = format!(
      "<html><head><title>A Page</title></head><body>\
       <nav>Home About</nav>\
       <main><p>{FILLER}</p></main>\
       <footer>copyright</footer></body></html>"
    );
    let content = extract_content(&html).expect("extraction must succeed");
    assert_eq!(content.title.as_deref(), Some("A Page"));
    assert_eq!(content.text, FILLER);
  }

  #[test]
  fn strips_scripts_and_ad_classes() {
    let html = format!(
      "<html><body><article>\
       <script>var x = 1;</script>\
       <div class=\"ad-banner\">buy things</div>\
       <div class=\"sponsored-link\">sponsor</div>\
       <p>{FILLER}</p></article></body></html>"
    );
    let content = extract_content(&html).expect("extraction must succeed");
    assert!(!content.text.contains("var x"));
    assert!(!content.text.contains("buy things"));
    assert!(!content.text.contains("sponsor"));
    assert!(content.text.contains("minimum length"));
  }

  #[test]
  fn short_container_falls_through_to_body() {
    let html = format!(
      "<html><body><main>tiny</main><p>{FILLER}</p></body></html>"
    );
    let content = extract_content(&html).expect("extraction must succeed");
    assert!(content.text.contains("tiny"));
    assert!(content.text.contains("minimum length"));
  }

  #[test]
  fn empty_page_is_an_error() {
    assert!(extract_content("<html><body></body></html>").is_err());
  }

  #[test]
  fn whitespace_is_normalized() {
    assert_eq!(normalize_whitespace("  a\n\n  b\t c  "), "a b c");
  }

  #[test]
  fn long_text_is_capped_with_ellipsis() {
    let long = "x".repeat(20);
    assert_eq!(truncate_chars(&long, 10), format!("{}...", "x".repeat(10)));
    assert_eq!(truncate_chars("short", 10), "short");
  }

  #[test]
  fn missing_title_is_none() {
    let html =
      format!("<html><body><main><p>{FILLER}</p></main></body></html>");
    let content = extract_content(&html).expect("extraction must succeed");
    assert!(content.title.is_none());
  }
}
