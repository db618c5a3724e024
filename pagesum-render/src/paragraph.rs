//! Paragraph assembly.
//!
//! Splits the block-transformed text on blank-line boundaries, wraps bare
//! text runs in `<p>` and leaves block-level content alone, then runs cleanup
//! passes: empty paragraphs are removed, a paragraph whose sole content is a
//! block element loses its wrapper, and adjacent blockquotes produced across
//! group boundaries merge into one.

use std::sync::LazyLock;

use log::error;
use regex::Regex;

use crate::{inline::MaskedSegments, util::never_matching_regex};

/// Tags that mark a group as already block-level, in match order.
const BLOCK_TAG_PREFIXES: &[&str] = &[
  "<h1>",
  "<h2>",
  "<h3>",
  "<h4>",
  "<h5>",
  "<h6>",
  "<ul>",
  "<ol>",
  "<pre>",
  "<blockquote>",
];

/// Collapses any run of blank lines (with optional trailing spaces or tabs)
/// to exactly one paragraph separator.
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\n(?:[ \t]*\n)+").unwrap_or_else(|e| {
    error!("Failed to compile BLANK_RUN_RE regex: {e}");
    never_matching_regex()
  })
});

static EMPTY_PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"<p>\s*</p>").unwrap_or_else(|e| {
    error!("Failed to compile EMPTY_PARAGRAPH_RE regex: {e}");
    never_matching_regex()
  })
});

/// One unwrapping pattern per block tag; the regex crate has no backreferences
/// so the closing tag is spelled out per pattern.
static SOLE_BLOCK_IN_PARAGRAPH_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
  ["h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "pre", "blockquote"]
    .iter()
    .map(|tag| {
      Regex::new(&format!(r"<p>(<{tag}>(?s:.*?)</{tag}>)</p>")).unwrap_or_else(
        |e| {
          error!("Failed to compile sole-block pattern for <{tag}>: {e}");
          never_matching_regex()
        },
      )
    })
    .collect()
});

static ADJACENT_BLOCKQUOTES_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"</blockquote>\s*<blockquote>").unwrap_or_else(|e| {
    error!("Failed to compile ADJACENT_BLOCKQUOTES_RE regex: {e}");
    never_matching_regex()
  })
});

fn starts_with_block_tag(group: &str) -> bool {
  BLOCK_TAG_PREFIXES
    .iter()
    .any(|prefix| group.starts_with(prefix))
}

/// Assemble paragraphs from block-transformed text and run cleanup passes.
#[must_use]
pub fn assemble(text: &str) -> String {
  assemble_groups(text, |_| false)
}

/// Like [`assemble`], but aware of masked fenced code: a group opening with a
/// fence placeholder is block-level even though the `<pre>` markup is not in
/// the text yet. Placeholders carry no newlines, so a fence whose content has
/// blank lines still forms a single group here.
pub(crate) fn assemble_masked(text: &str, masks: &MaskedSegments) -> String {
  assemble_groups(text, |group| {
    group
      .lines()
      .next()
      .is_some_and(|line| masks.is_fence_line(line))
  })
}

fn assemble_groups(
  text: &str,
  is_masked_block: impl Fn(&str) -> bool,
) -> String {
  let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
  let collapsed = BLANK_RUN_RE.replace_all(&normalized, "\n\n");

  let mut out: Vec<String> = Vec::new();
  for group in collapsed.split("\n\n") {
    let group = group.trim();
    if group.is_empty() {
      continue;
    }

    let with_breaks = group.replace('\n', "<br />");
    if starts_with_block_tag(group) || is_masked_block(group) {
      out.push(with_breaks);
    } else {
      out.push(format!("<p>{with_breaks}</p>"));
    }
  }

  cleanup(out.join("\n"))
}

/// Post-pass cleanup over the assembled HTML.
fn cleanup(html: String) -> String {
  let mut html = EMPTY_PARAGRAPH_RE.replace_all(&html, "").into_owned();
  for pattern in SOLE_BLOCK_IN_PARAGRAPH_RES.iter() {
    html = pattern.replace_all(&html, "$1").into_owned();
  }
  ADJACENT_BLOCKQUOTES_RE
    .replace_all(&html, "<br />")
    .into_owned()
}

#[cfg(test)]
mod tests {
  use super::assemble;

  #[test]
  fn bare_text_is_wrapped() {
    assert_eq!(assemble("hello"), "<p>hello</p>");
  }

  #[test]
  fn blank_runs_collapse_to_one_separator() {
    assert_eq!(assemble("a\n\n\n\nb"), "<p>a</p>\n<p>b</p>");
    assert_eq!(assemble("a\n \t \nb"), "<p>a</p>\n<p>b</p>");
  }

  #[test]
  fn block_content_is_not_double_wrapped() {
    assert_eq!(assemble("<h2>Title</h2>"), "<h2>Title</h2>");
    assert_eq!(
      assemble("<ul><li>a</li></ul>\n\ntext"),
      "<ul><li>a</li></ul>\n<p>text</p>"
    );
  }

  #[test]
  fn internal_newlines_become_line_breaks() {
    assert_eq!(assemble("line one\nline two"), "<p>line one<br />line two</p>");
  }

  #[test]
  fn paragraph_around_sole_block_is_unwrapped() {
    assert_eq!(
      super::cleanup("<p><h2>x</h2></p>".to_string()),
      "<h2>x</h2>"
    );
    // A paragraph with more than the block element keeps its wrapper.
    assert_eq!(
      super::cleanup("<p>intro <h2>x</h2></p>".to_string()),
      "<p>intro <h2>x</h2></p>"
    );
    assert_eq!(super::cleanup("<p> </p>".to_string()), "");
  }

  #[test]
  fn fence_placeholder_group_is_not_wrapped() {
    let mut masks = crate::inline::MaskedSegments::new();
    let placeholder = crate::inline::apply("```\na\n\nb\n```", &mut masks);
    let assembled = super::assemble_masked(&placeholder, &masks);
    // The placeholder line stands alone, so no <p> wrapper appears around it.
    assert_eq!(assembled, placeholder.trim());
    assert_eq!(
      masks.restore_fences(&assembled),
      "<pre><code>a\n\nb</code></pre>"
    );
  }

  #[test]
  fn adjacent_blockquotes_merge() {
    assert_eq!(
      assemble("<blockquote>a</blockquote>\n\n<blockquote>b</blockquote>"),
      "<blockquote>a<br />b</blockquote>"
    );
  }

  #[test]
  fn empty_input_yields_empty_output() {
    assert_eq!(assemble(""), "");
    assert_eq!(assemble("\n\n\n"), "");
  }
}
