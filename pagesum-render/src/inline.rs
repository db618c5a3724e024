//! Inline markdown transformation.
//!
//! Substitutions run in a fixed order, and each stage only sees text that no
//! earlier stage produced: entity escaping comes first, then fenced code and
//! inline code spans are rendered and masked behind placeholder tokens, then
//! emphasis and links rewrite what is left. Span placeholders are restored by
//! the caller once the block stage has run; fence placeholders stay in place
//! through paragraph assembly, because fence content may contain blank lines
//! that must not act as paragraph boundaries. Either way, code content is
//! never re-parsed as markup.

use std::sync::LazyLock;

use log::error;
use regex::Regex;

use crate::util::never_matching_regex;

/// Placeholder delimiter for masked segments. U+001A never occurs in
/// well-formed model output and matches no markdown rule.
const MASK_DELIM: char = '\u{1A}';

/// Matches either an already-valid entity (kept verbatim) or a bare `&`, `<`,
/// `>` that needs escaping. The regex crate has no lookahead, so the entity
/// alternative is listed first and wins at the same position.
static ESCAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"&(?:amp|lt|gt|quot|#39);|[&<>]").unwrap_or_else(|e| {
    error!("Failed to compile ESCAPE_RE regex: {e}");
    never_matching_regex()
  })
});

static FENCED_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?s)```[A-Za-z0-9_+-]*\n?(.*?)```").unwrap_or_else(|e| {
    error!("Failed to compile FENCED_CODE_RE regex: {e}");
    never_matching_regex()
  })
});

static CODE_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"`([^`\n]+)`").unwrap_or_else(|e| {
    error!("Failed to compile CODE_SPAN_RE regex: {e}");
    never_matching_regex()
  })
});

static BOLD_STAR_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\*\*(.+?)\*\*").unwrap_or_else(|e| {
    error!("Failed to compile BOLD_STAR_RE regex: {e}");
    never_matching_regex()
  })
});

static BOLD_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"__(.+?)__").unwrap_or_else(|e| {
    error!("Failed to compile BOLD_UNDERSCORE_RE regex: {e}");
    never_matching_regex()
  })
});

static ITALIC_STAR_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\*(.+?)\*").unwrap_or_else(|e| {
    error!("Failed to compile ITALIC_STAR_RE regex: {e}");
    never_matching_regex()
  })
});

static ITALIC_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"_(.+?)_").unwrap_or_else(|e| {
    error!("Failed to compile ITALIC_UNDERSCORE_RE regex: {e}");
    never_matching_regex()
  })
});

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").unwrap_or_else(|e| {
    error!("Failed to compile LINK_RE regex: {e}");
    never_matching_regex()
  })
});

/// What a masked segment stands for. Fenced code occupies whole lines and is
/// tagged as a block downstream; spans stay inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MaskKind {
  Fence,
  Span,
}

/// Rendered code segments pulled out of the text so later stages cannot
/// rewrite their content.
#[derive(Debug, Default)]
pub(crate) struct MaskedSegments {
  slots: Vec<(MaskKind, String)>,
}

impl MaskedSegments {
  pub(crate) const fn new() -> Self {
    Self { slots: Vec::new() }
  }

  /// Store rendered HTML and hand back its placeholder token.
  fn push(&mut self, kind: MaskKind, html: String) -> String {
    self.slots.push((kind, html));
    format!("{MASK_DELIM}{}{MASK_DELIM}", self.slots.len() - 1)
  }

  /// Whether `line` consists solely of a fenced-code placeholder.
  pub(crate) fn is_fence_line(&self, line: &str) -> bool {
    let trimmed = line.trim();
    let Some(inner) = trimmed
      .strip_prefix(MASK_DELIM)
      .and_then(|s| s.strip_suffix(MASK_DELIM))
    else {
      return false;
    };
    inner
      .parse::<usize>()
      .ok()
      .and_then(|idx| self.slots.get(idx))
      .is_some_and(|(kind, _)| *kind == MaskKind::Fence)
  }

  /// Substitute every placeholder back with its rendered HTML.
  pub(crate) fn restore(&self, text: &str) -> String {
    let fences_back = self.restore_kind(text, MaskKind::Fence);
    self.restore_kind(&fences_back, MaskKind::Span)
  }

  /// Restore inline code spans only. Span content never contains a newline,
  /// so this is safe before paragraph assembly.
  pub(crate) fn restore_spans(&self, text: &str) -> String {
    self.restore_kind(text, MaskKind::Span)
  }

  /// Restore fenced code blocks. Fence content may span blank lines, so this
  /// must run after paragraph assembly.
  pub(crate) fn restore_fences(&self, text: &str) -> String {
    self.restore_kind(text, MaskKind::Fence)
  }

  fn restore_kind(&self, text: &str, wanted: MaskKind) -> String {
    let mut result = text.to_string();
    for (idx, (kind, html)) in self.slots.iter().enumerate() {
      if *kind != wanted {
        continue;
      }
      let token = format!("{MASK_DELIM}{idx}{MASK_DELIM}");
      result = result.replace(&token, html);
    }
    result
  }
}

/// Escape raw `&`, `<`, `>` without double-escaping valid entities.
#[must_use]
pub fn escape_entities(text: &str) -> String {
  ESCAPE_RE
    .replace_all(text, |caps: &regex::Captures| {
      match caps.get(0).map_or("", |m| m.as_str()) {
        "&" => "&amp;".to_string(),
        "<" => "&lt;".to_string(),
        ">" => "&gt;".to_string(),
        entity => entity.to_string(),
      }
    })
    .into_owned()
}

/// Run the inline substitution chain, masking code segments as it goes.
pub(crate) fn apply(source: &str, masks: &mut MaskedSegments) -> String {
  let text = escape_entities(source);

  let text = FENCED_CODE_RE
    .replace_all(&text, |caps: &regex::Captures| {
      let code = caps.get(1).map_or("", |m| m.as_str()).trim();
      masks.push(MaskKind::Fence, format!("<pre><code>{code}</code></pre>"))
    })
    .into_owned();

  let text = CODE_SPAN_RE
    .replace_all(&text, |caps: &regex::Captures| {
      let code = &caps[1];
      masks.push(MaskKind::Span, format!("<code>{code}</code>"))
    })
    .into_owned();

  // Bold before italic so `**x**` is never half-eaten as emphasis.
  let text = BOLD_STAR_RE.replace_all(&text, "<strong>$1</strong>");
  let text = BOLD_UNDERSCORE_RE.replace_all(&text, "<strong>$1</strong>");
  let text = ITALIC_STAR_RE.replace_all(&text, "<em>$1</em>");
  let text = ITALIC_UNDERSCORE_RE.replace_all(&text, "<em>$1</em>");

  LINK_RE
    .replace_all(&text, "<a href=\"$2\" target=\"_blank\">$1</a>")
    .into_owned()
}

/// Apply every inline substitution and restore masked code, for use on a
/// standalone fragment.
#[must_use]
pub fn transform(source: &str) -> String {
  let mut masks = MaskedSegments::new();
  let text = apply(source, &mut masks);
  masks.restore(&text)
}

#[cfg(test)]
mod tests {
  use super::{MaskedSegments, escape_entities, transform};

  #[test]
  fn escapes_bare_characters() {
    assert_eq!(escape_entities("a < b & c > d"), "a &lt; b &amp; c &gt; d");
  }

  #[test]
  fn does_not_double_escape_entities() {
    assert_eq!(
      escape_entities("&amp; &lt; &gt; &quot; &#39; & <"),
      "&amp; &lt; &gt; &quot; &#39; &amp; &lt;"
    );
  }

  #[test]
  fn bold_runs_before_italic() {
    assert_eq!(transform("**x**"), "<strong>x</strong>");
    assert_eq!(
      transform("**bold** and *italic*"),
      "<strong>bold</strong> and <em>italic</em>"
    );
    assert_eq!(transform("__b__ and _i_"), "<strong>b</strong> and <em>i</em>");
  }

  #[test]
  fn code_spans_are_not_emphasized() {
    assert_eq!(transform("`*not em*`"), "<code>*not em*</code>");
  }

  #[test]
  fn fenced_code_is_verbatim_and_trimmed() {
    assert_eq!(
      transform("```rust\nlet x = 1;\n```"),
      "<pre><code>let x = 1;</code></pre>"
    );
    // Escaping still applies to code content; markup rules do not.
    assert_eq!(
      transform("```\na < **b**\n```"),
      "<pre><code>a &lt; **b**</code></pre>"
    );
  }

  #[test]
  fn links_keep_label_and_target() {
    assert_eq!(
      transform("[docs](https://example.com)"),
      "<a href=\"https://example.com\" target=\"_blank\">docs</a>"
    );
  }

  #[test]
  fn unmatched_markers_pass_through() {
    assert_eq!(transform("a * b"), "a * b");
    assert_eq!(transform("plain text"), "plain text");
  }

  #[test]
  fn spans_and_fences_restore_independently() {
    let mut masks = MaskedSegments::new();
    let text = super::apply("`span`\n```\nfence\n```", &mut masks);
    let spans_only = masks.restore_spans(&text);
    assert!(spans_only.contains("<code>span</code>"));
    assert!(!spans_only.contains("<pre>"));
    let both = masks.restore_fences(&spans_only);
    assert!(both.contains("<pre><code>fence</code></pre>"));
  }

  #[test]
  fn fence_line_detection() {
    let mut masks = MaskedSegments::new();
    let text = super::apply("```\ncode\n```", &mut masks);
    assert!(masks.is_fence_line(text.trim()));
    assert!(!masks.is_fence_line("plain"));
  }
}
