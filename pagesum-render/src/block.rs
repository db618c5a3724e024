//! Block-level markdown transformation.
//!
//! Lines are classified into [`Block`] values in a fixed priority order
//! (headers, blockquotes, bullet items, numbered items), then emitted as HTML
//! with a grouping pass that wraps maximal runs of same-kind list items in a
//! single container and merges consecutive blockquote lines into one element.
//!
//! This stage runs after the inline stage, so the blockquote marker has
//! already been entity-escaped to `&gt;`.

use std::sync::LazyLock;

use log::error;
use regex::Regex;

use crate::{
  inline::MaskedSegments,
  types::Block,
  util::never_matching_regex,
};

/// Captures the full run of `#` characters, so a level-6 header can never be
/// pre-empted by a shorter match.
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\s*(#{1,6})\s+(.+)$").unwrap_or_else(|e| {
    error!("Failed to compile HEADER_RE regex: {e}");
    never_matching_regex()
  })
});

static BLOCKQUOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\s*&gt;\s?(.*)$").unwrap_or_else(|e| {
    error!("Failed to compile BLOCKQUOTE_RE regex: {e}");
    never_matching_regex()
  })
});

static BULLET_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\s*[-*+]\s+(.+)$").unwrap_or_else(|e| {
    error!("Failed to compile BULLET_ITEM_RE regex: {e}");
    never_matching_regex()
  })
});

static ORDERED_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\s*\d+\.\s+(.+)$").unwrap_or_else(|e| {
    error!("Failed to compile ORDERED_ITEM_RE regex: {e}");
    never_matching_regex()
  })
});

/// Classify one line, in priority order. Fenced-code placeholder lines are
/// handled by [`classify`] before this runs.
#[must_use]
pub fn classify_line(line: &str) -> Block {
  if let Some(caps) = HEADER_RE.captures(line) {
    let level = caps.get(1).map_or(1, |m| m.as_str().len());
    let text = caps.get(2).map_or("", |m| m.as_str()).trim_end();
    return Block::Header {
      level: u8::try_from(level).unwrap_or(6),
      text:  text.to_string(),
    };
  }

  if let Some(caps) = BLOCKQUOTE_RE.captures(line) {
    return Block::Blockquote(caps.get(1).map_or("", |m| m.as_str()).to_string());
  }

  if let Some(caps) = BULLET_ITEM_RE.captures(line) {
    return Block::ListItem {
      ordered: false,
      text:    caps.get(1).map_or("", |m| m.as_str()).to_string(),
    };
  }

  if let Some(caps) = ORDERED_ITEM_RE.captures(line) {
    return Block::ListItem {
      ordered: true,
      text:    caps.get(1).map_or("", |m| m.as_str()).to_string(),
    };
  }

  Block::Raw(line.to_string())
}

/// Classify every line of the inline-transformed text, preserving order.
pub(crate) fn classify(text: &str, masks: &MaskedSegments) -> Vec<Block> {
  text
    .lines()
    .map(|line| {
      if masks.is_fence_line(line) {
        Block::CodeBlock(line.to_string())
      } else {
        classify_line(line)
      }
    })
    .collect()
}

/// Emit HTML for the classified blocks. List containers come out on a single
/// line so the paragraph stage never injects line breaks between items.
#[must_use]
pub fn emit(blocks: &[Block]) -> String {
  let mut out: Vec<String> = Vec::with_capacity(blocks.len());
  let mut i = 0;

  while i < blocks.len() {
    match &blocks[i] {
      Block::Header { level, text } => {
        out.push(format!("<h{level}>{text}</h{level}>"));
        i += 1;
      },
      Block::CodeBlock(line) | Block::Raw(line) => {
        out.push(line.clone());
        i += 1;
      },
      Block::Blockquote(_) => {
        let mut quoted: Vec<&str> = Vec::new();
        while let Some(Block::Blockquote(text)) = blocks.get(i) {
          quoted.push(text);
          i += 1;
        }
        out.push(format!("<blockquote>{}</blockquote>", quoted.join("\n")));
      },
      Block::ListItem { ordered, .. } => {
        let kind = *ordered;
        let mut items = String::new();
        while let Some(Block::ListItem { ordered, text }) = blocks.get(i) {
          if *ordered != kind {
            break;
          }
          items.push_str("<li>");
          items.push_str(text);
          items.push_str("</li>");
          i += 1;
        }
        if kind {
          out.push(format!("<ol>{items}</ol>"));
        } else {
          out.push(format!("<ul>{items}</ul>"));
        }
      },
    }
  }

  out.join("\n")
}

/// Full block stage: classify, then emit.
pub(crate) fn apply(text: &str, masks: &MaskedSegments) -> String {
  emit(&classify(text, masks))
}
