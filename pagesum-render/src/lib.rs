//! # pagesum-render
//!
//! Deterministic Markdown-to-HTML rendering for LLM output, paired with an
//! allow-list HTML sanitizer.
//!
//! The renderer handles the constrained markdown dialect that summarization
//! models actually emit (ATX headers, fenced and inline code, bold, italic,
//! links, blockquotes, flat lists) through an explicit ordered chain of pure
//! transform stages. No markdown or HTML library does the parsing; every
//! stage is a documented substitution with a fixed precedence relative to its
//! neighbors, and every stage is testable in isolation.
//!
//! ## Quick start
//!
//! ```rust
//! let html = pagesum_render::render_markdown("# Title\n\nSome **bold** text.");
//! assert_eq!(html, "<h1>Title</h1>\n<p>Some <strong>bold</strong> text.</p>");
//!
//! let safe = pagesum_render::sanitize_html("<script>alert(1)</script><p>ok</p>");
//! assert_eq!(safe, "<p>ok</p>");
//! ```
//!
//! ## Pipeline
//!
//! 1. [`inline`] — entity escaping, code fences and spans (masked so nothing
//!    rewrites code content), bold before italic, then links.
//! 2. [`block`] — line classification into [`Block`] values and grouping of
//!    list runs and blockquote runs.
//! 3. [`paragraph`] — blank-line splitting, paragraph wrapping, cleanup.
//!    Fenced code stays masked through this stage, so blank lines inside a
//!    fence never become paragraph boundaries; fences are restored last.
//!
//! Both entry points are total: every input string maps to some output
//! string. The pipeline holds no state between calls and is safe to invoke
//! concurrently.
//!
//! ## Sanitization
//!
//! [`sanitize_html`] re-parses an HTML string with a minimal streaming
//! tokenizer and keeps only allow-listed tags and attributes. It exists for
//! insertion points where dynamic HTML assignment is restricted and the
//! fragment must be parsed and attached node by node; the renderer's output
//! is its intended input, but any HTML string is accepted.

pub mod block;
pub mod inline;
pub mod paragraph;
pub mod sanitize;
pub mod types;
mod util;

pub use crate::{sanitize::sanitize_html, types::Block};

/// Render a markdown-flavored string to HTML.
///
/// Never fails; unrecognized syntax passes through as escaped literal text.
#[must_use]
pub fn render_markdown(source: &str) -> String {
  let mut masks = inline::MaskedSegments::new();
  let text = inline::apply(source, &mut masks);
  let text = block::apply(&text, &masks);
  // Spans are single-line and safe to put back now; fences may contain blank
  // lines and stay masked until paragraph boundaries are settled.
  let text = masks.restore_spans(&text);
  let text = paragraph::assemble_masked(&text, &masks);
  masks.restore_fences(&text)
}
