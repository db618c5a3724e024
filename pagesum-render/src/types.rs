//! Types shared across the rendering pipeline.

/// A tagged unit produced during block transformation.
///
/// Blocks preserve source line order; one block corresponds to one source
/// line, except for fenced code which arrives pre-rendered from the inline
/// stage as a single masked line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
  /// ATX header with its level (1-6) and inline-transformed text.
  Header { level: u8, text: String },

  /// A fenced code block, already rendered to `<pre><code>` by the inline
  /// stage and still masked behind a placeholder.
  CodeBlock(String),

  /// A single blockquote line (the `&gt;` marker already stripped).
  Blockquote(String),

  /// A list item line; `ordered` distinguishes `1.` items from `-`/`*`/`+`
  /// items so grouping never merges the two kinds.
  ListItem { ordered: bool, text: String },

  /// Any line matching no block construct; flows to paragraph assembly.
  Raw(String),
}

impl Block {
  /// Whether this block participates in an unordered list run.
  #[must_use]
  pub const fn is_unordered_item(&self) -> bool {
    matches!(self, Self::ListItem { ordered: false, .. })
  }

  /// Whether this block participates in an ordered list run.
  #[must_use]
  pub const fn is_ordered_item(&self) -> bool {
    matches!(self, Self::ListItem { ordered: true, .. })
  }
}
