//! Allow-list HTML sanitization.
//!
//! A minimal streaming tokenizer (tag-open, tag-close, text, comment) feeds
//! token-level allow-listing. Elements outside the allow-list lose their
//! markup while their text content survives; `<script>`-class elements are
//! dropped together with their content; attributes are dropped unless
//! explicitly permitted for the tag, and `href` values must carry an
//! `http://` or `https://` scheme.
//!
//! The input is expected to be renderer output, but nothing here relies on
//! that: malformed, nested, and self-closing markup are all handled, and the
//! whole pass is idempotent.

/// Tags allowed through, sorted.
const ALLOWED_TAGS: &[&str] = &[
  "a",
  "blockquote",
  "br",
  "code",
  "em",
  "h1",
  "h2",
  "h3",
  "h4",
  "h5",
  "h6",
  "li",
  "ol",
  "p",
  "pre",
  "strong",
  "ul",
];

/// Tags removed together with everything inside them.
const DROP_CONTENT_TAGS: &[&str] = &["embed", "iframe", "object", "script", "style"];

/// Permitted schemes for anchor targets.
const HTTP_SCHEMES: &[&str] = &["http://", "https://"];

/// One parsed attribute: lowercased name, value as written (without quotes).
/// Valueless attributes carry `None`.
type Attribute = (String, Option<String>);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
  Open {
    name:         String,
    attrs:        Vec<Attribute>,
    self_closing: bool,
  },
  Close {
    name: String,
  },
  Text(String),
  Comment,
}

/// Byte-wise scanner over the input. Tag delimiters are ASCII, so slicing at
/// them always lands on character boundaries.
struct Tokenizer<'a> {
  input: &'a str,
  pos:   usize,
}

impl<'a> Tokenizer<'a> {
  const fn new(input: &'a str) -> Self {
    Self { input, pos: 0 }
  }

  fn bytes(&self) -> &[u8] {
    self.input.as_bytes()
  }

  fn peek(&self, offset: usize) -> Option<u8> {
    self.bytes().get(self.pos + offset).copied()
  }

  fn skip_whitespace(&mut self) {
    while self.peek(0).is_some_and(|b| b.is_ascii_whitespace()) {
      self.pos += 1;
    }
  }

  /// Read a tag or attribute name starting at the cursor.
  fn read_name(&mut self) -> String {
    let start = self.pos;
    while self
      .peek(0)
      .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'-')
    {
      self.pos += 1;
    }
    self.input[start..self.pos].to_ascii_lowercase()
  }

  fn read_comment(&mut self) -> Token {
    match self.input[self.pos..].find("-->") {
      Some(end) => self.pos += end + 3,
      None => self.pos = self.input.len(),
    }
    Token::Comment
  }

  fn read_close_tag(&mut self) -> Option<Token> {
    // Cursor sits on "</".
    self.pos += 2;
    let name = self.read_name();
    if name.is_empty() {
      // "</>" and similar garbage: drop up to the next ">".
      self.skip_past_tag_end();
      return Some(Token::Comment);
    }
    self.skip_past_tag_end();
    Some(Token::Close { name })
  }

  fn skip_past_tag_end(&mut self) {
    match self.input[self.pos..].find('>') {
      Some(end) => self.pos += end + 1,
      None => self.pos = self.input.len(),
    }
  }

  fn read_attribute(&mut self) -> Option<Attribute> {
    let name_start = self.pos;
    while self
      .peek(0)
      .is_some_and(|b| !b.is_ascii_whitespace() && b != b'=' && b != b'>' && b != b'/')
    {
      self.pos += 1;
    }
    if self.pos == name_start {
      return None;
    }
    let name = self.input[name_start..self.pos].to_ascii_lowercase();

    self.skip_whitespace();
    if self.peek(0) != Some(b'=') {
      return Some((name, None));
    }
    self.pos += 1;
    self.skip_whitespace();

    let value = match self.peek(0) {
      Some(quote @ (b'"' | b'\'')) => {
        self.pos += 1;
        let start = self.pos;
        while self.peek(0).is_some_and(|b| b != quote) {
          self.pos += 1;
        }
        let value = self.input[start..self.pos].to_string();
        if self.peek(0).is_some() {
          self.pos += 1; // closing quote
        }
        value
      },
      _ => {
        let start = self.pos;
        while self
          .peek(0)
          .is_some_and(|b| !b.is_ascii_whitespace() && b != b'>' && b != b'/')
        {
          self.pos += 1;
        }
        self.input[start..self.pos].to_string()
      },
    };
    Some((name, Some(value)))
  }

  fn read_open_tag(&mut self) -> Token {
    // Cursor sits on "<", next byte is a letter.
    self.pos += 1;
    let name = self.read_name();
    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
      self.skip_whitespace();
      match self.peek(0) {
        None => break,
        Some(b'>') => {
          self.pos += 1;
          break;
        },
        Some(b'/') => {
          if self.peek(1) == Some(b'>') {
            self_closing = true;
            self.pos += 2;
            break;
          }
          self.pos += 1;
        },
        Some(_) => {
          if let Some(attr) = self.read_attribute() {
            attrs.push(attr);
          } else {
            // Unparseable byte inside the tag: step over it.
            self.pos += 1;
          }
        },
      }
    }

    Token::Open {
      name,
      attrs,
      self_closing,
    }
  }
}

impl Iterator for Tokenizer<'_> {
  type Item = Token;

  fn next(&mut self) -> Option<Token> {
    let rest = &self.input[self.pos..];
    if rest.is_empty() {
      return None;
    }

    if rest.starts_with("<!--") {
      return Some(self.read_comment());
    }
    if rest.starts_with("</") {
      return self.read_close_tag();
    }
    if rest.starts_with('<') {
      if self.peek(1).is_some_and(|b| b.is_ascii_alphabetic()) {
        return Some(self.read_open_tag());
      }
      // A "<" that opens nothing: neutralize it, keep the text around it.
      self.pos += 1;
      return Some(Token::Text("&lt;".to_string()));
    }

    let end = rest.find('<').map_or(self.input.len(), |i| self.pos + i);
    let text = self.input[self.pos..end].to_string();
    self.pos = end;
    Some(Token::Text(text))
  }
}

fn is_allowed_tag(name: &str) -> bool {
  ALLOWED_TAGS.binary_search(&name).is_ok()
}

/// Per-tag attribute allow-list: only anchors keep anything.
fn is_allowed_attribute(tag: &str, attr: &str) -> bool {
  tag == "a" && (attr == "href" || attr == "target")
}

fn has_http_scheme(value: &str) -> bool {
  let value = value.trim();
  HTTP_SCHEMES.iter().any(|scheme| {
    value
      .get(..scheme.len())
      .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
  })
}

/// Consume tokens until the matching close tag of a drop-with-content
/// element, nesting-aware. An unclosed element swallows the rest.
fn skip_element(tokens: &mut Tokenizer, name: &str) {
  let mut depth = 1_usize;
  for token in tokens.by_ref() {
    match token {
      Token::Open {
        name: inner,
        self_closing: false,
        ..
      } if inner == name => depth += 1,
      Token::Close { name: inner } if inner == name => {
        depth -= 1;
        if depth == 0 {
          return;
        }
      },
      _ => {},
    }
  }
}

fn write_open_tag(
  out: &mut String,
  name: &str,
  attrs: &[Attribute],
  self_closing: bool,
) {
  out.push('<');
  out.push_str(name);
  for (attr, value) in attrs {
    if !is_allowed_attribute(name, attr) {
      continue;
    }
    let Some(value) = value else { continue };
    if attr == "href" && !has_http_scheme(value) {
      continue;
    }
    // Unquoted input values may carry a double quote; neutralize it so the
    // rewritten attribute cannot break out of its quoting.
    let value = value.replace('"', "&quot;");
    out.push(' ');
    out.push_str(attr);
    out.push_str("=\"");
    out.push_str(&value);
    out.push('"');
  }
  if self_closing {
    out.push_str(" />");
  } else {
    out.push('>');
  }
}

/// Sanitize an HTML string down to the allow-listed subset.
///
/// Total and idempotent: every input maps to some output, and re-sanitizing
/// the output yields the same string.
#[must_use]
pub fn sanitize_html(html: &str) -> String {
  let mut out = String::with_capacity(html.len());
  let mut tokens = Tokenizer::new(html);

  while let Some(token) = tokens.next() {
    match token {
      Token::Comment => {},
      Token::Text(text) => out.push_str(&text),
      Token::Close { name } => {
        if is_allowed_tag(&name) {
          out.push_str("</");
          out.push_str(&name);
          out.push('>');
        }
      },
      Token::Open {
        name,
        attrs,
        self_closing,
      } => {
        if DROP_CONTENT_TAGS.contains(&name.as_str()) {
          if !self_closing {
            skip_element(&mut tokens, &name);
          }
        } else if is_allowed_tag(&name) {
          write_open_tag(&mut out, &name, &attrs, self_closing);
        }
        // Anything else: tag markup dropped, content flows on.
      },
    }
  }

  out
}
