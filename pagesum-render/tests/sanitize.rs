use pagesum_render::{render_markdown, sanitize_html};

#[test]
fn renderer_output_passes_through_unchanged() {
  // Everything the renderer can emit is inside the allow-list, so
  // sanitizing rendered output must be the identity.
  let sources = [
    "# Title\n\nA **bold** claim with `code` and *emphasis*.",
    "- one\n- two\n\n1. first\n2. second",
    "> a quote\n> continued",
    "```\nfn main() {}\n```",
    "a [link](https://example.com/x) in text",
    "plain text with < escaped & entities >",
  ];
  for source in sources {
    let html = render_markdown(source);
    assert_eq!(
      sanitize_html(&html),
      html,
      "sanitizer altered renderer output for {source:?}"
    );
  }
}

#[test]
fn sanitize_after_render_is_idempotent() {
  let sources = [
    "",
    "# h\n\ntext",
    "**a** _b_ `c`",
    "[x](javascript:alert(1))",
    "<script>alert(1)</script>",
    "weird *un**balanced_ markers`",
  ];
  for source in sources {
    let once = sanitize_html(&render_markdown(source));
    let twice = sanitize_html(&once);
    assert_eq!(twice, once, "not idempotent for {source:?}");
  }
}

#[test]
fn markdown_injected_script_stays_inert() {
  // The renderer escapes raw markup, so a script in model output arrives
  // as text, and the sanitizer leaves the escaped form alone.
  let html = render_markdown("<script>alert(1)</script>");
  assert_eq!(html, "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>");
  assert_eq!(sanitize_html(&html), html);
}

#[test]
fn javascript_link_loses_href_after_sanitizing() {
  let html = render_markdown("[click](javascript:alert(1))");
  let safe = sanitize_html(&html);
  assert!(!safe.contains("javascript:"), "scheme survived: {safe}");
  assert!(safe.contains("click"), "label was lost: {safe}");
}

#[test]
fn http_and_https_links_survive_sanitizing() {
  for scheme in ["http", "https"] {
    let html = render_markdown(&format!("[x]({scheme}://example.com)"));
    let safe = sanitize_html(&html);
    assert!(
      safe.contains(&format!("href=\"{scheme}://example.com\"")),
      "valid link dropped: {safe}"
    );
  }
}
