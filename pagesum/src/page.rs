use html_escape::encode_text;
use jiff::Zoned;

/// Skeleton for the standalone document produced by the `page` format.
const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1" />
<title>{{title}}</title>
<style>
body { max-width: 46rem; margin: 2rem auto; padding: 0 1rem; font-family: system-ui, sans-serif; line-height: 1.6; }
blockquote { border-left: 3px solid #ccc; margin-left: 0; padding-left: 1rem; color: #555; }
pre { background: #f4f4f4; padding: 0.75rem; overflow-x: auto; }
code { font-family: ui-monospace, monospace; }
footer { margin-top: 2rem; border-top: 1px solid #ddd; padding-top: 0.5rem; font-size: 0.85rem; color: #777; }
</style>
</head>
<body>
<h1>{{title}}</h1>
{{source_line}}<main>
{{summary}}
</main>
<footer>Generated on {{timestamp}}</footer>
</body>
</html>
"#;

/// Wrap a rendered summary fragment into a complete HTML document.
///
/// The title and source URL are escaped here; the summary fragment is
/// expected to already be renderer output (and usually sanitized), so it is
/// embedded as-is.
#[must_use]
pub fn build_page(
  title: Option<&str>,
  url: Option<&str>,
  summary_html: &str,
) -> String {
  let title = encode_text(title.unwrap_or("Page summary")).into_owned();

  let source_line = url.map_or_else(String::new, |url| {
    let escaped = encode_text(url);
    format!("<p>Source: <a href=\"{escaped}\">{escaped}</a></p>\n")
  });

  let timestamp = Zoned::now().strftime("%Y-%m-%d %H:%M %Z").to_string();

  PAGE_TEMPLATE
    .replace("{{title}}", &title)
    .replace("{{source_line}}", &source_line)
    .replace("{{summary}}", summary_html)
    .replace("{{timestamp}}", &timestamp)
}

#[cfg(test)]
mod tests {
  use super::build_page;

  #[test]
  fn page_embeds_title_url_and_summary() {
    let page = build_page(
      Some("An Article"),
      Some("https://example.com/a"),
      "<p>summary</p>",
    );
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<title>An Article</title>"));
    assert!(page.contains("href=\"https://example.com/a\""));
    assert!(page.contains("<p>summary</p>"));
    assert!(page.contains("Generated on "));
  }

  #[test]
  fn missing_parts_get_defaults() {
    let page = build_page(None, None, "<p>s</p>");
    assert!(page.contains("<title>Page summary</title>"));
    assert!(!page.contains("Source:"));
  }

  #[test]
  fn title_markup_is_escaped() {
    let page = build_page(Some("a <b> & c"), None, "<p>s</p>");
    assert!(page.contains("<title>a &lt;b&gt; &amp; c</title>"));
  }
}
