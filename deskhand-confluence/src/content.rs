//! # Storage-Format Content Extraction
//!
//! Text-scan helpers over Confluence storage-format markup: pulling the
//! section under a named heading, collecting the bodies of named macros, and
//! the page-id / page-URL conveniences the CLI uses. The scans are
//! marker-based rather than a full markup parse; storage format is regular
//! enough for that, and it keeps malformed pages from failing the whole run.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::unwrap_used)]
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<h([1-6])[^>]*>(.*?)</h[1-6]\s*>").unwrap());
#[allow(clippy::unwrap_used)]
static HEADING_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<h[1-6][^>]*>").unwrap());
#[allow(clippy::unwrap_used)]
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
#[allow(clippy::unwrap_used)]
static PAGE_ID_QUERY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"pageId=(\d+)").unwrap());
#[allow(clippy::unwrap_used)]
static PAGE_ID_PATH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/pages/(\d+)").unwrap());
#[allow(clippy::unwrap_used)]
static MACRO_PARAM_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"(?is)<ac:parameter[^>]*ac:name="([^"]+)"[^>]*>(.*?)</ac:parameter>"#).unwrap());

/// Pull a numeric page id out of a page URL or a bare id string.
///
/// Understands `?pageId=123` viewpage URLs, `/pages/123/Title` pretty URLs,
/// and plain numeric ids.
pub fn extract_page_id(input: &str) -> Option<String> {
  let trimmed = input.trim();
  if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
    return Some(trimmed.to_string());
  }
  if let Some(captures) = PAGE_ID_QUERY_RE.captures(trimmed) {
    return Some(captures[1].to_string());
  }
  if let Some(captures) = PAGE_ID_PATH_RE.captures(trimmed) {
    return Some(captures[1].to_string());
  }
  None
}

/// Browse URL for a page, from the base URL and the page's `webui` link.
pub fn page_url(base_url: &str, webui: Option<&str>) -> String {
  match webui {
    Some(link) if !link.is_empty() => {
      format!("{}{}", base_url.trim_end_matches('/'), link)
    }
    _ => base_url.trim_end_matches('/').to_string(),
  }
}

/// Strip markup and collapse whitespace so heading text can be compared.
fn plain_text(markup: &str) -> String {
  let stripped = TAG_RE.replace_all(markup, " ");
  stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the raw markup between a named heading and the next heading.
///
/// The heading is matched case-insensitively on its visible text, ignoring
/// any inline markup inside the heading tag. Returns `None` when no heading
/// matches; a matched heading with nothing before the next one yields an
/// empty string.
pub fn extract_heading_section(storage: &str, heading_text: &str) -> Option<String> {
  let wanted = plain_text(heading_text).to_lowercase();
  for captures in HEADING_RE.captures_iter(storage) {
    let whole = captures.get(0)?;
    let inner = captures.get(2)?.as_str();
    if plain_text(inner).to_lowercase() != wanted {
      continue;
    }
    let section_start = whole.end();
    let section_end = HEADING_OPEN_RE
      .find_at(storage, section_start)
      .map(|m| m.start())
      .unwrap_or(storage.len());
    return Some(storage[section_start..section_end].trim().to_string());
  }
  None
}

/// Collect the inner bodies of every `ac:structured-macro` with the given
/// name, in document order.
pub fn extract_macro_contents(storage: &str, macro_name: &str) -> Vec<String> {
  #[allow(clippy::unwrap_used)]
  let open_re = Regex::new(&format!(
    r#"(?is)<ac:structured-macro\b[^>]*ac:name="{}"[^>]*>"#,
    regex::escape(macro_name)
  ))
  .unwrap();

  let mut bodies = Vec::new();
  for opening in open_re.find_iter(storage) {
    let rest = &storage[opening.end()..];
    if let Some(close_idx) = rest.find("</ac:structured-macro>") {
      bodies.push(rest[..close_idx].trim().to_string());
    }
  }
  bodies
}

/// Parse the `ac:parameter` entries of a macro body into a name → value map.
pub fn parse_macro_params(macro_body: &str) -> BTreeMap<String, String> {
  MACRO_PARAM_RE
    .captures_iter(macro_body)
    .map(|captures| (captures[1].to_string(), plain_text(&captures[2])))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_page_id_variants() {
    assert_eq!(extract_page_id("12345"), Some("12345".to_string()));
    assert_eq!(
      extract_page_id("https://wiki.example.com/pages/viewpage.action?pageId=98765"),
      Some("98765".to_string())
    );
    assert_eq!(
      extract_page_id("https://wiki.example.com/spaces/OPS/pages/4242/Runbooks"),
      Some("4242".to_string())
    );
    assert_eq!(extract_page_id("not a page"), None);
    assert_eq!(extract_page_id(""), None);
  }

  #[test]
  fn test_page_url_joins_webui_link() {
    assert_eq!(
      page_url("https://wiki.example.com/", Some("/spaces/OPS/pages/1/Runbooks")),
      "https://wiki.example.com/spaces/OPS/pages/1/Runbooks"
    );
    assert_eq!(page_url("https://wiki.example.com", None), "https://wiki.example.com");
  }

  #[test]
  fn test_extract_heading_section_between_headings() {
    let storage = "<h2>Call Center</h2><p>dial 0</p><h2>Other</h2><p>nope</p>";
    assert_eq!(
      extract_heading_section(storage, "Call Center"),
      Some("<p>dial 0</p>".to_string())
    );
  }

  #[test]
  fn test_extract_heading_section_runs_to_end_of_page() {
    let storage = "<h1>Intro</h1><p>top</p><h3>Escalation</h3><p>page ops</p><p>then sre</p>";
    assert_eq!(
      extract_heading_section(storage, "escalation"),
      Some("<p>page ops</p><p>then sre</p>".to_string())
    );
  }

  #[test]
  fn test_extract_heading_section_ignores_inline_markup() {
    let storage = "<h2><strong>Call&nbsp;</strong> <em>Center</em></h2><p>dial 0</p>";
    // &nbsp; is literal text in storage format; the comparison is against the
    // visible words only when markup is the separator.
    assert_eq!(
      extract_heading_section(storage, "Call&nbsp; Center"),
      Some("<p>dial 0</p>".to_string())
    );
  }

  #[test]
  fn test_extract_heading_section_missing_heading() {
    assert_eq!(extract_heading_section("<h2>Other</h2><p>x</p>", "Call Center"), None);
  }

  #[test]
  fn test_extract_macro_contents_in_order() {
    let storage = concat!(
      r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#,
      "<ac:plain-text-body><![CDATA[first]]></ac:plain-text-body>",
      "</ac:structured-macro>",
      "<p>between</p>",
      r#"<ac:structured-macro ac:name="note"><p>skip me</p></ac:structured-macro>"#,
      r#"<ac:structured-macro ac:name="code">"#,
      "<ac:plain-text-body><![CDATA[second]]></ac:plain-text-body>",
      "</ac:structured-macro>",
    );
    let bodies = extract_macro_contents(storage, "code");
    assert_eq!(bodies.len(), 2);
    assert!(bodies[0].contains("first"));
    assert!(bodies[1].contains("second"));
  }

  #[test]
  fn test_extract_macro_contents_none_present() {
    assert!(extract_macro_contents("<p>plain</p>", "code").is_empty());
  }

  #[test]
  fn test_parse_macro_params() {
    let body = concat!(
      r#"<ac:parameter ac:name="language">sql</ac:parameter>"#,
      r#"<ac:parameter ac:name="title">Cleanup <em>job</em></ac:parameter>"#,
    );
    let params = parse_macro_params(body);
    assert_eq!(params.get("language").map(String::as_str), Some("sql"));
    assert_eq!(params.get("title").map(String::as_str), Some("Cleanup job"));
  }
}
