//! Verification and magic-login links inside HTML bodies.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static LINK_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<a[^>]*>([^<]*(?:magic\s*link|一键登录|安全登录|无密码登录|one[-\s]?click\s+login|secure\s+login|passwordless\s+login)[^<]*)</a>",
    )
    .expect("valid link text regex")
});

static BASE_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<base[^>]*href=["']([^"']*)["']"#).expect("valid base href regex")
});

/// Href matchers, most specific first.
static HREF_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("verify", r#"(?i)<a[^>]*href=["']([^"']*(?:verify|confirm|activate|validation|auth)[^"']*)["'][^>]*>"#),
        ("token", r#"(?i)<a[^>]*href=["']([^"']*(?:token|reset|password)[^"']*)["'][^>]*>"#),
        ("login", r#"(?i)<a[^>]*href=["']([^"']*(?:login|signin|signup)[^"']*)["'][^>]*>"#),
        ("magic", r#"(?i)<a[^>]*href=["']([^"']*(?:magic-?link|passwordless|no-?password)[^"']*)["'][^>]*>"#),
        ("one-time", r#"(?i)<a[^>]*href=["']([^"']*(?:one-?time-?link|secure-?login)[^"']*)["'][^>]*>"#),
        ("query param", r#"(?i)href=["']([^"']*[?&](?:token|code|magic)=[^"'&]+)["']"#),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid href pattern")))
    .collect()
});

/// Find a verification link in `html`.
pub fn extract_link(html: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }
    let href = href_by_link_text(html).or_else(|| {
        HREF_PATTERNS.iter().find_map(|(name, re)| {
            let href = re.captures(html)?.get(1)?.as_str();
            debug!(pattern = name, "href matched");
            Some(href)
        })
    })?;
    Some(resolve(href, html))
}

/// Href of the anchor whose visible text names a login link.
fn href_by_link_text(html: &str) -> Option<&str> {
    let text = LINK_TEXT.captures(html)?.get(1)?.as_str();
    let anchor = Regex::new(&format!(
        r#"(?i)<a[^>]*href=["']([^"']*)["'][^>]*>{}</a>"#,
        regex::escape(text)
    ))
    .ok()?;
    let href = anchor.captures(html)?.get(1)?.as_str();
    debug!(text, "href matched by link text");
    Some(href)
}

/// Absolute hrefs pass through; root-relative ones are joined onto `<base href>`.
fn resolve(href: &str, html: &str) -> String {
    if Url::parse(href).is_ok() || !href.starts_with('/') {
        return href.to_string();
    }
    BASE_HREF
        .captures(html)
        .and_then(|caps| Url::parse(caps.get(1)?.as_str()).ok())
        .and_then(|base| base.join(href).ok())
        .map(String::from)
        .unwrap_or_else(|| href.to_string())
}
