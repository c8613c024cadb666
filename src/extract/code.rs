//! Short numeric and alphanumeric codes.

use regex::Regex;
use std::sync::LazyLock;

/// At least one of these must appear before any pattern is tried.
pub const KEYWORDS: &[&str] = &[
    "验证码", "验证", "code", "Code", "CODE", "校验码", "动态码", "动态密码", "短信码",
];

struct CodePattern {
    name: &'static str,
    regex: Regex,
}

impl CodePattern {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("valid code pattern"),
        }
    }
}

// The `regex` crate has no lookahead, so "not followed by" is spelled as a
// trailing non-capturing class or end of input.
static PATTERNS: LazyLock<Vec<CodePattern>> = LazyLock::new(|| {
    vec![
        CodePattern::new(
            "keyword digits",
            r"(?i)(?:验证码|码号|校验码|代码|code)[^0-9]{0,10}?([0-9]{4,8})(?:[^0-9]|$)",
        ),
        CodePattern::new(
            "keyword alphanumeric",
            r"(?i)(?:验证码|码号|校验码|代码|code)[^0-9]{0,10}?([A-Za-z0-9]{4,8})(?:[^A-Za-z0-9]|$)",
        ),
        CodePattern::new("quoted token", r#"["“”'‘’]([A-Za-z0-9]{4,8})["“”'‘’]"#),
        CodePattern::new("digit line", r"(?m)^[\s》】\]]*([0-9]{4,8})[\s《【\[]*$"),
        CodePattern::new("alphanumeric line", r"(?m)^[\s》】\]]*([A-Za-z0-9]{4,8})[\s《【\[]*$"),
    ]
});

pub fn passes_keyword_gate(text: &str) -> bool {
    KEYWORDS.iter().any(|k| text.contains(k))
}

/// First capture of the first matching pattern, if the keyword gate passes.
pub fn extract_code(text: &str) -> Option<String> {
    if text.is_empty() || !passes_keyword_gate(text) {
        return None;
    }
    PATTERNS.iter().find_map(|p| {
        let found = p.regex.captures(text)?.get(1)?.as_str().to_string();
        tracing::debug!(pattern = p.name, "code matched");
        Some(found)
    })
}
