use std::sync::LazyLock;

use regex::Regex;

static FORM_HASH_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<input[^>]*name="formhash"[^>]*value="([0-9a-z]+)""#).unwrap()
});

static FORM_HASH_QUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"formhash=([0-9a-z]+)").unwrap());

/// Find the anti-forgery token embedded in a page.
///
/// Looks for the hidden `formhash` input first, then for a `formhash=` query
/// parameter (the logout link carries one on every page).
#[must_use]
pub fn extract_form_hash(html: &str) -> Option<String> {
    FORM_HASH_INPUT
        .captures(html)
        .or_else(|| FORM_HASH_QUERY.captures(html))
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_input() {
        let html = r#"<form method="post"><input type="hidden" name="formhash" value="9f814df3" /></form>"#;
        assert_eq!(extract_form_hash(html).as_deref(), Some("9f814df3"));
    }

    #[test]
    fn test_logout_link_fallback() {
        let html = r#"<a href="logging.php?action=logout&amp;formhash=05ce06e1">退出</a>"#;
        assert_eq!(extract_form_hash(html).as_deref(), Some("05ce06e1"));
    }

    #[test]
    fn test_missing() {
        assert_eq!(extract_form_hash("<html></html>"), None);
    }
}
