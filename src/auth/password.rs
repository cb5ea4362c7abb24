use std::collections::HashMap;

use md5::{Digest, Md5};

use crate::constants::MD5_HEX_LEN;

/// Password as supplied to [`login`](crate::auth::login).
#[derive(Clone, PartialEq, Eq)]
pub enum Password {
    /// Plain text; hashed before it leaves the process.
    Plain(String),
    /// Already the 32-character hex digest the login form expects.
    PreHashed(String),
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Password::Plain(..)"),
            Self::PreHashed(_) => f.write_str("Password::PreHashed(..)"),
        }
    }
}

/// Client-side password hashing used by the login form (`pwmd5`).
///
/// Results are memoized per input. Inputs that are exactly 32 characters long
/// skip the memo and are digested every time, because the form script treats
/// such values as possibly already hashed. Use [`Password::PreHashed`] to pass
/// a digest through untouched instead of relying on length.
#[derive(Debug, Default)]
pub struct PasswordHasher {
    memo: HashMap<String, String>,
    digest_calls: usize,
}

impl PasswordHasher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The value to send in the `password` field.
    pub fn hash(&mut self, password: &Password) -> String {
        match password {
            Password::Plain(plain) => self.pwmd5(plain),
            Password::PreHashed(digest) => digest.clone(),
        }
    }

    /// `hex(md5(addslashes(input)))`, memoized.
    pub fn pwmd5(&mut self, input: &str) -> String {
        if input.chars().count() != MD5_HEX_LEN {
            if let Some(hashed) = self.memo.get(input) {
                return hashed.clone();
            }
        }

        self.digest_calls += 1;
        let hashed = hex::encode(Md5::digest(addslashes(input).as_bytes()));
        self.memo.insert(input.to_string(), hashed.clone());
        hashed
    }

    /// How many times the digest has actually been computed.
    #[must_use]
    pub fn digest_calls(&self) -> usize {
        self.digest_calls
    }
}

/// Backslash-escape quotes, backslashes and common control characters.
#[must_use]
pub fn addslashes(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\u{8}' => escaped.push_str("\\b"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\u{c}' => escaped.push_str("\\f"),
            '\r' => escaped.push_str("\\r"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addslashes() {
        assert_eq!(addslashes(r#"a'b"c\d"#), r#"a\'b\"c\\d"#);
        assert_eq!(addslashes("tab\there\nnl"), "tab\\there\\nnl");
        assert_eq!(addslashes("plain"), "plain");
    }

    #[test]
    fn test_pwmd5_known_digest() {
        let mut hasher = PasswordHasher::new();
        assert_eq!(hasher.pwmd5("password"), "5f4dcc3b5aa765d61d8327deb882cf99");
    }

    #[test]
    fn test_pwmd5_escapes_before_digest() {
        let mut hasher = PasswordHasher::new();
        assert_eq!(
            hasher.pwmd5("it's"),
            hex::encode(Md5::digest(br"it\'s"))
        );
        assert_ne!(hasher.pwmd5("it's"), hex::encode(Md5::digest(b"it's")));
    }

    #[test]
    fn test_pwmd5_memoizes() {
        let mut hasher = PasswordHasher::new();
        let first = hasher.pwmd5("123abc!@#");
        let second = hasher.pwmd5("123abc!@#");

        assert_eq!(first, second);
        assert_eq!(hasher.digest_calls(), 1);

        hasher.pwmd5("different");
        assert_eq!(hasher.digest_calls(), 2);
    }

    #[test]
    fn test_pwmd5_length_32_bypasses_memo() {
        let mut hasher = PasswordHasher::new();
        let input = "a".repeat(32);

        let first = hasher.pwmd5(&input);
        let second = hasher.pwmd5(&input);

        assert_eq!(first, second);
        assert_eq!(hasher.digest_calls(), 2);
    }

    #[test]
    fn test_prehashed_passes_through() {
        let mut hasher = PasswordHasher::new();
        let digest = "5f4dcc3b5aa765d61d8327deb882cf99".to_string();

        assert_eq!(hasher.hash(&Password::PreHashed(digest.clone())), digest);
        assert_eq!(hasher.digest_calls(), 0);
        assert_eq!(
            hasher.hash(&Password::Plain("password".to_string())),
            digest
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let password = Password::Plain("hunter2".to_string());
        assert!(!format!("{password:?}").contains("hunter2"));
    }
}
