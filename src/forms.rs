//! `application/x-www-form-urlencoded` bodies in the forum's legacy encoding.

use crate::encoding::percent_encode_legacy;

/// Ordered form fields.
///
/// Values are converted to GBK before percent-encoding; UTF-8 percent-encoding
/// would be stored as mojibake by the forum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    fields: Vec<(&'static str, String)>,
}

impl FormBody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((name, value.into()));
        self
    }

    /// Serialize to the request body.
    #[must_use]
    pub fn encode(&self) -> String {
        self.fields
            .iter()
            .map(|(name, value)| format!("{name}={}", percent_encode_legacy(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}
