//! HTTP session shared by every fetch and submission.
//!
//! The session owns the cookie jar explicitly; clones of the jar handle can be
//! shared between sessions or inspected in tests.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, ORIGIN, REFERER};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::config::{Config, ConfigError};
use crate::constants::{AUTH_COOKIE_NAME, BROWSER_HEADERS};
use crate::encoding::decode_legacy;
use crate::error::ForumError;
use crate::forms::FormBody;

/// Source of decoded forum pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page by its path relative to the forum root and decode it.
    async fn fetch_page(&self, path: &str) -> Result<String, ForumError>;
}

/// Raw result of a form submission.
#[derive(Debug, Clone)]
pub struct FormResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl FormResponse {
    /// Body decoded from GBK, if it is valid.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        decode_legacy(&self.body)
    }
}

/// Cookie-persisting client for one forum.
#[derive(Debug, Clone)]
pub struct ForumSession {
    client: Client,
    jar: Arc<Jar>,
    config: Config,
}

impl ForumSession {
    /// Create a session with an empty cookie jar.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, ForumError> {
        Self::with_jar(config, Arc::new(Jar::default()))
    }

    /// Create a session around an existing cookie jar.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_jar(config: Config, jar: Arc<Jar>) -> Result<Self, ForumError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .gzip(true)
            .user_agent(config.user_agent.clone())
            .default_headers(browser_headers(&config)?)
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Self {
            client,
            jar,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    /// Resolve a path against the forum root.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn url(&self, path: &str) -> Result<Url, ForumError> {
        Ok(self.config.base_url.join(path)?)
    }

    /// Whether the jar holds the forum's login cookie.
    ///
    /// Expired cookies are dropped by the jar, so presence means a live login.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        let Some(header) = self.jar.cookies(&self.config.base_url) else {
            return false;
        };
        header.to_str().is_ok_and(|cookies| {
            cookies
                .split(';')
                .filter_map(|pair| pair.trim().split_once('='))
                .any(|(name, value)| name == AUTH_COOKIE_NAME && !value.is_empty())
        })
    }

    /// POST a form and return the raw response.
    ///
    /// Non-success statuses are returned, not turned into errors; callers decide
    /// what counts as accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body cannot be read.
    pub async fn post_form(
        &self,
        path: &str,
        form: &FormBody,
        referer: &Url,
    ) -> Result<FormResponse, ForumError> {
        let url = self.url(path)?;
        debug!(url = %url, "Submitting form");

        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(REFERER, referer.as_str())
            .body(form.encode())
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?.to_vec();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Form submission returned non-success status");
        }

        Ok(FormResponse { status, body })
    }
}

#[async_trait]
impl PageFetcher for ForumSession {
    async fn fetch_page(&self, path: &str) -> Result<String, ForumError> {
        let url = self.url(path)?;
        debug!(url = %url, "Fetching page");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ForumError::Status {
                status,
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        decode_legacy(&bytes).ok_or_else(|| ForumError::Decode {
            url: url.to_string(),
        })
    }
}

fn browser_headers(config: &Config) -> Result<HeaderMap, ForumError> {
    let mut headers = HeaderMap::new();
    for &(name, value) in BROWSER_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    let origin = HeaderValue::from_str(&config.origin()).map_err(|e| ConfigError::InvalidValue {
        name: "HIPDA_BASE_URL".to_string(),
        message: format!("origin is not a valid header value: {e}"),
    })?;
    headers.insert(ORIGIN, origin);

    Ok(headers)
}
