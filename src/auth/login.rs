use reqwest::StatusCode;
use tracing::{info, warn};

use crate::auth::password::{Password, PasswordHasher};
use crate::constants::{LOGIN_PAGE_PATH, LOGIN_SUBMIT_PATH, LOGIN_SUCCESS_MARKER};
use crate::error::ForumError;
use crate::forms::FormBody;
use crate::scrape::extract_form_hash;
use crate::session::{ForumSession, PageFetcher};

const CREDENTIALS_REJECTED: &str = "Login failed. Please check your credentials.";
const LOGIN_UNAVAILABLE: &str = "Login failed. Please try again.";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Password,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: Password) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// Log in, leaving the auth cookie in the session's jar.
///
/// The form hash is scraped from the login page first. Success is recognised
/// by the "welcome back" text in the response; wrong credentials and server
/// rejection are not told apart.
///
/// # Errors
///
/// Returns [`ForumError::Auth`] on a non-200 response or a response without
/// the welcome text, and transport errors as-is.
pub async fn login(
    session: &ForumSession,
    hasher: &mut PasswordHasher,
    credentials: &Credentials,
) -> Result<(), ForumError> {
    let login_page = session.fetch_page(LOGIN_PAGE_PATH).await?;
    let form_hash =
        extract_form_hash(&login_page).ok_or_else(|| ForumError::MissingFormHash {
            url: LOGIN_PAGE_PATH.to_string(),
        })?;

    let config = session.config();
    let form = FormBody::new()
        .field("formhash", form_hash)
        .field("referer", config.base_url.as_str())
        .field("loginfield", "username")
        .field("username", credentials.username.as_str())
        .field("password", hasher.hash(&credentials.password))
        .field("questionid", "0")
        .field("answer", "")
        .field("cookietime", config.cookie_time.to_string());

    let response = session
        .post_form(LOGIN_SUBMIT_PATH, &form, &config.base_url)
        .await?;

    if response.status != StatusCode::OK {
        warn!(status = %response.status, "Login request rejected");
        return Err(ForumError::Auth(LOGIN_UNAVAILABLE.to_string()));
    }

    let welcomed = response
        .text()
        .is_some_and(|body| body.contains(LOGIN_SUCCESS_MARKER));
    if !welcomed {
        warn!(username = %credentials.username, "Login response lacked welcome text");
        return Err(ForumError::Auth(CREDENTIALS_REJECTED.to_string()));
    }

    info!(username = %credentials.username, "Logged in");
    Ok(())
}
