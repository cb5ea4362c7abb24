//! Replying to threads and starting new ones.
//!
//! Acceptance is judged by the HTTP status alone: the forum answers 200 even
//! for some refusals (flood control, for instance), and the body is not
//! inspected.

use reqwest::StatusCode;
use tracing::{info, warn};

use crate::error::ForumError;
use crate::forms::FormBody;
use crate::scrape::extract_form_hash;
use crate::session::{FormResponse, ForumSession, PageFetcher};

/// Text being composed. Cleared once the forum accepts it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub subject: String,
    pub message: String,
}

impl Draft {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            subject: String::new(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn clear(&mut self) {
        self.subject.clear();
        self.message.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subject.is_empty() && self.message.is_empty()
    }
}

/// Post `draft` as a reply to a thread.
///
/// # Errors
///
/// Returns [`ForumError::EmptyMessage`] before any request if the message is
/// blank, [`ForumError::Rejected`] on a non-200 response, and fetch errors
/// from reading the form hash.
pub async fn reply(
    session: &ForumSession,
    forum_id: u32,
    thread_id: &str,
    draft: &mut Draft,
) -> Result<(), ForumError> {
    if draft.message.trim().is_empty() {
        return Err(ForumError::EmptyMessage);
    }

    let thread_path = format!("viewthread.php?tid={thread_id}&extra=page%3D1");
    let form_hash = form_hash_from(session, &thread_path).await?;

    let form = FormBody::new()
        .field("formhash", form_hash)
        .field("subject", draft.subject.as_str())
        .field("usesig", "0")
        .field("message", draft.message.as_str());

    let submit_path = format!(
        "post.php?action=reply&fid={forum_id}&tid={thread_id}&extra=page%3D1&replysubmit=yes&infloat=yes&handlekey=fastpost&inajax=1"
    );
    let referer = session.url(&thread_path)?;
    let response = session.post_form(&submit_path, &form, &referer).await?;

    accept(response, draft)?;
    info!(thread_id, "Reply posted");
    Ok(())
}

/// Start a new thread in a forum with `draft`'s subject and message.
///
/// # Errors
///
/// Returns [`ForumError::EmptySubject`] or [`ForumError::EmptyMessage`] before
/// any request, [`ForumError::Rejected`] on a non-200 response, and fetch
/// errors from reading the form hash.
pub async fn new_topic(
    session: &ForumSession,
    forum_id: u32,
    draft: &mut Draft,
) -> Result<(), ForumError> {
    if draft.subject.trim().is_empty() {
        return Err(ForumError::EmptySubject);
    }
    if draft.message.trim().is_empty() {
        return Err(ForumError::EmptyMessage);
    }

    let form_path = format!("post.php?action=newthread&fid={forum_id}");
    let form_hash = form_hash_from(session, &form_path).await?;

    let form = FormBody::new()
        .field("formhash", form_hash)
        .field("posttime", chrono::Utc::now().timestamp().to_string())
        .field("wysiwyg", "0")
        .field("iconid", "0")
        .field("subject", draft.subject.as_str())
        .field("typeid", "0")
        .field("message", draft.message.as_str())
        .field("tags", "")
        .field("attention_add", "1");

    let submit_path = format!("post.php?action=newthread&fid={forum_id}&extra=&topicsubmit=yes");
    let referer = session.url(&form_path)?;
    let response = session.post_form(&submit_path, &form, &referer).await?;

    accept(response, draft)?;
    info!(forum_id, "New topic posted");
    Ok(())
}

async fn form_hash_from(session: &ForumSession, path: &str) -> Result<String, ForumError> {
    let page = session.fetch_page(path).await?;
    extract_form_hash(&page).ok_or_else(|| ForumError::MissingFormHash {
        url: path.to_string(),
    })
}

fn accept(response: FormResponse, draft: &mut Draft) -> Result<(), ForumError> {
    if response.status != StatusCode::OK {
        warn!(status = %response.status, "Submission rejected");
        return Err(ForumError::Rejected {
            status: response.status,
        });
    }
    draft.clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_clear() {
        let mut draft = Draft::new("body").with_subject("title");
        assert!(!draft.is_empty());
        draft.clear();
        assert!(draft.is_empty());
    }

    #[test]
    fn test_accept_clears_only_on_ok() {
        let mut draft = Draft::new("keep me");
        let rejected = FormResponse {
            status: StatusCode::FORBIDDEN,
            body: Vec::new(),
        };
        assert!(matches!(
            accept(rejected, &mut draft),
            Err(ForumError::Rejected { .. })
        ));
        assert_eq!(draft.message, "keep me");

        let ok = FormResponse {
            status: StatusCode::OK,
            body: Vec::new(),
        };
        assert!(accept(ok, &mut draft).is_ok());
        assert!(draft.is_empty());
    }
}
