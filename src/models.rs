use serde::Serialize;
use url::Url;

use crate::scrape::{extract_content_fragments, extract_plain_text};

/// A discussion thread as it appears in a forum listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic {
    /// Thread id from the `tid` query parameter. Not validated as numeric.
    pub id: String,
    pub title: String,
}

/// One message within a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: String,
    pub author: String,
    /// Inner markup of the message cell, decoded from GBK, with attachment
    /// and signature blocks removed. Text and images are extracted on demand.
    pub content: String,
}

impl Post {
    /// Render-time view of the content: text first, then linked images,
    /// resolved against the forum root `base`.
    #[must_use]
    pub fn fragments(&self, base: &Url) -> Vec<ContentFragment> {
        extract_content_fragments(&self.content, base)
    }

    #[must_use]
    pub fn plain_text(&self) -> String {
        extract_plain_text(&self.content)
    }
}

/// A piece of a post's rendered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentFragment {
    Text(String),
    Image(Url),
}

/// Anything collected by a [`Listing`](crate::listing::Listing) that has a
/// stable identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Topic {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_fragments_defer_to_extractor() {
        let post = Post {
            id: "1".to_string(),
            author: "alice".to_string(),
            content: r#"hello &amp; welcome<br /><a href="x"><img src="http://h/i.png" /></a>"#
                .to_string(),
        };

        let base = Url::parse("https://www.4d4y.com/forum/").unwrap();
        assert_eq!(post.plain_text(), "hello & welcome");
        assert_eq!(
            post.fragments(&base),
            vec![
                ContentFragment::Text("hello & welcome".to_string()),
                ContentFragment::Image(Url::parse("http://h/i.png").unwrap()),
            ]
        );
    }

    #[test]
    fn test_post_fragments_keep_relative_attachments() {
        let post = Post {
            id: "2".to_string(),
            author: "bob".to_string(),
            content: r#"pic <a href="attachment.php?aid=1"><img src="attachments/day_250101/a.jpg" /></a>"#
                .to_string(),
        };
        let base = Url::parse("https://www.4d4y.com/forum/").unwrap();

        assert_eq!(
            post.fragments(&base),
            vec![
                ContentFragment::Text("pic".to_string()),
                ContentFragment::Image(
                    Url::parse("https://www.4d4y.com/forum/attachments/day_250101/a.jpg").unwrap()
                ),
            ]
        );
    }

    #[test]
    fn test_topic_serializes_all_fields() {
        let topic = Topic {
            id: "3350357".to_string(),
            title: "今天吃什么".to_string(),
        };
        let json = serde_json::to_value(&topic).unwrap();
        assert_eq!(json["id"], "3350357");
        assert_eq!(json["title"], "今天吃什么");
    }
}
