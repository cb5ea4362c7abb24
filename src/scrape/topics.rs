use regex::Regex;
use tracing::debug;

use crate::models::Topic;
use crate::scrape::text::decode_entities;

/// Extract the topics linked from one forum listing page.
///
/// Only thread links carrying `extra=page%3D{current_page}` are matched, so the
/// page number must be the one the markup was fetched for. Results keep
/// document order and are not de-duplicated.
#[must_use]
pub fn parse_topics(html: &str, current_page: u32) -> Vec<Topic> {
    let pattern = format!(
        r#"(?s)<a href="viewthread\.php\?tid=(\d+)&amp;extra=page%3D{current_page}">(.*?)</a>"#
    );
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    let topics: Vec<Topic> = re
        .captures_iter(html)
        .filter_map(|caps| {
            let id = caps[1].to_string();
            let title = decode_entities(&caps[2]);
            if id.is_empty() || title.is_empty() {
                return None;
            }
            Some(Topic { id, title })
        })
        .collect();

    debug!(page = current_page, count = topics.len(), "Parsed topics");
    topics
}
