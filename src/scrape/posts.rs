use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::constants::NEXT_PAGE_MARKER;
use crate::models::Post;
use crate::scrape::text::{extract_plain_text, strip_noise_blocks};

/// Start of every post's author cell.
const POST_BLOCK_START: &str = r#"<td class="postauthor""#;

static POST_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<td class="postauthor".*?<div class="postinfo">.*?<a[^>]*?>(.*?)</a>.*?</div>.*?<td class="t_msgfont" id="postmessage_(\d+)">(.*?)</td>"#,
    )
    .unwrap()
});

/// Extract the posts on one thread page.
///
/// Each author cell starts an independent block, so a block missing its
/// message cell is dropped without swallowing the next post. Blocks without an
/// id or with empty content are skipped.
#[must_use]
pub fn parse_posts(html: &str) -> Vec<Post> {
    let posts: Vec<Post> = post_blocks(html)
        .filter_map(|block| {
            let Some(caps) = POST_BLOCK.captures(block) else {
                trace!("Skipping post block without message cell");
                return None;
            };
            let id = caps[2].to_string();
            let content = strip_noise_blocks(&caps[3]);
            if id.is_empty() || content.trim().is_empty() {
                trace!(id = %id, "Skipping post with empty content");
                return None;
            }
            Some(Post {
                id,
                author: extract_plain_text(&caps[1]),
                content,
            })
        })
        .collect();

    debug!(count = posts.len(), "Parsed posts");
    posts
}

/// Split a page into slices that each begin at an author cell.
fn post_blocks(html: &str) -> impl Iterator<Item = &str> {
    let starts: Vec<usize> = html
        .match_indices(POST_BLOCK_START)
        .map(|(i, _)| i)
        .collect();
    let ends: Vec<usize> = starts.iter().skip(1).copied().chain([html.len()]).collect();
    starts.into_iter().zip(ends).map(move |(start, end)| &html[start..end])
}

/// Whether the page's pagination bar links to a further page.
///
/// A presence check on the "next" styling, not link extraction. Markup drift
/// upstream turns this into a false "last page".
#[must_use]
pub fn has_next_page(html: &str) -> bool {
    html.contains(NEXT_PAGE_MARKER)
}
