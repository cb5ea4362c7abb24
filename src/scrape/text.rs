//! Plain-text and image extraction from post markup.
//!
//! This is best-effort tag stripping, not HTML parsing: nested or malformed
//! markup can leave fragments behind.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::constants::{BACK_ICON_URL, NOISE_STRINGS};
use crate::models::ContentFragment;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

static NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" ?\n[ \n]*").unwrap());

/// An image inside a link, the way the forum wraps every inline picture.
static LINKED_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a[^>]*>.*?<img[^>]+src="([^">]+)"[^>]*>.*?</a>"#).unwrap()
});

static NOISE_BLOCKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.t_attach, div.t_smallfont").expect("Invalid selector"));

/// Reduce a markup fragment to display text.
///
/// In order: removes app signatures, collapses whitespace, strips tags,
/// decodes entities and trims. Never fails.
///
/// Whitespace is collapsed while the tags are still in place, so spaces on
/// either side of a removed tag survive, and `&nbsp;` decodes to U+00A0
/// rather than a plain space. Entities are decoded after stripping, so
/// escaped markup such as `&lt;b&gt;` comes out as a literal `<b>`; a second
/// pass over that output would strip it.
#[must_use]
pub fn extract_plain_text(fragment: &str) -> String {
    let mut text = fragment.to_string();
    for noise in NOISE_STRINGS {
        if text.contains(noise) {
            text = text.replace(noise, "");
        }
    }

    let collapsed = collapse_whitespace(&text);
    let stripped = TAG.replace_all(&collapsed, "");
    let decoded = if stripped.contains('&') {
        decode_entities(&stripped)
    } else {
        stripped.into_owned()
    };

    decoded.trim().to_string()
}

/// Decode named and numeric HTML entities. Unknown entities are left as-is.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = SPACES.replace_all(&text, " ");
    NEWLINES.replace_all(&text, "\n").into_owned()
}

/// Split post markup into render order: the plain text, then each linked image.
///
/// Only images wrapped in `<a>` are found; bare `<img>` tags (smilies, mostly)
/// are dropped. Image sources are resolved against `base`, the forum root,
/// so relative attachment paths like `attachments/day_250101/a.jpg` are kept.
#[must_use]
pub fn extract_content_fragments(fragment: &str, base: &Url) -> Vec<ContentFragment> {
    let mut fragments = vec![ContentFragment::Text(extract_plain_text(fragment))];

    for caps in LINKED_IMAGE.captures_iter(fragment) {
        let src = decode_entities(&caps[1]);
        match base.join(&src) {
            Ok(url) if url.as_str() != BACK_ICON_URL => {
                fragments.push(ContentFragment::Image(url));
            }
            Ok(_) => {}
            Err(e) => tracing::trace!(src = %src, "Skipping unresolvable image: {e}"),
        }
    }

    fragments
}

/// Remove attachment lists and small-print signature blocks from post markup.
///
/// Markup without either block is returned unchanged; otherwise the fragment
/// is re-serialized through the DOM.
#[must_use]
pub fn strip_noise_blocks(fragment: &str) -> String {
    if !fragment.contains("t_attach") && !fragment.contains("t_smallfont") {
        return fragment.to_string();
    }

    let mut document = Html::parse_fragment(fragment);
    let noise: Vec<_> = document.select(&NOISE_BLOCKS).map(|el| el.id()).collect();
    for id in noise {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    document.root_element().inner_html()
}
