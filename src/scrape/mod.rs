//! Regex-based extraction of entities from forum markup.
//!
//! All knowledge of the forum's HTML templates lives here, behind plain
//! functions from markup to entities.

pub mod form_hash;
pub mod posts;
pub mod text;
pub mod topics;

pub use form_hash::extract_form_hash;
pub use posts::{has_next_page, parse_posts};
pub use text::{decode_entities, extract_content_fragments, extract_plain_text, strip_noise_blocks};
pub use topics::parse_topics;
