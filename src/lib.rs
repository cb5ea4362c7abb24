//! HiPDA forum client library.
//!
//! Scrapes topic listings and threads from the forum's GBK-encoded HTML,
//! pages through them incrementally, and logs in, replies and posts new
//! topics through emulated form submissions.

// Allow raw string hashes for safety - they're harmless and prevent issues if content changes
#![allow(clippy::needless_raw_string_hashes)]

pub mod auth;
pub mod compose;
pub mod config;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod forms;
pub mod listing;
pub mod models;
pub mod scrape;
pub mod session;
pub mod telemetry;

pub use config::Config;
pub use error::ForumError;
pub use listing::{Listing, LoadOutcome, LoadState, PostListing, TopicListing};
pub use models::{ContentFragment, Post, Topic};
pub use session::{ForumSession, PageFetcher};
