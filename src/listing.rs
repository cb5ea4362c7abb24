//! Incremental pagination over topic listings and threads.
//!
//! A [`Listing`] accumulates entities page by page. The presentation layer
//! asks for the next batch when it renders the last item; at most one fetch
//! per listing is in flight, so page order and append order always agree.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::error::ForumError;
use crate::models::{Identified, Post, Topic};
use crate::scrape::{has_next_page, parse_posts, parse_topics};
use crate::session::PageFetcher;

/// What a listing pages through: where pages live and how to read them.
pub trait ListingKind: Send + Sync {
    type Item: Identified + Clone + Send + Sync;

    /// Path of a page relative to the forum root. Pages start at 1.
    fn page_path(&self, page: u32) -> String;

    fn parse(&self, html: &str, page: u32) -> Vec<Self::Item>;

    fn has_next(&self, html: &str) -> bool {
        has_next_page(html)
    }
}

/// Topics of one board, newest activity first.
#[derive(Debug, Clone)]
pub struct ForumTopics {
    pub forum_id: u32,
}

impl ListingKind for ForumTopics {
    type Item = Topic;

    fn page_path(&self, page: u32) -> String {
        format!("forumdisplay.php?fid={}&page={page}", self.forum_id)
    }

    fn parse(&self, html: &str, page: u32) -> Vec<Topic> {
        parse_topics(html, page)
    }
}

/// Posts of one thread, oldest first.
#[derive(Debug, Clone)]
pub struct ThreadPosts {
    pub thread_id: String,
}

impl ListingKind for ThreadPosts {
    type Item = Post;

    fn page_path(&self, page: u32) -> String {
        format!(
            "viewthread.php?tid={}&extra=page%3D1&page={page}",
            self.thread_id
        )
    }

    fn parse(&self, html: &str, _page: u32) -> Vec<Post> {
        parse_posts(html)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Ready to fetch the next page.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetched page had no "next" link.
    Done,
    /// The last fetch failed; the message is meant for the user.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Appended { count: usize, has_more: bool },
    /// Another fetch was already running; nothing happened.
    Busy,
    /// The listing already reached its last page.
    Exhausted,
}

#[derive(Debug)]
struct Inner<T> {
    items: Vec<T>,
    state: LoadState,
    next_page: u32,
    pages_loaded: u32,
}

fn lock_inner<T>(inner: &Mutex<Inner<T>>) -> MutexGuard<'_, Inner<T>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Puts a listing back into its pre-fetch state if a load is abandoned
/// mid-flight, i.e. its future is dropped before the fetch resolves.
struct InFlight<'a, T> {
    inner: &'a Mutex<Inner<T>>,
    previous: Option<LoadState>,
}

impl<'a, T> InFlight<'a, T> {
    fn new(inner: &'a Mutex<Inner<T>>, previous: LoadState) -> Self {
        Self {
            inner,
            previous: Some(previous),
        }
    }

    /// The load resolved; the caller sets the final state itself.
    fn complete(mut self) {
        self.previous = None;
    }
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let mut inner = lock_inner(self.inner);
            if inner.state == LoadState::Loading {
                debug!("Load abandoned before completion, restoring state");
                inner.state = previous;
            }
        }
    }
}

/// Accumulated, paginated sequence of entities.
pub struct Listing<K: ListingKind, F: PageFetcher> {
    kind: K,
    fetcher: Arc<F>,
    inner: Mutex<Inner<K::Item>>,
}

pub type TopicListing<F> = Listing<ForumTopics, F>;
pub type PostListing<F> = Listing<ThreadPosts, F>;

impl<F: PageFetcher> Listing<ForumTopics, F> {
    #[must_use]
    pub fn topics(fetcher: Arc<F>, forum_id: u32) -> Self {
        Self::new(ForumTopics { forum_id }, fetcher)
    }
}

impl<F: PageFetcher> Listing<ThreadPosts, F> {
    #[must_use]
    pub fn posts(fetcher: Arc<F>, thread_id: impl Into<String>) -> Self {
        Self::new(
            ThreadPosts {
                thread_id: thread_id.into(),
            },
            fetcher,
        )
    }
}

impl<K: ListingKind, F: PageFetcher> Listing<K, F> {
    #[must_use]
    pub fn new(kind: K, fetcher: Arc<F>) -> Self {
        Self {
            kind,
            fetcher,
            inner: Mutex::new(Inner {
                items: Vec::new(),
                state: LoadState::Idle,
                next_page: 1,
                pages_loaded: 0,
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> LoadState {
        self.lock().state.clone()
    }

    /// Snapshot of everything loaded so far, in arrival order.
    #[must_use]
    pub fn items(&self) -> Vec<K::Item> {
        self.lock().items.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Page the next `request_more` will fetch.
    #[must_use]
    pub fn next_page(&self) -> u32 {
        self.lock().next_page
    }

    /// Last page fetched successfully, or 0 before the first load.
    #[must_use]
    pub fn pages_loaded(&self) -> u32 {
        self.lock().pages_loaded
    }

    /// Whether the listing has never loaded and should fetch its first page.
    #[must_use]
    pub fn needs_initial_load(&self) -> bool {
        let inner = self.lock();
        inner.pages_loaded == 0 && inner.state == LoadState::Idle
    }

    /// Infinite-scroll trigger: true when `rendered_index` is the last item
    /// and more pages may follow.
    #[must_use]
    pub fn should_request_more(&self, rendered_index: usize) -> bool {
        let inner = self.lock();
        inner.state == LoadState::Idle && rendered_index + 1 == inner.items.len()
    }

    /// Fetch, parse and append the next page.
    ///
    /// A call while another fetch is running returns [`LoadOutcome::Busy`]
    /// without doing anything. Calling again after a failure retries the same
    /// page. Dropping the future before it resolves returns the listing to
    /// the state it had before the call.
    ///
    /// # Errors
    ///
    /// Returns the fetch or decode error; the listing moves to
    /// [`LoadState::Failed`] and keeps everything loaded so far.
    pub async fn request_more(&self) -> Result<LoadOutcome, ForumError> {
        let (page, previous) = {
            let mut inner = self.lock();
            match inner.state {
                LoadState::Loading => return Ok(LoadOutcome::Busy),
                LoadState::Done => return Ok(LoadOutcome::Exhausted),
                LoadState::Idle | LoadState::Failed(_) => {}
            }
            let previous = std::mem::replace(&mut inner.state, LoadState::Loading);
            (inner.next_page, previous)
        };
        let in_flight = InFlight::new(&self.inner, previous);

        let path = self.kind.page_path(page);
        let fetched = self.fetcher.fetch_page(&path).await;
        in_flight.complete();
        let html = match fetched {
            Ok(html) => html,
            Err(e) => {
                warn!(page, path = %path, "Page load failed: {e}");
                self.lock().state = LoadState::Failed(e.user_message());
                return Err(e);
            }
        };

        let new_items = self.kind.parse(&html, page);
        let has_more = self.kind.has_next(&html);
        let count = new_items.len();

        let mut inner = self.lock();
        inner.items.extend(new_items);
        inner.pages_loaded = page;
        if has_more {
            inner.next_page = page + 1;
            inner.state = LoadState::Idle;
        } else {
            inner.state = LoadState::Done;
        }

        if count == 0 {
            debug!(page, has_more, "Page parsed to zero items");
        }
        info!(page, count, total = inner.items.len(), has_more, "Page loaded");

        Ok(LoadOutcome::Appended { count, has_more })
    }

    /// Re-read the last loaded page and append items not yet present.
    ///
    /// Used after posting a reply, which lands on the thread's last page. If
    /// the page has grown a "next" link, the listing becomes loadable again.
    /// Loads the first page if nothing has been loaded yet.
    ///
    /// # Errors
    ///
    /// Returns the fetch or decode error; the listing keeps its previous state.
    pub async fn refresh_last_page(&self) -> Result<LoadOutcome, ForumError> {
        let started = {
            let mut inner = self.lock();
            if inner.state == LoadState::Loading {
                return Ok(LoadOutcome::Busy);
            }
            if inner.pages_loaded == 0 {
                None
            } else {
                let previous = std::mem::replace(&mut inner.state, LoadState::Loading);
                Some((inner.pages_loaded, previous))
            }
        };
        let Some((page, previous)) = started else {
            return self.request_more().await;
        };
        let in_flight = InFlight::new(&self.inner, previous.clone());

        let path = self.kind.page_path(page);
        let fetched = self.fetcher.fetch_page(&path).await;
        in_flight.complete();
        let html = match fetched {
            Ok(html) => html,
            Err(e) => {
                warn!(page, path = %path, "Page refresh failed: {e}");
                self.lock().state = previous;
                return Err(e);
            }
        };

        let fresh = self.kind.parse(&html, page);
        let has_more = self.kind.has_next(&html);

        let mut inner = self.lock();
        let known: HashSet<String> = inner.items.iter().map(|i| i.id().to_string()).collect();
        let new_items: Vec<K::Item> = fresh
            .into_iter()
            .filter(|item| !known.contains(item.id()))
            .collect();
        let count = new_items.len();
        inner.items.extend(new_items);

        if has_more {
            inner.next_page = page + 1;
            inner.state = LoadState::Idle;
        } else {
            inner.next_page = page;
            inner.state = LoadState::Done;
        }

        debug!(page, count, has_more, "Page refreshed");
        Ok(LoadOutcome::Appended { count, has_more })
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K::Item>> {
        lock_inner(&self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_paths() {
        let topics = ForumTopics { forum_id: 2 };
        assert_eq!(topics.page_path(3), "forumdisplay.php?fid=2&page=3");

        let posts = ThreadPosts {
            thread_id: "3350357".to_string(),
        };
        assert_eq!(
            posts.page_path(2),
            "viewthread.php?tid=3350357&extra=page%3D1&page=2"
        );
    }

    #[test]
    fn test_topic_kind_parses_with_page_number() {
        let kind = ForumTopics { forum_id: 2 };
        let html = r#"<a href="viewthread.php?tid=9&amp;extra=page%3D4">t</a>"#;
        assert!(kind.parse(html, 1).is_empty());
        assert_eq!(kind.parse(html, 4).len(), 1);
    }
}
