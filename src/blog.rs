//! Blog Posts Store
//!
//! Example store holding the latest blog posts. Fetching happens outside the
//! store; results are dispatched when they arrive.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use micro_store::{Action, BoundedCache, ReducerError, Store};

/// Registry name of the blog posts store.
pub const STORE_NAME: &str = "blogposts";

pub type BlogStore = Store<BlogState, BlogAction>;
pub type PostCache = RefCell<BoundedCache<String, Vec<Post>>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub created: DateTime<Utc>,
}

// == Entity Table ==
/// Items indexed by id, with their ids in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityTable<T> {
    pub by_id: BTreeMap<u64, T>,
    pub all_ids: Vec<u64>,
    pub active: Option<u64>,
}

impl<T> Default for EntityTable<T> {
    fn default() -> Self {
        Self {
            by_id: BTreeMap::new(),
            all_ids: Vec::new(),
            active: None,
        }
    }
}

/// Builds a table from `items`, keeping their order in `all_ids`.
pub fn entity_table<T, F>(items: Vec<T>, id_of: F) -> EntityTable<T>
where
    F: Fn(&T) -> u64,
{
    let all_ids = items.iter().map(&id_of).collect();
    let by_id = items.into_iter().map(|item| (id_of(&item), item)).collect();
    EntityTable {
        by_id,
        all_ids,
        active: None,
    }
}

// == State ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogState {
    pub loading: bool,
    pub fetching: bool,
    pub posts: EntityTable<Post>,
}

impl Default for BlogState {
    fn default() -> Self {
        Self {
            loading: true,
            fetching: false,
            posts: EntityTable::default(),
        }
    }
}

impl BlogState {
    pub fn active_post(&self) -> Option<&Post> {
        self.posts.active.and_then(|id| self.posts.by_id.get(&id))
    }
}

// == Actions ==
#[derive(Debug, Clone, Default)]
pub enum BlogAction {
    #[default]
    Init,
    Loading(bool),
    Fetching(bool),
    Posts(Vec<Post>),
    SelectPost(u64),
}

impl Action for BlogAction {
    fn kind(&self) -> &'static str {
        match self {
            BlogAction::Init => "init",
            BlogAction::Loading(_) => "loading",
            BlogAction::Fetching(_) => "fetching",
            BlogAction::Posts(_) => "posts",
            BlogAction::SelectPost(_) => "post.select",
        }
    }
}

// == Reducer ==
pub fn reduce(state: &BlogState, action: &BlogAction) -> Result<BlogState, ReducerError> {
    let mut next = state.clone();
    match action {
        BlogAction::Init => {}
        BlogAction::Loading(loading) => next.loading = *loading,
        BlogAction::Fetching(fetching) => next.fetching = *fetching,
        BlogAction::Posts(posts) => {
            let mut sorted = posts.clone();
            // Most recent first
            sorted.sort_by(|a, b| b.created.cmp(&a.created));
            next.posts = entity_table(sorted, |post| post.id);
            next.posts.active = next.posts.all_ids.first().copied();
            next.loading = false;
        }
        BlogAction::SelectPost(id) => {
            if !state.posts.by_id.contains_key(id) {
                return Err(ReducerError::new(format!("no post with id {}", id)));
            }
            next.posts.active = Some(*id);
        }
    }
    Ok(next)
}

// == Post Source ==
/// Stand-in for the blog posts endpoint.
#[derive(Debug, Clone)]
pub struct PostSource {
    delay: Duration,
}

impl PostSource {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Returns the `last` most recent posts after the configured delay.
    pub async fn fetch(&self, last: usize) -> Vec<Post> {
        tokio::time::sleep(self.delay).await;
        let now = Utc::now();
        (1..=last as u64)
            .map(|id| Post {
                id,
                title: format!("Post #{}", id),
                created: now - chrono::Duration::hours(id as i64),
            })
            .collect()
    }
}

// == Fetch Posts ==
/// Fetches the latest posts and dispatches them, serving repeated requests
/// from `cache`.
pub async fn fetch_posts(
    store: &BlogStore,
    cache: &PostCache,
    source: &PostSource,
    last: usize,
) -> micro_store::Result<()> {
    store.dispatch(BlogAction::Fetching(true))?;

    let key = format!("/api/my-blog-posts?last={}", last);
    let cached = cache.borrow().get(&key).cloned();
    let posts = match cached {
        Some(posts) => {
            debug!("posts for '{}' served from cache", key);
            posts
        }
        None => {
            let posts = source.fetch(last).await;
            info!("Blog posts fetched: {}", posts.len());
            cache.borrow_mut().put(key, posts.clone());
            posts
        }
    };

    store.dispatch_all([BlogAction::Posts(posts), BlogAction::Fetching(false)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use micro_store::Error;
    use std::cell::Cell;
    use std::rc::Rc;

    fn post(id: u64, hour: u32) -> Post {
        Post {
            id,
            title: format!("Post {}", id),
            created: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
        }
    }

    fn blog_store() -> BlogStore {
        Store::named(STORE_NAME, BlogState::default, reduce).unwrap()
    }

    #[test]
    fn test_entity_table() {
        let table = entity_table(vec![post(3, 1), post(1, 2)], |p| p.id);
        assert_eq!(table.all_ids, vec![3, 1]);
        assert_eq!(table.by_id.len(), 2);
        assert_eq!(table.by_id[&1].title, "Post 1");
        assert_eq!(table.active, None);
    }

    #[test]
    fn test_posts_sorted_most_recent_first() {
        let store = blog_store();
        store
            .dispatch(BlogAction::Posts(vec![post(1, 8), post(2, 12), post(3, 10)]))
            .unwrap();

        let state = store.get_state();
        assert_eq!(state.posts.all_ids, vec![2, 3, 1]);
        assert_eq!(state.posts.active, Some(2));
        assert!(!state.loading);
    }

    #[test]
    fn test_select_post() {
        let store = blog_store();
        store
            .dispatch(BlogAction::Posts(vec![post(1, 8), post(2, 12)]))
            .unwrap();

        store.dispatch(BlogAction::SelectPost(1)).unwrap();

        assert_eq!(store.get_state().active_post().map(|p| p.id), Some(1));
    }

    #[test]
    fn test_select_unknown_post_fails() {
        let store = blog_store();
        let result = store.dispatch(BlogAction::SelectPost(42));

        assert!(matches!(result, Err(Error::ReducerFailure { kind: "post.select", .. })));
        assert_eq!(store.get_state().posts.active, None);
    }

    #[tokio::test]
    async fn test_fetch_posts_dispatches_batch() {
        let store = blog_store();
        let cache: PostCache = RefCell::new(BoundedCache::new(2).unwrap());
        let source = PostSource::new(Duration::ZERO);
        let notifications = Rc::new(Cell::new(0));
        let seen = Rc::clone(&notifications);
        let _sub = store.subscribe(move || seen.set(seen.get() + 1));

        fetch_posts(&store, &cache, &source, 3).await.unwrap();

        let state = store.get_state();
        assert_eq!(state.posts.all_ids, vec![1, 2, 3]);
        assert!(!state.fetching);
        // Fetching(true), then one notification for the [Posts, Fetching(false)] batch
        assert_eq!(notifications.get(), 2);
        assert!(cache.borrow().has(&"/api/my-blog-posts?last=3".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_posts_uses_cache() {
        let store = blog_store();
        let cache: PostCache = RefCell::new(BoundedCache::new(2).unwrap());
        let source = PostSource::new(Duration::ZERO);

        fetch_posts(&store, &cache, &source, 2).await.unwrap();
        let first = store.get_state().posts.clone();
        fetch_posts(&store, &cache, &source, 2).await.unwrap();

        assert_eq!(store.get_state().posts, first);
        assert_eq!(cache.borrow().stats().inserts, 1);
    }
}
