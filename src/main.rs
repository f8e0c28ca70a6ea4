//! Micro Store demo
//!
//! Wires a blog posts store into a registry, memoizes its fetches in a bounded
//! cache, renders two broadcasting views and reports activity through the hub.

mod blog;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use serde_json::{json, Value};
use tokio::task::LocalSet;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blog::{BlogAction, BlogState, PostSource};
use micro_store::hub::topics;
use micro_store::{
    BoundedCache, Config, EventHub, ProviderGroup, ProviderOptions, Selectors, StoreRegistry,
};

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Load configuration from environment variables
/// 2. Initialize tracing subscriber for logging
/// 3. Run the demo on a single-threaded local task set
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // Defaults to the configured filter, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting micro_store demo");
    info!(
        "Configuration loaded: cache_capacity={}, fetch_delay={}ms",
        config.cache_capacity, config.fetch_delay_ms
    );

    // Stores are single-threaded, so everything runs on one LocalSet
    let local = LocalSet::new();
    local.run_until(run(config)).await?;

    info!("Demo complete");
    Ok(())
}

async fn run(config: Config) -> anyhow::Result<()> {
    let registry = Rc::new(StoreRegistry::new());
    let hub = Rc::new(EventHub::new());

    let _activity = hub.subscribe(topics::ACTIVITY, |data: &Value| {
        info!("activity: {}", data);
    });

    // A consumer that only knows the store by name
    let watcher = {
        let registry = Rc::clone(&registry);
        let hub = Rc::clone(&hub);
        tokio::task::spawn_local(async move {
            let store = registry
                .on_store::<BlogState, BlogAction>(blog::STORE_NAME)
                .await?;
            info!("watcher: found store '{}' ({})", store.name(), store.id());

            let observed = store.clone();
            let subscription = store.subscribe(move || {
                let state = observed.get_state();
                hub.publish(
                    topics::ACTIVITY,
                    Some(json!({
                        "fetching": state.fetching,
                        "posts": state.posts.all_ids.len(),
                    })),
                );
            });
            Ok::<_, micro_store::Error>(subscription)
        })
    };

    let store = registry
        .create_store(blog::STORE_NAME, BlogState::default, blog::reduce)
        .context("creating the blog posts store")?;
    let _watching = watcher.await.context("watcher task failed")??;

    let group = ProviderGroup::new(store.clone());
    let header = group.mount(ProviderOptions::broadcast("header"), || {
        info!("header view re-rendered");
    })?;
    let _sidebar = group.mount(ProviderOptions::broadcast("sidebar"), || {
        info!("sidebar view re-rendered");
    })?;

    let cache: blog::PostCache = RefCell::new(BoundedCache::from_config(&config)?);
    let source = PostSource::new(Duration::from_millis(config.fetch_delay_ms));

    store.dispatch(BlogAction::Loading(true))?;
    blog::fetch_posts(&store, &cache, &source, 5).await?;
    // Second request for the same page is served from the cache
    blog::fetch_posts(&store, &cache, &source, 5).await?;
    info!("post cache: {:?}", cache.borrow().stats());

    let selectors = Selectors::new()
        .path("active", "posts.active")
        .path("newest", "posts.all_ids[0]")
        .path("missing", "posts.by_id[999].title")
        .compute("title", |state: &BlogState| {
            state
                .active_post()
                .map(|post| json!(post.title))
                .unwrap_or(Value::Null)
        });
    info!("selection: {:?}", store.select_state(&selectors)?);

    header.dispatch(BlogAction::SelectPost(3))?;
    info!("selection: {:?}", store.select_state(&selectors)?);

    if let Err(err) = header.dispatch(BlogAction::SelectPost(999)) {
        warn!("dispatch rejected: {}", err);
    }

    registry.clear();
    hub.clear();
    Ok(())
}
