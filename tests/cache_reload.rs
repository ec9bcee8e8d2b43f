//! Reload behaviour: watcher-driven eviction and edits picked up by
//! later lookups.

use std::fs::File;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use keyword_matcher::campaign::{CampaignCache, EvictReason};
use keyword_matcher::config::CampaignWatcher;
use keyword_matcher::lifecycle::Shutdown;

mod common;

use common::{wait_until, KeywordsDir, ACME};

fn start_watcher(cache: Arc<CampaignCache>, shutdown: &Shutdown) -> tokio::task::JoinHandle<()> {
    let watcher = CampaignWatcher::new(cache, Duration::from_millis(20)).unwrap();
    tokio::spawn(watcher.run(shutdown.subscribe()))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_watcher_evicts_on_write() {
    let keywords = KeywordsDir::new();
    keywords.write("acme", ACME);
    let cache = keywords.cache();
    let shutdown = Shutdown::new();
    let task = start_watcher(cache.clone(), &shutdown);

    assert_eq!(cache.classify("acme", "s3", "please remove me").unwrap(), "DO_NOT_CALL");
    assert!(cache.is_cached("acme"));

    keywords.write("acme", r#"{"callback_p1_s3": ["remove me"]}"#);
    let cache_ref = cache.clone();
    assert!(
        wait_until(move || !cache_ref.is_cached("acme"), Duration::from_secs(5)).await,
        "watcher never evicted the edited campaign"
    );
    assert!(cache.stats().evictions >= 1);

    // A single save can emit several events, so only the outcome is stable
    assert_eq!(cache.classify("acme", "s3", "please remove me").unwrap(), "CALLBACK");

    shutdown.trigger();
    task.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_watcher_leaves_other_campaigns_cached() {
    let keywords = KeywordsDir::new();
    keywords.write("acme", ACME);
    keywords.write("beta", r#"{"busy_p1_s1": ["busy"]}"#);
    let cache = keywords.cache();
    let shutdown = Shutdown::new();
    let task = start_watcher(cache.clone(), &shutdown);

    cache.get_matcher("acme").unwrap();
    cache.get_matcher("beta").unwrap();

    keywords.write("beta", r#"{"busy_p1_s1": ["busy", "in a meeting"]}"#);
    let cache_ref = cache.clone();
    assert!(wait_until(move || !cache_ref.is_cached("beta"), Duration::from_secs(5)).await);
    assert!(cache.is_cached("acme"));

    // Non-campaign files are ignored
    std::fs::write(keywords.dir.path().join("notes.txt"), "scratch").unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(cache.is_cached("acme"));

    shutdown.trigger();
    task.await.unwrap();
}

#[tokio::test]
async fn test_watcher_stops_on_shutdown() {
    let keywords = KeywordsDir::new();
    let cache = keywords.cache();
    let shutdown = Shutdown::new();
    let task = start_watcher(cache, &shutdown);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("watcher did not stop")
        .unwrap();
}

#[test]
fn test_edit_without_watcher_reloads_on_newer_mtime() {
    let keywords = KeywordsDir::new();
    let path = keywords.write("acme", ACME);
    let cache = keywords.cache();

    assert_eq!(cache.classify("acme", "s3", "i am interested").unwrap(), "INTERESTED");

    keywords.write("acme", r#"{"interested_p1_s3": ["keen"]}"#);
    File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(10))
        .unwrap();

    assert_eq!(cache.classify("acme", "s3", "i am interested").unwrap(), "unknown");
    assert_eq!(cache.classify("acme", "s3", "very keen").unwrap(), "INTERESTED");
    assert_eq!(cache.stats().loads, 2);
}

#[test]
fn test_admin_eviction_forces_fresh_load() {
    let keywords = KeywordsDir::new();
    keywords.write("acme", ACME);
    let cache = keywords.cache();

    let first = cache.get_matcher("acme").unwrap();
    assert!(cache.evict("acme", EvictReason::Admin));
    assert!(!cache.evict("acme", EvictReason::Admin));

    let second = cache.get_matcher("acme").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(second.loaded_at() >= first.loaded_at());
}
