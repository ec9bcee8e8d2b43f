//! Keyword directory watcher for cache invalidation.

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

use crate::campaign::cache::CAMPAIGN_FILE_EXTENSION;
use crate::campaign::{CampaignCache, EvictReason};

/// Watch setup failures. Fatal at startup: without the watch, cached
/// matchers could go stale unnoticed.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to create file watcher: {0}")]
    Init(#[source] notify::Error),

    #[error("failed to watch keywords directory {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Evicts campaigns whose keyword file is created or written.
///
/// Reload is deferred to the next lookup; the watcher never reads files.
pub struct CampaignWatcher {
    // Dropping the notify watcher closes the event channel
    _watcher: RecommendedWatcher,
    events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    cache: Arc<CampaignCache>,
    debounce: Duration,
}

impl CampaignWatcher {
    /// Start watching the cache's keywords directory.
    pub fn new(cache: Arc<CampaignCache>, debounce: Duration) -> Result<Self, WatchError> {
        let (tx, events) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = tx.send(res);
            },
            Config::default(),
        )
        .map_err(WatchError::Init)?;

        let dir = cache.keywords_dir().to_path_buf();
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Watch {
                path: dir.clone(),
                source,
            })?;

        tracing::info!(path = ?dir, "File watcher initialized");
        Ok(Self {
            _watcher: watcher,
            events,
            cache,
            debounce,
        })
    }

    /// Consume events until the channel closes or shutdown fires.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(debounce_ms = self.debounce.as_millis() as u64, "File watcher started");

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(Ok(event)) => self.handle(event).await,
                    Some(Err(e)) => tracing::error!(error = %e, "File watcher error"),
                    None => break,
                },
                _ = shutdown.recv() => {
                    tracing::info!("File watcher received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        tracing::info!("File watcher stopped");
    }

    async fn handle(&self, event: Event) {
        let campaigns = changed_campaigns(&event);
        if campaigns.is_empty() {
            return;
        }

        // Let the writer finish before the next lookup reads the file
        tokio::time::sleep(self.debounce).await;

        for campaign in campaigns {
            tracing::info!(campaign = %campaign, kind = ?event.kind, "Keyword file changed");
            self.cache.evict(&campaign, EvictReason::Watch);
        }
    }
}

/// Campaign ids touched by a create or write event on `*.json` files.
pub fn changed_campaigns(event: &Event) -> Vec<String> {
    if !is_create_or_write(&event.kind) {
        return Vec::new();
    }

    let mut campaigns: Vec<String> = Vec::new();
    for path in &event.paths {
        let is_campaign_file = path
            .extension()
            .is_some_and(|ext| ext == CAMPAIGN_FILE_EXTENSION);
        if !is_campaign_file {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            if !campaigns.iter().any(|c| c == stem) {
                campaigns.push(stem.to_string());
            }
        }
    }
    campaigns
}

/// Metadata changes (chmod, touch) and renames away do not count. A file
/// moved into place is treated as a create.
fn is_create_or_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(
                ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Name(RenameMode::To)
            )
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind};

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |e, p| e.add_path(PathBuf::from(p)))
    }

    #[test]
    fn test_create_and_write_events() {
        let created = event(EventKind::Create(CreateKind::File), &["/k/acme.json"]);
        assert_eq!(changed_campaigns(&created), vec!["acme"]);

        let written = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/k/acme.json", "/k/beta.json", "/k/acme.json"],
        );
        assert_eq!(changed_campaigns(&written), vec!["acme", "beta"]);
    }

    #[test]
    fn test_ignored_events() {
        let removed = event(EventKind::Remove(RemoveKind::File), &["/k/acme.json"]);
        assert!(changed_campaigns(&removed).is_empty());

        let other_file = event(
            EventKind::Create(CreateKind::File),
            &["/k/acme.json.swp", "/k/notes.txt"],
        );
        assert!(changed_campaigns(&other_file).is_empty());
    }

    #[test]
    fn test_metadata_and_rename_away_ignored() {
        let touched = event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)),
            &["/k/acme.json"],
        );
        assert!(changed_campaigns(&touched).is_empty());

        let chmod = event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            &["/k/acme.json"],
        );
        assert!(changed_campaigns(&chmod).is_empty());

        let moved_away = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            &["/k/acme.json"],
        );
        assert!(changed_campaigns(&moved_away).is_empty());
    }

    #[test]
    fn test_moved_into_place_counts_as_create() {
        let moved_in = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &["/k/acme.json"],
        );
        assert_eq!(changed_campaigns(&moved_in), vec!["acme"]);

        let unspecified = event(EventKind::Modify(ModifyKind::Any), &["/k/acme.json"]);
        assert_eq!(changed_campaigns(&unspecified), vec!["acme"]);
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let cache = Arc::new(CampaignCache::new(
            "/definitely/not/a/keywords/dir",
            Default::default(),
        ));
        let result = CampaignWatcher::new(cache, Duration::from_millis(10));
        assert!(matches!(result, Err(WatchError::Watch { .. })));
    }
}
