//! Campaign name → matcher cache with modification-time invalidation.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::campaign::error::{CampaignError, CampaignResult};
use crate::matching::{MatchOptions, Matcher, StageSummary};
use crate::observability::metrics;

/// Extension of campaign keyword files.
pub const CAMPAIGN_FILE_EXTENSION: &str = "json";

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictReason {
    /// Lookup saw a newer modification time.
    Modified,
    /// Filesystem watcher reported a change.
    Watch,
    /// Explicit administrative request.
    Admin,
}

impl EvictReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictReason::Modified => "modified",
            EvictReason::Watch => "watch",
            EvictReason::Admin => "admin",
        }
    }
}

struct CacheEntry {
    matcher: Arc<Matcher>,
    /// Source modification time observed before the load.
    modified: Option<SystemTime>,
}

impl CacheEntry {
    fn is_stale(&self, current: Option<SystemTime>) -> bool {
        match (current, self.modified) {
            (Some(now), Some(seen)) => now > seen,
            (Some(_), None) => true,
            // Source vanished or cannot be stat'ed: keep serving what we have
            (None, _) => false,
        }
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
    evictions: AtomicU64,
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub load_failures: u64,
    pub evictions: u64,
}

/// Introspection view of one cached campaign.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignSnapshot {
    pub campaign: String,
    /// Build time, milliseconds since the Unix epoch.
    pub loaded_at: u64,
    pub file_path: String,
    pub stages: BTreeMap<String, StageSummary>,
    pub warnings: usize,
}

/// Concurrent store of campaign matchers backed by `<dir>/<campaign>.json`.
pub struct CampaignCache {
    keywords_dir: PathBuf,
    options: MatchOptions,
    entries: RwLock<HashMap<String, CacheEntry>>,
    counters: Counters,
}

impl CampaignCache {
    /// Create an empty cache over `keywords_dir`.
    pub fn new(keywords_dir: impl Into<PathBuf>, options: MatchOptions) -> Self {
        Self {
            keywords_dir: keywords_dir.into(),
            options,
            entries: RwLock::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    pub fn keywords_dir(&self) -> &Path {
        &self.keywords_dir
    }

    /// Path of the keyword file backing `campaign`.
    pub fn path_for(&self, campaign: &str) -> PathBuf {
        self.keywords_dir
            .join(format!("{}.{}", campaign, CAMPAIGN_FILE_EXTENSION))
    }

    /// Return the matcher for `campaign`, loading it if absent or stale.
    ///
    /// Double-checked: a read-locked probe first, then a re-check and load
    /// under the write lock so a campaign is never built twice concurrently.
    pub fn get_matcher(&self, campaign: &str) -> CampaignResult<Arc<Matcher>> {
        validate_campaign_name(campaign)?;
        let path = self.path_for(campaign);
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();

        {
            let entries = self.entries.read();
            if let Some(entry) = entries.get(campaign) {
                if !entry.is_stale(modified) {
                    self.record_hit();
                    return Ok(entry.matcher.clone());
                }
            }
        }

        let mut entries = self.entries.write();

        // Another thread may have loaded or refreshed it meanwhile
        if let Some(entry) = entries.get(campaign) {
            if !entry.is_stale(modified) {
                self.record_hit();
                return Ok(entry.matcher.clone());
            }
            tracing::info!(campaign = %campaign, "Detected modification, reloading");
            entries.remove(campaign);
            self.record_eviction(EvictReason::Modified, entries.len());
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        metrics::record_cache_lookup(false);

        let matcher = match self.load(campaign, &path) {
            Ok(m) => Arc::new(m),
            Err(e) => {
                self.counters.load_failures.fetch_add(1, Ordering::Relaxed);
                metrics::record_campaign_load(false);
                tracing::warn!(campaign = %campaign, error = %e, "Failed to load campaign");
                return Err(e);
            }
        };

        entries.insert(
            campaign.to_string(),
            CacheEntry {
                matcher: matcher.clone(),
                modified,
            },
        );
        self.counters.loads.fetch_add(1, Ordering::Relaxed);
        metrics::record_campaign_load(true);
        metrics::record_cache_size(entries.len());

        tracing::info!(
            campaign = %campaign,
            path = ?path,
            stages = matcher.stages().len(),
            warnings = matcher.warnings().len(),
            "Loaded campaign"
        );

        Ok(matcher)
    }

    /// Classify `text` for `stage` of `campaign`.
    ///
    /// An unmatched utterance is not an error; it yields the unknown label.
    pub fn classify(&self, campaign: &str, stage: &str, text: &str) -> CampaignResult<String> {
        let matcher = self.get_matcher(campaign)?;
        Ok(matcher.process_stage(text, stage).to_string())
    }

    /// Drop one campaign. Returns whether it was cached.
    pub fn evict(&self, campaign: &str, reason: EvictReason) -> bool {
        let mut entries = self.entries.write();
        let removed = entries.remove(campaign).is_some();
        if removed {
            self.record_eviction(reason, entries.len());
            tracing::info!(
                campaign = %campaign,
                reason = reason.as_str(),
                "Campaign cache cleared, will reload on next request"
            );
        }
        removed
    }

    /// Drop every campaign. Returns how many were cached.
    pub fn evict_all(&self) -> usize {
        let mut entries = self.entries.write();
        let count = entries.len();
        entries.clear();
        for _ in 0..count {
            self.record_eviction(EvictReason::Admin, 0);
        }
        tracing::info!(count, "All campaign caches cleared");
        count
    }

    pub fn is_cached(&self, campaign: &str) -> bool {
        self.entries.read().contains_key(campaign)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Describe every cached campaign, ordered by name.
    pub fn snapshot(&self) -> Vec<CampaignSnapshot> {
        let entries = self.entries.read();
        let mut campaigns: Vec<CampaignSnapshot> = entries
            .iter()
            .map(|(name, entry)| CampaignSnapshot {
                campaign: name.clone(),
                loaded_at: unix_millis(entry.matcher.loaded_at()),
                file_path: entry.matcher.source_path().display().to_string(),
                stages: entry.matcher.stages(),
                warnings: entry.matcher.warnings().len(),
            })
            .collect();
        campaigns.sort_by(|a, b| a.campaign.cmp(&b.campaign));
        campaigns
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            loads: self.counters.loads.load(Ordering::Relaxed),
            load_failures: self.counters.load_failures.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
        }
    }

    fn load(&self, campaign: &str, path: &Path) -> CampaignResult<Matcher> {
        let bytes = fs::read(path).map_err(|source| CampaignError::Unavailable {
            campaign: campaign.to_string(),
            path: path.to_path_buf(),
            source,
        })?;

        Matcher::from_slice(&bytes, path, &self.options).map_err(|source| CampaignError::Parse {
            campaign: campaign.to_string(),
            path: path.to_path_buf(),
            source,
        })
    }

    fn record_hit(&self) {
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        metrics::record_cache_lookup(true);
    }

    fn record_eviction(&self, reason: EvictReason, remaining: usize) {
        self.counters.evictions.fetch_add(1, Ordering::Relaxed);
        metrics::record_eviction(reason.as_str());
        metrics::record_cache_size(remaining);
    }
}

/// Campaign ids become file names; reject anything that could escape the
/// keywords directory.
fn validate_campaign_name(campaign: &str) -> CampaignResult<()> {
    let invalid = campaign.is_empty()
        || campaign == "."
        || campaign == ".."
        || campaign.contains(['/', '\\', '\0']);
    if invalid {
        return Err(CampaignError::InvalidName(campaign.to_string()));
    }
    Ok(())
}

/// Milliseconds since the Unix epoch, 0 for earlier times.
pub fn unix_millis(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
