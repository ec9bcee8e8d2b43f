//! Campaign cache subsystem.
//!
//! # Data Flow
//! ```text
//! get_matcher(campaign)
//!     → stat <keywords_dir>/<campaign>.json
//!     → read lock: fresh entry? return Arc<Matcher>
//!     → write lock: re-check, evict if modified
//!     → read + parse + build (under the write lock)
//!     → publish fully-built Arc<Matcher>
//!
//! config/watcher.rs (create/modify event)
//!     → settle delay
//!     → evict(campaign); reload deferred to next lookup
//! ```
//!
//! # Design Decisions
//! - One coarse RwLock for the whole map: at most one build in flight per
//!   process, unrelated loads are serialized
//! - Entries are replaced wholesale, never mutated; handed-out matchers stay valid
//! - Cache is an explicit object owned by the server, not a global

pub mod cache;
pub mod error;

pub use cache::{CacheStats, CampaignCache, CampaignSnapshot, EvictReason};
pub use error::{CampaignError, CampaignResult};
