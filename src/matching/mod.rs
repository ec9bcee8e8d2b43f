//! Keyword matching subsystem.
//!
//! # Data Flow
//! ```text
//! Campaign JSON object (key → keywords)
//!     → category.rs (parse "<base>_<hardcoded|pN>_<sN>" keys, compile keywords)
//!     → matcher.rs (route into stage buckets, sort by priority)
//!     → Freeze as immutable Matcher
//!
//! classify(text, stage):
//!     → normalize.rs (NFKD, whitespace, lowercase, contractions)
//!     → hardcoded tier
//!     → priority groups, ascending (tokenize.rs for phrase matching)
//!     → legacy "no" → DNQ fallback
//!     → label or "unknown"
//! ```
//!
//! # Design Decisions
//! - Matchers are built once and never mutated; readers need no locking
//! - Keywords are matched literally (escaped), never as user regex
//! - Source key order is preserved so equal-priority ties are reproducible
//! - Longer matched keyword wins across phrase and substring tiers

pub mod category;
pub mod matcher;
pub mod normalize;
pub mod tokenize;

pub use category::{parse_category_key, CategoryInfo, KeywordEntry};
pub use matcher::{
    BuildWarning, Classification, MatchOptions, MatchTier, Matcher, StageSummary, UNKNOWN_LABEL,
};
pub use normalize::normalize;
pub use tokenize::tokenize;
