//! Per-campaign classifier.
//!
//! # Responsibilities
//! - Build stage buckets from a campaign's JSON object
//! - Classify an utterance for a stage: hardcoded tier, then priority groups
//! - Expose build warnings and per-stage summaries for introspection
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Buckets and keywords are scanned in source order, so ties are reproducible
//! - Classification never fails; no match yields [`UNKNOWN_LABEL`]

use serde::Serialize;
use serde_json::{Map, Value};
use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

use crate::matching::category::{
    build_keyword_entries, keyword_strings, parse_category_key, CategoryInfo, KeywordEntry,
};
use crate::matching::normalize::normalize;
use crate::matching::tokenize::tokenize;

/// Label returned when no category of the stage matches.
pub const UNKNOWN_LABEL: &str = "unknown";

const DNQ_BASE_NAME: &str = "dnq";

/// Build-time options shared by every campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOptions {
    /// Stages where a bare "no" falls back to the stage's `dnq` category.
    pub dnq_fallback_stages: Vec<String>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            dnq_fallback_stages: vec!["s3".to_string(), "s4".to_string()],
        }
    }
}

/// Non-fatal anomaly found while building a matcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildWarning {
    /// Key does not follow `<base>_<hardcoded|pN>_<sN>`.
    #[error("could not parse category key '{key}'")]
    MalformedKey { key: String },

    /// Value is neither a string, an array nor an object.
    #[error("unsupported keyword value for '{key}', treated as empty")]
    UnsupportedShape { key: String },

    /// Keyword pattern failed to compile.
    #[error("keyword '{keyword}' of '{key}' rejected: {reason}")]
    PatternRejected {
        key: String,
        keyword: String,
        reason: String,
    },
}

/// Which comparison produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    /// Keyword equals the whole normalized utterance.
    Exact,
    /// Keyword equals one of the utterance's n-grams.
    Phrase,
    /// Keyword found inside the utterance on word boundaries.
    Substring,
}

/// Result of classifying one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// A keyword of `category` matched.
    Matched {
        category: &'a CategoryInfo,
        keyword: &'a str,
        tier: MatchTier,
    },
    /// Bare "no" routed to the stage's `dnq` category.
    Fallback { category: &'a CategoryInfo },
    /// Nothing matched, or the stage is not configured.
    Unknown,
}

impl<'a> Classification<'a> {
    /// The label to report: the category label or [`UNKNOWN_LABEL`].
    pub fn label(&self) -> &'a str {
        match *self {
            Classification::Matched { category, .. } | Classification::Fallback { category } => {
                &category.label
            }
            Classification::Unknown => UNKNOWN_LABEL,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Classification::Unknown)
    }
}

/// Category counts for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageSummary {
    pub hardcoded_categories: usize,
    pub prioritized_categories: usize,
}

#[derive(Debug, Clone)]
struct CategoryBucket {
    info: CategoryInfo,
    keywords: Vec<KeywordEntry>,
}

#[derive(Debug, Default)]
struct StageBucket {
    hardcoded: Vec<CategoryBucket>,
    /// Ascending by priority; source order among equal priorities.
    prioritized: Vec<CategoryBucket>,
}

struct Candidate<'a> {
    bucket: &'a CategoryBucket,
    keyword: &'a KeywordEntry,
    tier: MatchTier,
    len: usize,
}

impl<'a> Candidate<'a> {
    fn into_classification(self) -> Classification<'a> {
        Classification::Matched {
            category: &self.bucket.info,
            keyword: self.keyword.text(),
            tier: self.tier,
        }
    }
}

/// Immutable classifier for one campaign.
#[derive(Debug)]
pub struct Matcher {
    stages: HashMap<String, StageBucket>,
    dnq_fallback_stages: HashSet<String>,
    warnings: Vec<BuildWarning>,
    loaded_at: SystemTime,
    source_path: PathBuf,
}

impl Matcher {
    /// Build a matcher from a campaign's parsed JSON object.
    ///
    /// Malformed keys and unsupported values are recorded as warnings and
    /// skipped; building itself never fails.
    pub fn build(
        raw: &Map<String, Value>,
        source_path: impl Into<PathBuf>,
        options: &MatchOptions,
    ) -> Self {
        let source_path = source_path.into();
        let mut stages: HashMap<String, StageBucket> = HashMap::new();
        let mut warnings = Vec::new();

        for (key, value) in raw {
            let Some(info) = parse_category_key(key) else {
                tracing::warn!(key = %key, path = ?source_path, "Could not parse category name");
                warnings.push(BuildWarning::MalformedKey { key: key.clone() });
                continue;
            };

            let raw_keywords = match keyword_strings(value) {
                Some(k) => k,
                None => {
                    tracing::warn!(key = %key, "Unsupported keyword value, treating as empty");
                    warnings.push(BuildWarning::UnsupportedShape { key: key.clone() });
                    Vec::new()
                }
            };

            let (keywords, rejected) = build_keyword_entries(&raw_keywords);
            warnings.extend(rejected.into_iter().map(|(keyword, e)| {
                BuildWarning::PatternRejected {
                    key: key.clone(),
                    keyword,
                    reason: e.to_string(),
                }
            }));

            let stage = stages.entry(info.stage.clone()).or_default();
            let bucket = CategoryBucket { info, keywords };
            if bucket.info.is_hardcoded {
                stage.hardcoded.push(bucket);
            } else {
                stage.prioritized.push(bucket);
            }
        }

        for (name, stage) in stages.iter_mut() {
            // sort_by_key is stable: source order survives among equal priorities
            stage.prioritized.sort_by_key(|b| b.info.priority);
            tracing::debug!(
                stage = %name,
                hardcoded = stage.hardcoded.len(),
                prioritized = stage.prioritized.len(),
                "Loaded stage"
            );
        }

        Self {
            stages,
            dnq_fallback_stages: options.dnq_fallback_stages.iter().cloned().collect(),
            warnings,
            loaded_at: SystemTime::now(),
            source_path,
        }
    }

    /// Parse campaign JSON bytes and build a matcher.
    pub fn from_slice(
        bytes: &[u8],
        source_path: impl Into<PathBuf>,
        options: &MatchOptions,
    ) -> Result<Self, serde_json::Error> {
        let raw: Map<String, Value> = serde_json::from_slice(bytes)?;
        Ok(Self::build(&raw, source_path, options))
    }

    /// Classify an utterance for a stage.
    pub fn classify<'a>(&'a self, text: &str, stage: &str) -> Classification<'a> {
        let Some(bucket) = self.stages.get(stage) else {
            return Classification::Unknown;
        };

        let normalized = normalize(text);
        let tokens = OnceCell::new();

        if let Some(found) = best_match(&normalized, &tokens, &bucket.hardcoded) {
            return found.into_classification();
        }

        for group in bucket.prioritized.chunk_by(|a, b| a.info.priority == b.info.priority) {
            if let Some(found) = best_match(&normalized, &tokens, group) {
                return found.into_classification();
            }
        }

        if self.dnq_fallback_stages.contains(stage) && is_bare_no(&normalized) {
            if let Some(dnq) = bucket
                .prioritized
                .iter()
                .find(|b| b.info.base_name == DNQ_BASE_NAME)
            {
                return Classification::Fallback { category: &dnq.info };
            }
        }

        Classification::Unknown
    }

    /// Classify and return only the label.
    pub fn process_stage(&self, text: &str, stage: &str) -> &str {
        self.classify(text, stage).label()
    }

    /// Whether any category is configured for `stage`.
    pub fn has_stage(&self, stage: &str) -> bool {
        self.stages.contains_key(stage)
    }

    /// Category counts per stage, ordered by stage name.
    pub fn stages(&self) -> BTreeMap<String, StageSummary> {
        self.stages
            .iter()
            .map(|(name, bucket)| {
                (
                    name.clone(),
                    StageSummary {
                        hardcoded_categories: bucket.hardcoded.len(),
                        prioritized_categories: bucket.prioritized.len(),
                    },
                )
            })
            .collect()
    }

    /// Anomalies skipped while building.
    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    pub fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }
}

fn is_bare_no(normalized: &str) -> bool {
    normalized == "no" || normalized.starts_with("no ")
}

/// Tiered comparison over one group of buckets.
///
/// Exact matches short-circuit in scan order. Otherwise phrase and substring
/// candidates share one pool where a strictly longer keyword replaces the
/// current best.
fn best_match<'a>(
    normalized: &str,
    tokens: &OnceCell<Vec<String>>,
    buckets: &'a [CategoryBucket],
) -> Option<Candidate<'a>> {
    for bucket in buckets {
        if let Some(keyword) = bucket.keywords.iter().find(|k| k.text() == normalized) {
            return Some(Candidate {
                bucket,
                keyword,
                tier: MatchTier::Exact,
                len: keyword.text().chars().count(),
            });
        }
    }

    let tokens = tokens.get_or_init(|| tokenize(normalized));
    let mut best: Option<Candidate<'a>> = None;
    let mut consider = |bucket: &'a CategoryBucket, keyword: &'a KeywordEntry, tier: MatchTier| {
        let len = keyword.text().chars().count();
        if best.as_ref().map_or(true, |b| len > b.len) {
            best = Some(Candidate {
                bucket,
                keyword,
                tier,
                len,
            });
        }
    };

    for bucket in buckets {
        for keyword in &bucket.keywords {
            if tokens.iter().any(|t| t == keyword.text()) {
                consider(bucket, keyword, MatchTier::Phrase);
            }
        }
        for keyword in &bucket.keywords {
            if keyword.is_match_in(normalized) {
                consider(bucket, keyword, MatchTier::Substring);
            }
        }
    }

    best
}
