//! Fuzzy matching of owner-defined user entries and variants.
//!
//! Builds an in-memory index at startup and rebuilds it whenever the
//! registry reloads (`ExtractorRegistry`-style atomic swap, see
//! `extract.rs`). Matching runs in two passes — full content, then
//! token-by-token on whitespace-split content — against both passes'
//! candidate strings, taking the best score per indexed entry.

use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::Arc;

use regex::Regex;
use uuid::Uuid;
use watchdog_types::enums::{Classification, PostureLevel};

/// One indexed candidate: either a `UserEntry`'s primary value (weight
/// 1.0) or one of its `Variant`s (weight 0.8). `classification` is the
/// owning `UserEntry`'s classification — a `Variant` has none of its
/// own and inherits its parent entry's.
#[derive(Debug, Clone)]
struct IndexEntry {
    entry_id: Uuid,
    text: String,
    weight: f64,
    classification: Classification,
}

/// In-memory fuzzy index, atomically swappable without blocking readers.
pub struct FuzzyIndex {
    entries: AtomicPtr<Vec<IndexEntry>>,
}

impl Default for FuzzyIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyIndex {
    pub fn new() -> Self {
        FuzzyIndex {
            entries: AtomicPtr::new(Box::into_raw(Box::new(Vec::new()))),
        }
    }

    /// Rebuilds the index from the registry's active user entries and
    /// variants, atomically swapping the old index out. Each tuple's
    /// `Classification` is the owning `UserEntry`'s classification.
    pub fn rebuild(
        &self,
        user_entries: &[(Uuid, String, Classification)],
        variants: &[(Uuid, String, Classification)],
    ) {
        let mut entries = Vec::with_capacity(user_entries.len() + variants.len());
        for (id, text, classification) in user_entries {
            entries.push(IndexEntry {
                entry_id: *id,
                text: text.clone(),
                weight: 1.0,
                classification: *classification,
            });
        }
        for (id, text, classification) in variants {
            entries.push(IndexEntry {
                entry_id: *id,
                text: text.clone(),
                weight: 0.8,
                classification: *classification,
            });
        }

        let new = Box::into_raw(Box::new(entries));
        let old = self.entries.swap(new, Ordering::AcqRel);
        // Safety: `old` was allocated by a previous `Box::into_raw` call
        // and no reader holds a reference past the swap (readers clone
        // what they need inside `matches`).
        unsafe {
            drop(Box::from_raw(old));
        }
    }

    fn snapshot(&self) -> Vec<IndexEntry> {
        let ptr = self.entries.load(Ordering::Acquire);
        unsafe { (*ptr).clone() }
    }
}

impl Drop for FuzzyIndex {
    fn drop(&mut self) {
        let ptr = self.entries.load(Ordering::Acquire);
        unsafe {
            drop(Box::from_raw(ptr));
        }
    }
}

/// A single fuzzy or exact match against an indexed entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub entry_id: Uuid,
    pub matched_text: String,
    pub confidence: f64,
    pub exact: bool,
    pub offset_start: usize,
    pub offset_end: usize,
    pub classification: Classification,
}

/// Fuzzy-match threshold coupled to the current posture level.
///
/// | Posture | Threshold |
/// |---------|-----------|
/// | GREEN   | 0.40      |
/// | YELLOW  | 0.50      |
/// | RED     | 0.60      |
/// | BLACK   | 0.60      |
pub fn fuzzy_threshold(posture: PostureLevel) -> f64 {
    match posture {
        PostureLevel::Green => 0.40,
        PostureLevel::Yellow => 0.50,
        PostureLevel::Red | PostureLevel::Black => 0.60,
    }
}

/// Runs both fuzzy-matching passes against `content` at the given
/// posture-derived threshold, plus tagged-literal extraction.
pub fn run_fuzzy_stage(index: &FuzzyIndex, content: &str, posture: PostureLevel) -> Vec<FuzzyMatch> {
    let threshold = fuzzy_threshold(posture);
    let entries = index.snapshot();

    let mut matches = full_content_pass(&entries, content, threshold);
    matches.extend(token_pass(&entries, content, threshold));
    matches.extend(tagged_literal_pass(content));
    matches
}

fn full_content_pass(entries: &[IndexEntry], content: &str, threshold: f64) -> Vec<FuzzyMatch> {
    entries
        .iter()
        .filter_map(|e| score_candidate(e, content, 0))
        .filter(|m| m.confidence >= threshold)
        .collect()
}

fn token_pass(entries: &[IndexEntry], content: &str, threshold: f64) -> Vec<FuzzyMatch> {
    let mut out = Vec::new();
    let mut cursor = 0usize;
    for token in content.split_whitespace() {
        let offset = content[cursor..]
            .find(token)
            .map(|i| cursor + i)
            .unwrap_or(cursor);
        for e in entries {
            if let Some(m) = score_candidate(e, token, offset) {
                if m.confidence >= threshold {
                    out.push(m);
                }
            }
        }
        cursor = offset + token.len();
    }
    out
}

/// Scores one candidate string against one indexed entry using
/// normalized edit distance, weighted by the entry's index weight.
fn score_candidate(entry: &IndexEntry, candidate: &str, offset_base: usize) -> Option<FuzzyMatch> {
    if candidate.is_empty() || entry.text.is_empty() {
        return None;
    }
    let similarity = strsim::normalized_levenshtein(&entry.text.to_lowercase(), &candidate.to_lowercase());
    let confidence = (similarity * entry.weight).min(1.0);
    let exact = (1.0 - similarity) >= 0.95 || similarity >= 0.999;

    Some(FuzzyMatch {
        entry_id: entry.entry_id,
        matched_text: candidate.to_string(),
        confidence,
        exact,
        offset_start: offset_base,
        offset_end: offset_base + candidate.len(),
        classification: entry.classification,
    })
}

/// Matches `[SENSITIVE:<type>:<value>]` tagged literals, which are
/// treated as confidence-1.00 exact matches cross-referenced against
/// the registry by type rather than by fuzzy score. Carries no real
/// `UserEntry`, so it is always classified NEVER_SHARE rather than
/// inheriting one.
fn tagged_literal_pass(content: &str) -> Vec<FuzzyMatch> {
    let re = Regex::new(r"\[SENSITIVE:([^:\]]+):([^\]]+)\]").expect("static tagged-literal regex");
    re.captures_iter(content)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            FuzzyMatch {
                entry_id: Uuid::nil(),
                matched_text: caps[1].to_string(),
                confidence: 1.00,
                exact: true,
                offset_start: whole.start(),
                offset_end: whole.end(),
                classification: Classification::NeverShare,
            }
        })
        .collect()
}

/// Marker type kept so callers can share a single `Arc<FuzzyIndex>`
/// across the gateway and inbound inspector without re-deriving
/// `Send + Sync` bounds at each call site.
pub type SharedFuzzyIndex = Arc<FuzzyIndex>;
