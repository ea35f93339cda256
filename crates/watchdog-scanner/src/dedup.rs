//! Deduplication of overlapping flags across all three stages.
//!
//! Sort by `offset_start` ascending, `confidence` descending; walk the
//! sorted list keeping a flag only if it doesn't overlap one already
//! kept. Ties within the same offset are broken by confidence, then by
//! severity (the caller passes a severity rank, since severity depends
//! on `Classification`, a registry-level concept the scanner itself
//! doesn't own).

use watchdog_types::model::ScanFlag;

/// Sorts and suppresses overlapping flags, keeping the
/// highest-confidence, most-severe, earliest-offset subset.
pub fn dedup_flags(mut flags: Vec<ScanFlag>) -> Vec<ScanFlag> {
    flags.sort_by(|a, b| {
        a.offset_start
            .cmp(&b.offset_start)
            .then(b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal))
            .then(a.effective_classification.cmp(&b.effective_classification))
    });

    let mut kept: Vec<ScanFlag> = Vec::with_capacity(flags.len());
    for flag in flags {
        let overlaps = kept
            .iter()
            .any(|k| flag.offset_start < k.offset_end && k.offset_start < flag.offset_end);
        if !overlaps {
            kept.push(flag);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use watchdog_types::enums::{Classification, ScanFlagSource};

    fn flag(start: usize, end: usize, confidence: f64, classification: Classification) -> ScanFlag {
        ScanFlag {
            id: Uuid::new_v4(),
            source: ScanFlagSource::Structural,
            entity_type: "TEST".to_string(),
            matched_text: "x".repeat(end - start),
            confidence,
            offset_start: start,
            offset_end: end,
            effective_classification: classification,
            registry_ref: None,
        }
    }

    #[test]
    fn non_overlapping_flags_are_all_kept() {
        let flags = vec![
            flag(0, 5, 0.9, Classification::NeverShare),
            flag(10, 15, 0.8, Classification::AskFirst),
        ];
        assert_eq!(dedup_flags(flags).len(), 2);
    }

    #[test]
    fn overlapping_flags_keep_only_the_higher_confidence_one() {
        let flags = vec![
            flag(0, 10, 0.6, Classification::AskFirst),
            flag(2, 8, 0.95, Classification::NeverShare),
        ];
        let kept = dedup_flags(flags);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].confidence, 0.95);
    }

    #[test]
    fn ties_broken_by_severity_when_confidence_equal() {
        let flags = vec![
            flag(0, 10, 0.8, Classification::InternalOnly),
            flag(0, 10, 0.8, Classification::NeverShare),
        ];
        let kept = dedup_flags(flags);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].effective_classification, Classification::NeverShare);
    }
}
