//! Precedence combination of the top-level decision and every per-flag
//! decision into a single verdict: `Block` beats `Escalate` beats
//! `FalsePositive`, most-restrictive wins. A combined confidence under the
//! configured floor forces escalation regardless of what won on restriction
//! alone — a classifier that is unsure should hand off to a human rather
//! than act on a guess.

use watchdog_types::bridges::ClassifierDecision;

use crate::wire::{ClassifierOutput, RawDecision};

fn rank(decision: RawDecision) -> u8 {
    match decision {
        RawDecision::Block => 2,
        RawDecision::Escalate => 1,
        RawDecision::FalsePositive => 0,
    }
}

fn to_bridge(decision: RawDecision) -> ClassifierDecision {
    match decision {
        RawDecision::Block => ClassifierDecision::Block,
        RawDecision::Escalate => ClassifierDecision::Escalate,
        RawDecision::FalsePositive => ClassifierDecision::FalsePositive,
    }
}

/// Returns the most restrictive decision across `output.decision` and every
/// `output.flags[].decision`, combined with `output.confidence`, then forces
/// `Escalate` with confidence `0.0` if that confidence falls under
/// `min_confidence`.
pub fn combine(output: &ClassifierOutput, min_confidence: f64) -> (ClassifierDecision, f64) {
    let most_restrictive = output
        .flags
        .iter()
        .map(|f| f.decision)
        .fold(output.decision, |acc, d| if rank(d) > rank(acc) { d } else { acc });

    if output.confidence < min_confidence {
        return (ClassifierDecision::Escalate, output.confidence);
    }

    (to_bridge(most_restrictive), output.confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::FlagJudgment;

    fn output(decision: RawDecision, flags: Vec<FlagJudgment>, confidence: f64) -> ClassifierOutput {
        ClassifierOutput { decision, flags, confidence, reasoning: "test".to_string() }
    }

    #[test]
    fn a_blocking_flag_overrides_an_escalate_top_level() {
        let out = output(
            RawDecision::Escalate,
            vec![FlagJudgment { flag_id: "f1".into(), decision: RawDecision::Block, reasoning: "x".into() }],
            0.9,
        );
        let (decision, _) = combine(&out, 0.7);
        assert_eq!(decision, ClassifierDecision::Block);
    }

    #[test]
    fn false_positive_flags_never_downgrade_a_blocking_top_level() {
        let out = output(
            RawDecision::Block,
            vec![FlagJudgment { flag_id: "f1".into(), decision: RawDecision::FalsePositive, reasoning: "x".into() }],
            0.9,
        );
        let (decision, _) = combine(&out, 0.7);
        assert_eq!(decision, ClassifierDecision::Block);
    }

    #[test]
    fn low_confidence_forces_escalate_even_when_clean() {
        let out = output(RawDecision::FalsePositive, vec![], 0.4);
        let (decision, confidence) = combine(&out, 0.7);
        assert_eq!(decision, ClassifierDecision::Escalate);
        assert_eq!(confidence, 0.4);
    }

    #[test]
    fn all_false_positive_and_confident_passes_through() {
        let out = output(RawDecision::FalsePositive, vec![], 0.95);
        let (decision, _) = combine(&out, 0.7);
        assert_eq!(decision, ClassifierDecision::FalsePositive);
    }
}
