//! Declarative availability: union of inclusions minus union of exclusions.
//!
//! Recomputed from the source rules on every call; nothing is cached.

use crate::error::Result;
use crate::intervals::Intervals;
use crate::recurrence::{RuleKind, TaggedRule};

/// Expand every tagged rule and subtract the exclusions from the inclusions.
///
/// The result is sorted and pairwise disjoint but not clipped to any window.
///
/// # Errors
/// Propagates the first expansion failure; no partial result is returned.
pub fn calculate_intervals(rules: &[TaggedRule]) -> Result<Intervals> {
    let mut inclusion = Intervals::new();
    let mut exclusion = Intervals::new();

    for tagged in rules {
        let occurrences = tagged.rule.get_intervals()?;
        match tagged.kind {
            RuleKind::Inclusion => inclusion.extend(occurrences),
            RuleKind::Exclusion => exclusion.extend(occurrences),
        }
    }

    let inclusion = inclusion.prepare_united();
    let exclusion = exclusion.prepare_united();
    tracing::debug!(
        rules = rules.len(),
        inclusion = inclusion.len(),
        exclusion = exclusion.len(),
        "calculating availability"
    );

    Ok(inclusion.passed_intervals(&exclusion))
}
