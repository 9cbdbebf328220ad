//! Symbol rewriting.

use crate::rules::{RuleDefinition, RuleSet, WeightedAlternative};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Diagnostics gathered while regenerating.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionStats {
    /// Number of symbols in the expanded sentence.
    pub symbol_count: usize,
    /// Wall-clock expansion time, rounded to milliseconds. `None` before the first run.
    pub expand_time_ms: Option<u64>,
    /// Number of draw commands produced by the last interpretation.
    pub branch_count: usize,
}

/// Rewrites `axiom` `iterations` times.
///
/// Each symbol is replaced by its fixed rule, by a weighted pick (re-rolled per
/// occurrence) or by itself when it has no rule or a passthrough rule.
/// `iterations == 0` returns the axiom unchanged. Growth is not bounded here.
pub fn expand<R: Rng + ?Sized>(
    axiom: &str,
    rules: &RuleSet,
    iterations: u32,
    rng: &mut R,
) -> String {
    let mut current = axiom.to_owned();
    for _ in 0..iterations {
        let mut next = String::with_capacity(current.len() * 2);
        for symbol in current.chars() {
            match rules.get(symbol).filter(|rule| !rule.is_passthrough()) {
                Some(RuleDefinition::Fixed(text)) => next.push_str(text),
                Some(RuleDefinition::Weighted(alternatives)) => {
                    next.push_str(pick_weighted(alternatives, rng))
                }
                None => next.push(symbol),
            }
        }
        current = next;
    }
    current
}

/// Picks one alternative proportionally to its weight.
///
/// Negative weights count as zero. When the total weight is not positive the
/// first alternative is returned without consuming randomness.
pub fn pick_weighted<'a, R: Rng + ?Sized>(
    alternatives: &'a [WeightedAlternative],
    rng: &mut R,
) -> &'a str {
    let Some(first) = alternatives.first() else {
        return "";
    };
    let total: f64 = alternatives.iter().map(|alt| alt.weight.max(0.0)).sum();
    if !(total > 0.0 && total.is_finite()) {
        return &first.value;
    }

    let target = rng.r#gen::<f64>() * total;
    let mut accumulated = 0.0;
    for alt in alternatives {
        accumulated += alt.weight.max(0.0);
        if target < accumulated {
            return &alt.value;
        }
    }
    alternatives.last().map_or(&first.value, |alt| &alt.value)
}
