//! Hooks deciding whether a taxonomy or a segment is evaluated.
//!
//! Pre-taxonomy hooks run once per taxonomy before any segment is consumed, pre-segment hooks run
//! once for every segment. Every hook registered for a tier is run for each unit and its result is
//! recorded under the identifier of the unit. The most severe result decides what happens next:
//!
//!   - [`EvaluationHookResult::Ok`] evaluates the unit,
//!   - [`EvaluationHookResult::Skip`] leaves out this unit only,
//!   - [`EvaluationHookResult::Cancel`] leaves out this unit and every remaining one of its tier.
//!     Taxonomies accepted before a cancel still consume segments, and the post-evaluation steps
//!     still run,
//!   - [`EvaluationHookResult::Abort`] stops the evaluation immediately with an
//!     [`EvaluationError::Aborted`] error.
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EvaluationError;

/// Outcome of a hook, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationHookResult {
    #[default]
    Ok,
    Skip,
    Cancel,
    Abort,
}

/// Hook results of every evaluated unit, keyed by unit identifier and then by hook identifier.
pub type HookResults = BTreeMap<String, BTreeMap<String, EvaluationHookResult>>;

/// A named check run before a unit of type `U` is evaluated.
pub struct EvaluationHook<U> {
    identifier: String,
    check: Box<dyn Fn(&U) -> EvaluationHookResult>,
}

impl<U> EvaluationHook<U> {
    pub fn new<F>(identifier: impl Into<String>, check: F) -> Self
    where
        F: Fn(&U) -> EvaluationHookResult + 'static,
    {
        Self {
            identifier: identifier.into(),
            check: Box::new(check),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn check(&self, unit: &U) -> EvaluationHookResult {
        (self.check)(unit)
    }
}

impl<U> Debug for EvaluationHook<U> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EvaluationHook").field(&self.identifier).finish()
    }
}

/// Run every hook against a unit and record the results.
///
/// Returns the most severe result, or an error if any hook aborted the evaluation.
pub(crate) fn apply_hooks<U>(
    hooks: &[EvaluationHook<U>],
    unit_identifier: &str,
    unit: &U,
    records: &mut HookResults,
) -> Result<EvaluationHookResult, EvaluationError> {
    if hooks.is_empty() {
        return Ok(EvaluationHookResult::Ok);
    }

    let results: BTreeMap<String, EvaluationHookResult> = hooks
        .iter()
        .map(|hook| (hook.identifier.clone(), hook.check(unit)))
        .collect();

    let outcome = results.values().copied().max().unwrap_or_default();
    let aborting: Vec<String> = results
        .iter()
        .filter(|(_, result)| **result == EvaluationHookResult::Abort)
        .map(|(hook, _)| hook.clone())
        .collect();

    records.insert(unit_identifier.to_string(), results);

    match outcome {
        EvaluationHookResult::Ok => debug!(unit = unit_identifier, "Hooks passed"),
        EvaluationHookResult::Skip => warn!(unit = unit_identifier, "Skipping evaluation"),
        EvaluationHookResult::Cancel => warn!(unit = unit_identifier, "Cancelling remaining evaluation"),
        EvaluationHookResult::Abort => {
            return Err(EvaluationError::Aborted {
                unit: unit_identifier.to_string(),
                hooks: aborting,
            })
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::{apply_hooks, EvaluationHook, EvaluationHookResult, HookResults};
    use crate::error::EvaluationError;

    fn at_least(length: usize, result: EvaluationHookResult) -> EvaluationHook<Vec<u32>> {
        EvaluationHook::new(format!("at least {length}"), move |unit: &Vec<u32>| {
            if unit.len() >= length {
                EvaluationHookResult::Ok
            } else {
                result
            }
        })
    }

    #[test]
    fn most_severe_result_wins() -> Result<(), EvaluationError> {
        let hooks = vec![at_least(2, EvaluationHookResult::Skip), at_least(3, EvaluationHookResult::Cancel)];
        let mut records = HookResults::new();

        assert_eq!(apply_hooks(&hooks, "a", &vec![1, 2, 3], &mut records)?, EvaluationHookResult::Ok);
        assert_eq!(apply_hooks(&hooks, "b", &vec![1, 2], &mut records)?, EvaluationHookResult::Cancel);
        assert_eq!(apply_hooks(&hooks, "c", &vec![1], &mut records)?, EvaluationHookResult::Cancel);

        assert_eq!(records["b"]["at least 2"], EvaluationHookResult::Ok);
        assert_eq!(records["b"]["at least 3"], EvaluationHookResult::Cancel);
        assert_eq!(records["c"]["at least 2"], EvaluationHookResult::Skip);
        Ok(())
    }

    #[test]
    fn abort_lists_every_aborting_hook() {
        let hooks = vec![
            at_least(2, EvaluationHookResult::Abort),
            at_least(3, EvaluationHookResult::Abort),
            at_least(1, EvaluationHookResult::Abort),
        ];
        let mut records = HookResults::new();

        match apply_hooks(&hooks, "s1", &vec![7], &mut records) {
            Err(EvaluationError::Aborted { unit, hooks }) => {
                assert_eq!(unit, "s1");
                assert_eq!(hooks, vec!["at least 2".to_string(), "at least 3".to_string()]);
            }
            other => panic!("expected an abort, got {other:?}"),
        }

        assert_eq!(records["s1"].len(), 3);
    }

    #[test]
    fn no_hooks_records_nothing() -> Result<(), EvaluationError> {
        let mut records = HookResults::new();
        let hooks: Vec<EvaluationHook<Vec<u32>>> = Vec::new();

        assert_eq!(apply_hooks(&hooks, "a", &Vec::new(), &mut records)?, EvaluationHookResult::Ok);
        assert!(records.is_empty());
        Ok(())
    }
}
