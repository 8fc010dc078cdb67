//! Ordered first-match-wins rule tables.
//!
//! Every evaluator is a [`RuleSet`]: a static slice of named
//! predicate/builder pairs plus a fallback. The order of the slice is the
//! clinical priority order, so it can be asserted on directly in tests.

use tracing::debug;

use crate::{decision::DecisionResult, stage::Stage};

/// One named branch of an evaluator
pub struct Rule<I> {
    pub name: &'static str,
    pub when: fn(&I) -> bool,
    pub then: fn(&I) -> DecisionResult,
}

/// Priority-ordered rules for one stage
pub struct RuleSet<I: 'static> {
    pub stage: Stage,
    pub rules: &'static [Rule<I>],
    pub fallback_name: &'static str,
    pub fallback: fn(&I) -> DecisionResult,
}

impl<I: 'static> RuleSet<I> {
    /// Run the rules in order and build the result of the first one that applies
    pub fn evaluate(&self, input: &I) -> DecisionResult {
        match self.rules.iter().find(|rule| (rule.when)(input)) {
            Some(rule) => {
                debug!(stage = %self.stage, rule = rule.name, "rule selected");
                (rule.then)(input)
            }
            None => {
                debug!(stage = %self.stage, rule = self.fallback_name, "no rule matched, using fallback");
                (self.fallback)(input)
            }
        }
    }

    /// Name of the rule that would fire for `input`
    pub fn matching_rule(&self, input: &I) -> &'static str {
        self.rules
            .iter()
            .find(|rule| (rule.when)(input))
            .map(|rule| rule.name)
            .unwrap_or(self.fallback_name)
    }

    /// Rule names in evaluation order, fallback last
    pub fn names(&self) -> Vec<&'static str> {
        self.rules
            .iter()
            .map(|rule| rule.name)
            .chain(std::iter::once(self.fallback_name))
            .collect()
    }
}
