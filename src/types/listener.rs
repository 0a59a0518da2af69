use super::error::{ActionError, EvaluationError};
use super::facts::Facts;
use super::rule::Rule;
use super::ruleset::RuleSet;

/// Hooks around each rule an engine visits. Every method has a no-op default.
pub trait RuleListener {
    /// Called before a rule is evaluated. Returning `false` skips the rule.
    fn before_evaluate(&self, _rule: &dyn Rule, _facts: &Facts) -> bool {
        true
    }

    fn after_evaluate(&self, _rule: &dyn Rule, _facts: &Facts, _triggered: bool) {}

    fn on_evaluation_error(&self, _rule: &dyn Rule, _facts: &Facts, _error: &EvaluationError) {}

    fn before_execute(&self, _rule: &dyn Rule, _facts: &Facts) {}

    fn on_success(&self, _rule: &dyn Rule, _facts: &Facts) {}

    fn on_failure(&self, _rule: &dyn Rule, _facts: &Facts, _error: &ActionError) {}
}

/// Hooks around a whole firing call. Every method has a no-op default.
pub trait RulesEngineListener {
    fn before_evaluate(&self, _rules: &RuleSet, _facts: &Facts) {}

    fn after_execute(&self, _rules: &RuleSet, _facts: &Facts) {}
}
