mod default;
mod inference;

pub use default::DefaultRulesEngine;
pub use inference::InferenceRulesEngine;

use crate::{
    EngineError, Facts, FiringReport, PassReport, Rule, RuleListener, RuleOutcome, RuleSet,
    RuleStatus, RulesEngineListener, RulesEngineParameters, StopReason,
};

/// Fires a [`RuleSet`] against [`Facts`].
///
/// Firing is synchronous: the call runs every pass to completion on the
/// caller's thread. Actions' changes to the facts are visible to every rule
/// evaluated after them.
pub trait RulesEngine {
    fn parameters(&self) -> &RulesEngineParameters;

    /// Fire the rules, re-sorting them first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if a condition cannot be evaluated or, for
    /// the inference engine, if the round limit is reached. Failing actions
    /// are recorded in the report instead.
    fn fire(&self, rules: &mut RuleSet, facts: &mut Facts) -> Result<FiringReport, EngineError>;

    /// Evaluate every rule without executing any, in rule order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Evaluation`] if a condition cannot be evaluated.
    fn check(&self, rules: &mut RuleSet, facts: &Facts) -> Result<Vec<(String, bool)>, EngineError>;
}

/// Decides which rules a pass may consider and learns which ones fired.
pub(crate) trait Agenda {
    fn admits(&self, rule: &dyn Rule, facts: &Facts) -> bool;

    fn fired(&mut self, rule: &dyn Rule, facts: &Facts);
}

/// Admits every rule.
pub(crate) struct Everything;

impl Agenda for Everything {
    fn admits(&self, _rule: &dyn Rule, _facts: &Facts) -> bool {
        true
    }

    fn fired(&mut self, _rule: &dyn Rule, _facts: &Facts) {}
}

/// Listeners shared by both engines.
#[derive(Default)]
pub(crate) struct Listeners {
    pub(crate) rule: Vec<Box<dyn RuleListener>>,
    pub(crate) engine: Vec<Box<dyn RulesEngineListener>>,
}

impl Listeners {
    pub(crate) fn before_rules(&self, rules: &RuleSet, facts: &Facts) {
        for listener in &self.engine {
            listener.before_evaluate(rules, facts);
        }
    }

    pub(crate) fn after_rules(&self, rules: &RuleSet, facts: &Facts) {
        for listener in &self.engine {
            listener.after_execute(rules, facts);
        }
    }

    fn should_evaluate(&self, rule: &dyn Rule, facts: &Facts) -> bool {
        self.rule.iter().all(|l| l.before_evaluate(rule, facts))
    }
}

pub(crate) fn log_start(params: &RulesEngineParameters, rules: &RuleSet, facts: &Facts) {
    tracing::debug!(parameters = %params, "engine parameters");
    tracing::debug!(rules = %rules, "registered rules");
    tracing::debug!(facts = facts.len(), revision = facts.revision(), "known facts");
}

/// One ordered pass over `rules`.
///
/// Stops at the first rule above the priority threshold, or when a skip
/// policy applies. Rules the agenda does not admit are passed over silently.
pub(crate) fn run_pass(
    rules: &RuleSet,
    facts: &mut Facts,
    params: &RulesEngineParameters,
    listeners: &Listeners,
    agenda: &mut dyn Agenda,
) -> Result<PassReport, EngineError> {
    let mut report = PassReport::default();

    for rule in rules.iter() {
        let name = rule.name();
        let priority = rule.priority();
        if priority > params.threshold() {
            tracing::debug!(
                rule = name,
                priority,
                threshold = params.threshold(),
                "priority threshold exceeded, skipping remaining rules"
            );
            report.stop(StopReason::PriorityThresholdExceeded {
                rule: name.to_owned(),
                priority,
            });
            break;
        }
        if !agenda.admits(rule, facts) {
            tracing::trace!(rule = name, "rule not on the agenda");
            continue;
        }
        if !listeners.should_evaluate(rule, facts) {
            tracing::debug!(rule = name, "rule evaluation vetoed by a listener");
            report.record(RuleOutcome::new(name, RuleStatus::Vetoed));
            continue;
        }

        let triggered = match rule.evaluate(facts) {
            Ok(triggered) => triggered,
            Err(source) => {
                tracing::error!(rule = name, error = %source, "rule evaluation failed");
                for listener in &listeners.rule {
                    listener.on_evaluation_error(rule, facts, &source);
                }
                return Err(EngineError::Evaluation {
                    rule: name.to_owned(),
                    source,
                });
            }
        };
        for listener in &listeners.rule {
            listener.after_evaluate(rule, facts, triggered);
        }

        if !triggered {
            tracing::debug!(rule = name, "rule evaluated to false");
            report.record(RuleOutcome::new(name, RuleStatus::NotTriggered));
            if params.skips_on_first_non_triggered() {
                tracing::debug!("next rules will be skipped since skip_on_first_non_triggered_rule is set");
                report.stop(StopReason::FirstNonTriggered {
                    rule: name.to_owned(),
                });
                break;
            }
            continue;
        }

        tracing::debug!(rule = name, "rule triggered");
        for listener in &listeners.rule {
            listener.before_execute(rule, facts);
        }
        match rule.execute(facts) {
            Ok(()) => {
                tracing::debug!(rule = name, "rule performed successfully");
                for listener in &listeners.rule {
                    listener.on_success(rule, facts);
                }
                agenda.fired(rule, facts);
                report.record(RuleOutcome::new(name, RuleStatus::Fired));
                if params.skips_on_first_applied() {
                    tracing::debug!("next rules will be skipped since skip_on_first_applied_rule is set");
                    report.stop(StopReason::FirstApplied {
                        rule: name.to_owned(),
                    });
                    break;
                }
            }
            Err(error) => {
                tracing::warn!(rule = name, error = %error, "rule performed with error");
                for listener in &listeners.rule {
                    listener.on_failure(rule, facts, &error);
                }
                report.record(RuleOutcome::new(name, RuleStatus::Failed(error)));
                if params.skips_on_first_failed() {
                    tracing::debug!("next rules will be skipped since skip_on_first_failed_rule is set");
                    report.stop(StopReason::FirstFailed {
                        rule: name.to_owned(),
                    });
                    break;
                }
            }
        }
    }

    Ok(report)
}

pub(crate) fn check_rules(
    rules: &RuleSet,
    facts: &Facts,
    listeners: &Listeners,
) -> Result<Vec<(String, bool)>, EngineError> {
    let mut results = Vec::with_capacity(rules.len());
    for rule in rules.iter() {
        if !listeners.should_evaluate(rule, facts) {
            continue;
        }
        let triggered = rule.evaluate(facts).map_err(|source| {
            for listener in &listeners.rule {
                listener.on_evaluation_error(rule, facts, &source);
            }
            EngineError::Evaluation {
                rule: rule.name().to_owned(),
                source,
            }
        })?;
        for listener in &listeners.rule {
            listener.after_evaluate(rule, facts, triggered);
        }
        results.push((rule.name().to_owned(), triggered));
    }
    Ok(results)
}
