use std::time::Instant;

use super::{check_rules, log_start, run_pass, Everything, Listeners, RulesEngine};
use crate::{
    EngineError, Facts, FiringReport, RuleListener, RuleSet, RulesEngineListener,
    RulesEngineParameters,
};

/// Fires rules in one ordered pass.
///
/// Rules are visited in ascending priority (ties by name). Each rule whose
/// condition holds is executed immediately, so its changes are visible to
/// the rules after it. A failing action is recorded and the pass moves on,
/// unless a skip policy says otherwise.
///
/// # Example
///
/// ```
/// use rulekit::{DefaultRulesEngine, Facts, RuleBuilder, RuleSet, RulesEngine};
///
/// let mut rules = RuleSet::new();
/// rules.register(
///     RuleBuilder::new("greet")
///         .when(|f: &Facts| f.contains("name"))
///         .then(|f: &mut Facts| {
///             f.put("greeted", true);
///             Ok(())
///         })
///         .build(),
/// );
///
/// let mut facts = Facts::new().set("name", "ada");
/// let report = DefaultRulesEngine::new().fire(&mut rules, &mut facts).unwrap();
/// assert_eq!(report.fired(), vec!["greet"]);
/// assert!(facts.contains("greeted"));
/// ```
#[derive(Default)]
pub struct DefaultRulesEngine {
    parameters: RulesEngineParameters,
    listeners: Listeners,
}

impl DefaultRulesEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_parameters(parameters: RulesEngineParameters) -> Self {
        Self {
            parameters,
            listeners: Listeners::default(),
        }
    }

    pub fn register_rule_listener(&mut self, listener: impl RuleListener + 'static) {
        self.listeners.rule.push(Box::new(listener));
    }

    pub fn register_engine_listener(&mut self, listener: impl RulesEngineListener + 'static) {
        self.listeners.engine.push(Box::new(listener));
    }
}

impl RulesEngine for DefaultRulesEngine {
    fn parameters(&self) -> &RulesEngineParameters {
        &self.parameters
    }

    fn fire(&self, rules: &mut RuleSet, facts: &mut Facts) -> Result<FiringReport, EngineError> {
        let start = Instant::now();
        self.listeners.before_rules(rules, facts);
        if rules.is_empty() {
            tracing::warn!("no rules registered, nothing to apply");
            self.listeners.after_rules(rules, facts);
            return Ok(FiringReport::new(Vec::new(), start.elapsed()));
        }
        log_start(&self.parameters, rules, facts);
        rules.sort();

        let pass = run_pass(rules, facts, &self.parameters, &self.listeners, &mut Everything)?;
        tracing::info!(
            fired = pass.fired_count(),
            visited = pass.outcomes().len(),
            "rules fired"
        );
        self.listeners.after_rules(rules, facts);
        Ok(FiringReport::new(vec![pass], start.elapsed()))
    }

    fn check(&self, rules: &mut RuleSet, facts: &Facts) -> Result<Vec<(String, bool)>, EngineError> {
        self.listeners.before_rules(rules, facts);
        if rules.is_empty() {
            tracing::warn!("no rules registered, nothing to check");
            self.listeners.after_rules(rules, facts);
            return Ok(Vec::new());
        }
        rules.sort();
        let results = check_rules(rules, facts, &self.listeners)?;
        self.listeners.after_rules(rules, facts);
        Ok(results)
    }
}
