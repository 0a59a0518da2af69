use std::collections::HashMap;
use std::time::Instant;

use super::{check_rules, log_start, run_pass, Agenda, Everything, Listeners, RulesEngine};
use crate::{
    EngineError, Facts, FiringReport, Rule, RuleListener, RuleSet, RulesEngineListener,
    RulesEngineParameters,
};

/// Fires rules round after round until a round fires nothing.
///
/// Each round is one ordered pass, as in
/// [`DefaultRulesEngine`](super::DefaultRulesEngine). By default a rule that
/// has fired is fired again only once some other write has changed the facts
/// after its own actions ran, so a rule never re-triggers on its own changes
/// alone. [`RulesEngineParameters::refraction`] turns that off, and every
/// round then re-evaluates every rule. Rules whose actions keep changing
/// each other's facts can still cycle forever; set
/// [`RulesEngineParameters::max_rounds`] to bound that.
///
/// # Example
///
/// ```
/// use rulekit::{Facts, InferenceRulesEngine, RuleBuilder, RuleSet, RulesEngine};
///
/// let mut rules = RuleSet::new();
/// rules.register(
///     RuleBuilder::new("second")
///         .priority(1)
///         .when(|f: &Facts| f.contains("first"))
///         .then(|f: &mut Facts| {
///             f.put("second", true);
///             Ok(())
///         })
///         .build(),
/// );
/// rules.register(
///     RuleBuilder::new("first")
///         .priority(2)
///         .when(|_: &Facts| true)
///         .then(|f: &mut Facts| {
///             f.put("first", true);
///             Ok(())
///         })
///         .build(),
/// );
///
/// let mut facts = Facts::new();
/// let report = InferenceRulesEngine::new().fire(&mut rules, &mut facts).unwrap();
/// // "first" fires again in round two because "second" changed the facts.
/// assert_eq!(report.fired(), vec!["first", "second", "first"]);
/// assert_eq!(report.rounds(), 3);
/// ```
#[derive(Default)]
pub struct InferenceRulesEngine {
    parameters: RulesEngineParameters,
    listeners: Listeners,
}

/// Remembers the fact revision each rule left behind when it last fired.
#[derive(Debug, Default)]
struct Refraction {
    fired_at: HashMap<String, u64>,
}

impl Agenda for Refraction {
    fn admits(&self, rule: &dyn Rule, facts: &Facts) -> bool {
        self.fired_at.get(rule.name()) != Some(&facts.revision())
    }

    fn fired(&mut self, rule: &dyn Rule, facts: &Facts) {
        self.fired_at.insert(rule.name().to_owned(), facts.revision());
    }
}

impl InferenceRulesEngine {
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

impl RulesEngine for InferenceRulesEngine {
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

        let mut refraction = Refraction::default();
        let mut everything = Everything;
        let agenda: &mut dyn Agenda = if self.parameters.uses_refraction() {
            &mut refraction
        } else {
            &mut everything
        };
        let mut passes = Vec::new();
        loop {
            let round = passes.len() + 1;
            rules.sort();
            let pass = run_pass(rules, facts, &self.parameters, &self.listeners, &mut *agenda)?;
            let fired = pass.fired_count();
            tracing::info!(round, fired, "inference round complete");
            passes.push(pass);
            if fired == 0 {
                break;
            }
            // Every pass so far fired something.
            if let Some(limit) = self.parameters.round_limit() {
                if passes.len() > limit {
                    tracing::error!(limit, "no fixpoint within the round limit");
                    return Err(EngineError::RoundLimitExceeded { limit });
                }
            }
        }

        self.listeners.after_rules(rules, facts);
        Ok(FiringReport::new(passes, start.elapsed()))
    }

    fn check(&self, rules: &mut RuleSet, facts: &Facts) -> Result<Vec<(String, bool)>, EngineError> {
        self.listeners.before_rules(rules, facts);
        rules.sort();
        let results = check_rules(rules, facts, &self.listeners)?;
        self.listeners.after_rules(rules, facts);
        Ok(results)
    }
}
