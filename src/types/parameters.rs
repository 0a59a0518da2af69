use std::fmt;

/// Engine configuration. The defaults evaluate every eligible rule and never
/// stop a pass early.
///
/// # Example
///
/// ```
/// use rulekit::RulesEngineParameters;
///
/// let params = RulesEngineParameters::new()
///     .priority_threshold(10)
///     .skip_on_first_applied_rule(true);
/// assert_eq!(params.threshold(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct RulesEngineParameters {
    priority_threshold: i32,
    skip_on_first_applied_rule: bool,
    skip_on_first_failed_rule: bool,
    skip_on_first_non_triggered_rule: bool,
    max_rounds: Option<usize>,
    refraction: bool,
}

impl Default for RulesEngineParameters {
    fn default() -> Self {
        Self {
            priority_threshold: i32::MAX,
            skip_on_first_applied_rule: false,
            skip_on_first_failed_rule: false,
            skip_on_first_non_triggered_rule: false,
            max_rounds: None,
            refraction: true,
        }
    }
}

impl RulesEngineParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules with a priority above this value end the pass.
    pub fn priority_threshold(mut self, threshold: i32) -> Self {
        self.priority_threshold = threshold;
        self
    }

    /// End the pass after the first rule whose actions succeed.
    pub fn skip_on_first_applied_rule(mut self, skip: bool) -> Self {
        self.skip_on_first_applied_rule = skip;
        self
    }

    /// End the pass after the first rule whose actions fail.
    pub fn skip_on_first_failed_rule(mut self, skip: bool) -> Self {
        self.skip_on_first_failed_rule = skip;
        self
    }

    /// End the pass at the first rule whose condition does not hold.
    pub fn skip_on_first_non_triggered_rule(mut self, skip: bool) -> Self {
        self.skip_on_first_non_triggered_rule = skip;
        self
    }

    /// Upper bound on inference rounds that fire something. `None` (the
    /// default) never gives up.
    ///
    /// The closing round that fires nothing is not counted: with a limit of
    /// `n`, firing fails only when round `n + 1` still fires a rule.
    pub fn max_rounds(mut self, max_rounds: Option<usize>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Whether the inference engine holds back a rule that has fired until
    /// the facts change again. On by default.
    ///
    /// With refraction off every round re-evaluates every rule, so a rule
    /// whose own actions keep its condition true fires once per round.
    pub fn refraction(mut self, refraction: bool) -> Self {
        self.refraction = refraction;
        self
    }

    #[must_use]
    pub fn threshold(&self) -> i32 {
        self.priority_threshold
    }

    #[must_use]
    pub fn skips_on_first_applied(&self) -> bool {
        self.skip_on_first_applied_rule
    }

    #[must_use]
    pub fn skips_on_first_failed(&self) -> bool {
        self.skip_on_first_failed_rule
    }

    #[must_use]
    pub fn skips_on_first_non_triggered(&self) -> bool {
        self.skip_on_first_non_triggered_rule
    }

    #[must_use]
    pub fn round_limit(&self) -> Option<usize> {
        self.max_rounds
    }

    #[must_use]
    pub fn uses_refraction(&self) -> bool {
        self.refraction
    }
}

impl fmt::Display for RulesEngineParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "priorityThreshold={}, skipOnFirstAppliedRule={}, skipOnFirstFailedRule={}, skipOnFirstNonTriggeredRule={}",
            self.priority_threshold,
            self.skip_on_first_applied_rule,
            self.skip_on_first_failed_rule,
            self.skip_on_first_non_triggered_rule,
        )?;
        if let Some(limit) = self.max_rounds {
            write!(f, ", maxRounds={limit}")?;
        }
        if !self.refraction {
            write!(f, ", refraction=false")?;
        }
        Ok(())
    }
}
