use std::fmt;
use std::time::Duration;

use super::error::ActionError;

/// What happened to one rule during a pass.
#[derive(Debug)]
pub enum RuleStatus {
    /// The condition held and every action succeeded.
    Fired,
    /// The condition held but an action failed.
    Failed(ActionError),
    /// The condition did not hold.
    NotTriggered,
    /// A listener refused to let the rule be evaluated.
    Vetoed,
}

/// One visited rule and its status.
#[derive(Debug)]
pub struct RuleOutcome {
    rule: String,
    status: RuleStatus,
}

impl RuleOutcome {
    pub(crate) fn new(rule: impl Into<String>, status: RuleStatus) -> Self {
        Self {
            rule: rule.into(),
            status,
        }
    }

    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    #[must_use]
    pub fn status(&self) -> &RuleStatus {
        &self.status
    }

    #[must_use]
    pub fn fired(&self) -> bool {
        matches!(self.status, RuleStatus::Fired)
    }
}

/// Why a pass ended before visiting every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// `rule` has a priority above the configured threshold.
    PriorityThresholdExceeded { rule: String, priority: i32 },
    FirstApplied { rule: String },
    FirstFailed { rule: String },
    FirstNonTriggered { rule: String },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::PriorityThresholdExceeded { rule, priority } => {
                write!(f, "priority {priority} of '{rule}' exceeds threshold")
            }
            StopReason::FirstApplied { rule } => write!(f, "'{rule}' applied"),
            StopReason::FirstFailed { rule } => write!(f, "'{rule}' failed"),
            StopReason::FirstNonTriggered { rule } => write!(f, "'{rule}' not triggered"),
        }
    }
}

/// The outcome of one ordered pass over a rule set.
#[derive(Debug, Default)]
pub struct PassReport {
    outcomes: Vec<RuleOutcome>,
    stop: Option<StopReason>,
}

impl PassReport {
    pub(crate) fn record(&mut self, outcome: RuleOutcome) {
        self.outcomes.push(outcome);
    }

    pub(crate) fn stop(&mut self, reason: StopReason) {
        self.stop = Some(reason);
    }

    /// Visited rules, in visiting order.
    #[must_use]
    pub fn outcomes(&self) -> &[RuleOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.stop.as_ref()
    }

    /// Number of rules that fired in this pass.
    #[must_use]
    pub fn fired_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.fired()).count()
    }
}

/// Everything a firing call did, pass by pass.
///
/// The default engine always produces exactly one pass; the inference engine
/// produces one per round, the last of which fired nothing.
#[derive(Debug)]
pub struct FiringReport {
    passes: Vec<PassReport>,
    duration: Duration,
}

impl FiringReport {
    pub(crate) fn new(passes: Vec<PassReport>, duration: Duration) -> Self {
        Self { passes, duration }
    }

    #[must_use]
    pub fn passes(&self) -> &[PassReport] {
        &self.passes
    }

    /// Number of passes (inference rounds) run.
    #[must_use]
    pub fn rounds(&self) -> usize {
        self.passes.len()
    }

    /// Every outcome across all passes, in order.
    pub fn outcomes(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.passes.iter().flat_map(|p| p.outcomes.iter())
    }

    /// Names of rules that fired, in firing order. A rule appears once per firing.
    #[must_use]
    pub fn fired(&self) -> Vec<&str> {
        self.outcomes()
            .filter(|o| o.fired())
            .map(RuleOutcome::rule)
            .collect()
    }

    /// Rules whose actions failed, with their errors.
    #[must_use]
    pub fn failed(&self) -> Vec<(&str, &ActionError)> {
        self.outcomes()
            .filter_map(|o| match &o.status {
                RuleStatus::Failed(err) => Some((o.rule(), err)),
                _ => None,
            })
            .collect()
    }

    /// Whether nothing fired at all.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.outcomes().all(|o| !o.fired())
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for FiringReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rounds: {}", self.rounds())?;
        write!(f, ", fired: [{}]", self.fired().join(", "))?;
        let failed: Vec<&str> = self.failed().into_iter().map(|(rule, _)| rule).collect();
        if !failed.is_empty() {
            write!(f, ", failed: [{}]", failed.join(", "))?;
        }
        write!(f, ", duration: {:?}", self.duration)
    }
}
