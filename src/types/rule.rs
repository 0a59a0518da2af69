use std::cmp::Ordering;
use std::fmt;

use super::error::{ActionError, EvaluationError};
use super::facts::Facts;

pub const DEFAULT_RULE_NAME: &str = "rule";
pub const DEFAULT_RULE_DESCRIPTION: &str = "description";
pub const DEFAULT_RULE_PRIORITY: i32 = i32::MAX - 1;

/// A named, prioritized unit with a condition over [`Facts`] and an action
/// that may change them.
///
/// Lower priority values take precedence: they are evaluated and executed
/// first. Two rules with the same name are the same rule as far as a
/// [`RuleSet`](super::RuleSet) is concerned.
pub trait Rule {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        DEFAULT_RULE_DESCRIPTION
    }

    fn priority(&self) -> i32 {
        DEFAULT_RULE_PRIORITY
    }

    /// Decide whether the rule should fire. Must not change any fact.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError`] if the condition cannot be decided.
    fn evaluate(&self, facts: &Facts) -> Result<bool, EvaluationError>;

    /// Perform the rule's actions.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] from the first failing action; later actions
    /// of this rule do not run.
    fn execute(&self, facts: &mut Facts) -> Result<(), ActionError>;
}

impl fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name())
            .field("priority", &self.priority())
            .finish()
    }
}

/// Total order over rules: priority ascending, then name.
pub fn rule_order(a: &dyn Rule, b: &dyn Rule) -> Ordering {
    a.priority()
        .cmp(&b.priority())
        .then_with(|| a.name().cmp(b.name()))
}

/// A rule condition.
pub trait Condition {
    /// # Errors
    ///
    /// Returns [`EvaluationError`] if the condition cannot be decided.
    fn evaluate(&self, facts: &Facts) -> Result<bool, EvaluationError>;
}

impl<F> Condition for F
where
    F: Fn(&Facts) -> bool,
{
    fn evaluate(&self, facts: &Facts) -> Result<bool, EvaluationError> {
        Ok(self(facts))
    }
}

/// A rule action.
pub trait Action {
    /// # Errors
    ///
    /// Returns [`ActionError`] if the action fails.
    fn execute(&self, facts: &mut Facts) -> Result<(), ActionError>;
}

impl<F> Action for F
where
    F: Fn(&mut Facts) -> Result<(), ActionError>,
{
    fn execute(&self, facts: &mut Facts) -> Result<(), ActionError> {
        self(facts)
    }
}

/// A rule assembled from one [`Condition`] and an ordered list of [`Action`]s.
pub struct DefaultRule {
    name: String,
    description: String,
    priority: i32,
    condition: Box<dyn Condition>,
    actions: Vec<Box<dyn Action>>,
}

impl DefaultRule {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        priority: i32,
        condition: Box<dyn Condition>,
        actions: Vec<Box<dyn Action>>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            priority,
            condition,
            actions,
        }
    }

    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }
}

impl Rule for DefaultRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn evaluate(&self, facts: &Facts) -> Result<bool, EvaluationError> {
        self.condition.evaluate(facts)
    }

    fn execute(&self, facts: &mut Facts) -> Result<(), ActionError> {
        for action in &self.actions {
            action.execute(facts)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DefaultRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultRule")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("actions", &self.actions.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`DefaultRule`].
///
/// # Example
///
/// ```
/// use rulekit::{Facts, RuleBuilder, Rule};
///
/// let rule = RuleBuilder::new("adult")
///     .priority(1)
///     .when(|facts: &Facts| facts.get("age").and_then(|v| v.as_int()) >= Some(18))
///     .then(|facts: &mut Facts| {
///         facts.put("adult", true);
///         Ok(())
///     })
///     .build();
///
/// assert_eq!(rule.name(), "adult");
/// ```
#[must_use]
pub struct RuleBuilder {
    name: String,
    description: String,
    priority: i32,
    condition: Option<Box<dyn Condition>>,
    actions: Vec<Box<dyn Action>>,
}

impl RuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: DEFAULT_RULE_DESCRIPTION.to_owned(),
            priority: DEFAULT_RULE_PRIORITY,
            condition: None,
            actions: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the condition. Without one the rule never fires.
    pub fn when<F>(self, condition: F) -> Self
    where
        F: Fn(&Facts) -> bool + 'static,
    {
        self.condition(Box::new(condition))
    }

    /// Set a prebuilt condition, replacing any earlier one.
    pub fn condition(mut self, condition: Box<dyn Condition>) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Append an action. Actions run in the order they are added.
    pub fn then<F>(self, action: F) -> Self
    where
        F: Fn(&mut Facts) -> Result<(), ActionError> + 'static,
    {
        self.action(Box::new(action))
    }

    pub fn action(mut self, action: Box<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }

    pub fn build(self) -> DefaultRule {
        let condition = self
            .condition
            .unwrap_or_else(|| Box::new(|_: &Facts| false) as Box<dyn Condition>);
        DefaultRule::new(
            self.name,
            self.description,
            self.priority,
            condition,
            self.actions,
        )
    }
}

impl Default for RuleBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_RULE_NAME)
    }
}
