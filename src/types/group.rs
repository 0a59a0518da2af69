use std::cell::{Cell, RefCell};
use std::fmt;
use std::str::FromStr;

use super::error::{ActionError, EvaluationError, GroupKindError};
use super::facts::Facts;
use super::rule::{rule_order, Rule, DEFAULT_RULE_DESCRIPTION, DEFAULT_RULE_PRIORITY};

/// How a [`RuleGroup`] combines the evaluation and execution of its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Always triggers. On execute, each member is evaluated and executed
    /// independently, in insertion order.
    Sequential,
    /// Like [`Sequential`](Self::Sequential), but members run in priority order.
    SortedSequential,
    /// Exactly one member fires: the highest-precedence member whose
    /// condition holds.
    Activation,
    /// All members must hold; then all of them are executed.
    Unit,
    /// The highest-precedence member is the condition of the group; when it
    /// holds, it fires together with every other member that holds.
    Conditional,
}

impl GroupKind {
    /// Whether members are kept in priority order (otherwise insertion order).
    #[must_use]
    pub fn is_sorted(self) -> bool {
        !matches!(self, GroupKind::Sequential)
    }

    /// Name under which this kind appears in rule definitions.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            GroupKind::Sequential => "SequentialRuleGroup",
            GroupKind::SortedSequential => "SortedSequentialRuleGroup",
            GroupKind::Activation => "ActivationRuleGroup",
            GroupKind::Unit => "UnitRuleGroup",
            GroupKind::Conditional => "ConditionalRuleGroup",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for GroupKind {
    type Err = GroupKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            GroupKind::Sequential,
            GroupKind::SortedSequential,
            GroupKind::Activation,
            GroupKind::Unit,
            GroupKind::Conditional,
        ]
        .into_iter()
        .find(|kind| kind.type_name() == s)
        .ok_or_else(|| GroupKindError { name: s.to_owned() })
    }
}

/// A rule made of other rules.
///
/// A group takes part in a [`RuleSet`](super::RuleSet) like any other rule;
/// its [`GroupKind`] decides what evaluating and executing it means. Members
/// may themselves be groups. Adding a member whose name is already present is
/// a no-op.
///
/// # Example
///
/// ```
/// use rulekit::{Facts, GroupKind, Rule, RuleBuilder, RuleGroup};
///
/// let mut group = RuleGroup::new("discount", GroupKind::Activation);
/// group.add_rule(RuleBuilder::new("gold").priority(1).when(|f: &Facts| f.contains("gold")).build());
/// group.add_rule(RuleBuilder::new("any").priority(2).when(|_: &Facts| true).build());
///
/// assert!(group.evaluate(&Facts::new().set("gold", true)).unwrap());
/// ```
pub struct RuleGroup {
    name: String,
    description: String,
    priority: i32,
    kind: GroupKind,
    rules: Vec<Box<dyn Rule>>,
    // Member positions chosen by the last `evaluate`, consumed by `execute`.
    selected: RefCell<Vec<usize>>,
    evaluated: Cell<bool>,
}

impl RuleGroup {
    pub fn new(name: impl Into<String>, kind: GroupKind) -> Self {
        Self {
            name: name.into(),
            description: DEFAULT_RULE_DESCRIPTION.to_owned(),
            priority: DEFAULT_RULE_PRIORITY,
            kind,
            rules: Vec::new(),
            selected: RefCell::new(Vec::new()),
            evaluated: Cell::new(false),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Add a member and return the group (builder form).
    #[must_use]
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.add_rule(rule);
        self
    }

    #[must_use]
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// Add a member. Returns `false` if a member with that name exists.
    pub fn add_rule(&mut self, rule: impl Rule + 'static) -> bool {
        self.add_boxed(Box::new(rule))
    }

    pub fn add_boxed(&mut self, rule: Box<dyn Rule>) -> bool {
        if self.rules.iter().any(|r| r.name() == rule.name()) {
            return false;
        }
        if self.kind.is_sorted() {
            let pos = self
                .rules
                .partition_point(|r| rule_order(r.as_ref(), rule.as_ref()).is_lt());
            self.rules.insert(pos, rule);
        } else {
            self.rules.push(rule);
        }
        self.reset_selection();
        true
    }

    /// Remove the member with the given name, returning it.
    pub fn remove_rule(&mut self, name: &str) -> Option<Box<dyn Rule>> {
        let pos = self.rules.iter().position(|r| r.name() == name)?;
        self.reset_selection();
        Some(self.rules.remove(pos))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Member names in iteration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    fn reset_selection(&self) {
        self.selected.borrow_mut().clear();
        self.evaluated.set(false);
    }

    fn select(&self, positions: Vec<usize>) {
        *self.selected.borrow_mut() = positions;
        self.evaluated.set(true);
    }

    /// Positions in priority order; member priorities may have moved since insertion.
    fn priority_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.rules.len()).collect();
        if self.kind.is_sorted() {
            order.sort_by(|&a, &b| rule_order(self.rules[a].as_ref(), self.rules[b].as_ref()));
        }
        order
    }

    fn evaluate_activation(&self, facts: &Facts) -> Result<bool, EvaluationError> {
        for pos in self.priority_order() {
            if self.rules[pos].evaluate(facts)? {
                self.select(vec![pos]);
                return Ok(true);
            }
        }
        self.select(Vec::new());
        Ok(false)
    }

    fn evaluate_unit(&self, facts: &Facts) -> Result<bool, EvaluationError> {
        if self.rules.is_empty() {
            return Ok(false);
        }
        for rule in &self.rules {
            if !rule.evaluate(facts)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn evaluate_conditional(&self, facts: &Facts) -> Result<bool, EvaluationError> {
        let order = self.priority_order();
        let Some(&head) = order.first() else {
            self.select(Vec::new());
            return Ok(false);
        };
        let head_priority = self.rules[head].priority();
        if order
            .get(1)
            .is_some_and(|&next| self.rules[next].priority() == head_priority)
        {
            return Err(EvaluationError::AmbiguousConditionRule {
                group: self.name.clone(),
                priority: head_priority,
            });
        }
        if !self.rules[head].evaluate(facts)? {
            self.select(Vec::new());
            return Ok(false);
        }
        let mut selected = vec![head];
        for &pos in &order[1..] {
            if self.rules[pos].evaluate(facts)? {
                selected.push(pos);
            }
        }
        self.select(selected);
        Ok(true)
    }

    fn execute_member(&self, pos: usize, facts: &mut Facts) -> Result<(), ActionError> {
        let rule = &self.rules[pos];
        rule.execute(facts).map_err(|source| ActionError::SubRule {
            rule: rule.name().to_owned(),
            source: Box::new(source),
        })
    }

    fn execute_sequential(&self, facts: &mut Facts) -> Result<(), ActionError> {
        for pos in self.priority_order() {
            let triggered =
                self.rules[pos]
                    .evaluate(facts)
                    .map_err(|source| ActionError::SubRuleEvaluation {
                        rule: self.rules[pos].name().to_owned(),
                        source,
                    })?;
            if triggered {
                self.execute_member(pos, facts)?;
            } else {
                tracing::trace!(group = %self.name, rule = self.rules[pos].name(), "sub-rule skipped");
            }
        }
        Ok(())
    }

    fn execute_selected(&self, facts: &mut Facts) -> Result<(), ActionError> {
        let selected = self.selected.borrow().clone();
        for pos in selected {
            self.execute_member(pos, facts)?;
        }
        Ok(())
    }
}

impl Rule for RuleGroup {
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
        match self.kind {
            GroupKind::Sequential | GroupKind::SortedSequential => Ok(true),
            GroupKind::Activation => self.evaluate_activation(facts),
            GroupKind::Unit => self.evaluate_unit(facts),
            GroupKind::Conditional => self.evaluate_conditional(facts),
        }
    }

    fn execute(&self, facts: &mut Facts) -> Result<(), ActionError> {
        match self.kind {
            GroupKind::Sequential | GroupKind::SortedSequential => self.execute_sequential(facts),
            GroupKind::Unit => {
                for pos in self.priority_order() {
                    self.execute_member(pos, facts)?;
                }
                Ok(())
            }
            GroupKind::Activation | GroupKind::Conditional => {
                if !self.evaluated.get() {
                    tracing::debug!(group = %self.name, "executed without a prior evaluation, nothing selected");
                }
                self.execute_selected(facts)
            }
        }
    }
}

impl fmt::Debug for RuleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleGroup")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("priority", &self.priority)
            .field("rules", &self.rules)
            .finish()
    }
}
