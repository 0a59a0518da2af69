use std::fmt;

use super::error::ValidationError;
use super::rule::{rule_order, Rule};
use crate::adapter::RuleAdapter;

/// An ordered, duplicate-free collection of rules.
///
/// Members are kept sorted by priority (ascending) and then by name. A rule
/// whose name is already present is not registered a second time.
///
/// # Example
///
/// ```
/// use rulekit::{RuleBuilder, RuleSet};
///
/// let mut rules = RuleSet::new();
/// rules.register(RuleBuilder::new("b").priority(2).build());
/// rules.register(RuleBuilder::new("a").priority(1).build());
/// assert!(!rules.register(RuleBuilder::new("a").priority(9).build()));
///
/// assert_eq!(rules.names(), vec!["a", "b"]);
/// ```
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule. Returns `false` if a rule with the same name is
    /// already a member; the set is then left unchanged.
    pub fn register(&mut self, rule: impl Rule + 'static) -> bool {
        self.register_boxed(Box::new(rule))
    }

    /// Register an already boxed rule. See [`register`](Self::register).
    pub fn register_boxed(&mut self, rule: Box<dyn Rule>) -> bool {
        if self.contains(rule.name()) {
            tracing::debug!(rule = rule.name(), "rule already registered, ignoring");
            return false;
        }
        let pos = self
            .rules
            .partition_point(|r| rule_order(r.as_ref(), rule.as_ref()).is_lt());
        self.rules.insert(pos, rule);
        true
    }

    /// Validate a declarative adapter and register the resulting rule.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the adapter's shape is malformed. The
    /// set is left unchanged in that case.
    pub fn register_adapter<T: 'static>(
        &mut self,
        adapter: RuleAdapter<T>,
    ) -> Result<bool, ValidationError> {
        match adapter.build() {
            Ok(rule) => Ok(self.register(rule)),
            Err(err) => {
                tracing::warn!(error = %err, "refusing to register invalid declarative rule");
                Err(err)
            }
        }
    }

    /// Remove the rule with the given name, returning it.
    pub fn unregister(&mut self, name: &str) -> Option<Box<dyn Rule>> {
        let pos = self.rules.iter().position(|r| r.name() == name)?;
        Some(self.rules.remove(pos))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.name() == name)
            .map(|r| r.as_ref() as &dyn Rule)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.name() == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Restore the priority/name order. Needed only when member priorities
    /// can change after registration; the engines call it before every pass.
    pub fn sort(&mut self) {
        self.rules.sort_by(|a, b| rule_order(a.as_ref(), b.as_ref()));
    }

    /// Iterate over the rules in priority/name order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> + '_ {
        self.rules.iter().map(|r| r.as_ref() as &dyn Rule)
    }

    /// Rule names in iteration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

impl FromIterator<Box<dyn Rule>> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Box<dyn Rule>>>(iter: I) -> Self {
        let mut rules = RuleSet::new();
        for rule in iter {
            rules.register_boxed(rule);
        }
        rules
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rules.iter()).finish()
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleSet({} rules: [", self.rules.len())?;
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}@{}", rule.name(), rule.priority())?;
        }
        write!(f, "])")
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::{ActionError, EvaluationError, Facts, RuleBuilder};

    #[test]
    fn duplicate_names_register_once() {
        let mut rules = RuleSet::new();
        assert!(rules.register(RuleBuilder::new("r").priority(1).build()));
        assert!(!rules.register(RuleBuilder::new("r").priority(0).build()));
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.get("r").map(Rule::priority), Some(1));
    }

    #[test]
    fn iteration_follows_priority_then_name() {
        let mut rules = RuleSet::new();
        rules.register(RuleBuilder::new("c").priority(1).build());
        rules.register(RuleBuilder::new("a").priority(5).build());
        rules.register(RuleBuilder::new("b").priority(1).build());
        rules.register(RuleBuilder::new("z").priority(-3).build());
        assert_eq!(rules.names(), vec!["z", "b", "c", "a"]);
    }

    #[test]
    fn unregister_removes_by_name() {
        let mut rules = RuleSet::new();
        rules.register(RuleBuilder::new("a").build());
        rules.register(RuleBuilder::new("b").build());
        let removed = rules.unregister("a").unwrap();
        assert_eq!(removed.name(), "a");
        assert!(rules.unregister("a").is_none());
        assert_eq!(rules.names(), vec!["b"]);
    }

    #[test]
    fn clear_empties_the_set() {
        let mut rules = RuleSet::new();
        rules.register(RuleBuilder::new("a").build());
        assert!(!rules.is_empty());
        rules.clear();
        assert!(rules.is_empty());
    }

    struct Movable {
        priority: Rc<Cell<i32>>,
        name: &'static str,
    }

    impl Rule for Movable {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority.get()
        }

        fn evaluate(&self, _: &Facts) -> Result<bool, EvaluationError> {
            Ok(true)
        }

        fn execute(&self, _: &mut Facts) -> Result<(), ActionError> {
            Ok(())
        }
    }

    #[test]
    fn sort_picks_up_changed_priorities() {
        let knob = Rc::new(Cell::new(1));
        let mut rules = RuleSet::new();
        rules.register(Movable {
            priority: Rc::clone(&knob),
            name: "moving",
        });
        rules.register(RuleBuilder::new("fixed").priority(5).build());
        assert_eq!(rules.names(), vec!["moving", "fixed"]);

        knob.set(10);
        rules.sort();
        assert_eq!(rules.names(), vec!["fixed", "moving"]);
    }

    #[test]
    fn display_lists_members() {
        let mut rules = RuleSet::new();
        rules.register(RuleBuilder::new("a").priority(1).build());
        rules.register(RuleBuilder::new("b").priority(2).build());
        assert_eq!(rules.to_string(), "RuleSet(2 rules: [a@1, b@2])");
    }
}
