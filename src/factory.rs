//! Building rules from [`RuleDefinition`]s.

use std::str::FromStr;

use crate::parse::{parse_action, parse_condition};
use crate::{
    Action, Condition, DefaultRule, Facts, GroupKind, Rule, RuleDefinition, RuleGroup, RuleSet,
    RulesError, ValidationError,
};

/// Creates rules whose conditions and actions are written as expressions.
///
/// # Example
///
/// ```
/// use rulekit::{DefaultRulesEngine, ExpressionRuleFactory, Facts, RuleDefinition, RulesEngine, Value};
///
/// let definitions = [RuleDefinition::new("adult", "age >= 18").with_action("adult = true")];
/// let mut rules = ExpressionRuleFactory::new().create_all(&definitions).unwrap();
///
/// let mut facts = Facts::new().set("age", 30_i64);
/// DefaultRulesEngine::new().fire(&mut rules, &mut facts).unwrap();
/// assert_eq!(facts.get("adult"), Some(&Value::Bool(true)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionRuleFactory;

impl ExpressionRuleFactory {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Create one rule. Composite definitions become a [`RuleGroup`] of
    /// recursively created members.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError`] if the name is empty, an expression does not
    /// parse, the composite type is unknown, or a composite has no members.
    pub fn create(&self, definition: &RuleDefinition) -> Result<Box<dyn Rule>, RulesError> {
        if definition.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        match &definition.composite_rule_type {
            Some(type_name) => self.create_group(definition, type_name),
            None => Ok(Box::new(Self::create_simple(definition)?)),
        }
    }

    /// Create every definition into a fresh [`RuleSet`].
    ///
    /// # Errors
    ///
    /// Fails on the first definition that cannot be created, or when two
    /// definitions share a name.
    pub fn create_all<'a>(
        &self,
        definitions: impl IntoIterator<Item = &'a RuleDefinition>,
    ) -> Result<RuleSet, RulesError> {
        let mut rules = RuleSet::new();
        for definition in definitions {
            if !rules.register_boxed(self.create(definition)?) {
                return Err(RulesError::DuplicateRule {
                    name: definition.name.clone(),
                });
            }
        }
        Ok(rules)
    }

    fn create_simple(definition: &RuleDefinition) -> Result<DefaultRule, RulesError> {
        let expr = parse_condition(&definition.condition)
            .map_err(|e| e.in_source("condition", &definition.condition))?;
        let condition: Box<dyn Condition> = Box::new(move |facts: &Facts| expr.evaluate(facts));

        let mut actions: Vec<Box<dyn Action>> = Vec::with_capacity(definition.actions.len());
        for text in &definition.actions {
            let statement = parse_action(text).map_err(|e| e.in_source("action", text))?;
            let rule = definition.name.clone();
            actions.push(Box::new(move |facts: &mut Facts| statement.apply(&rule, facts)));
        }

        tracing::debug!(
            rule = %definition.name,
            condition = %definition.condition,
            actions = actions.len(),
            "created expression rule"
        );
        Ok(DefaultRule::new(
            definition.name.as_str(),
            definition.description.as_str(),
            definition.priority,
            condition,
            actions,
        ))
    }

    fn create_group(
        &self,
        definition: &RuleDefinition,
        type_name: &str,
    ) -> Result<Box<dyn Rule>, RulesError> {
        let kind = GroupKind::from_str(type_name)?;
        if definition.composing_rules.is_empty() {
            return Err(RulesError::EmptyGroup {
                name: definition.name.clone(),
            });
        }
        let mut group = RuleGroup::new(definition.name.as_str(), kind)
            .with_description(definition.description.as_str())
            .with_priority(definition.priority);
        for member in &definition.composing_rules {
            if !group.add_boxed(self.create(member)?) {
                tracing::warn!(
                    group = %definition.name,
                    rule = %member.name,
                    "duplicate composing rule ignored"
                );
            }
        }
        tracing::debug!(group = %definition.name, %kind, members = group.len(), "created rule group");
        Ok(Box::new(group))
    }
}
