use super::rule::{DEFAULT_RULE_DESCRIPTION, DEFAULT_RULE_NAME, DEFAULT_RULE_PRIORITY};

/// Plain-data description of a rule, as read from a configuration source.
///
/// `condition` and `actions` hold expression text (see [`crate::parse`]).
/// When `composite_rule_type` is set the definition describes a group and
/// `composing_rules` lists its members; `condition` and `actions` are then
/// ignored.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct RuleDefinition {
    pub name: String,
    pub description: String,
    pub priority: i32,
    pub condition: String,
    pub actions: Vec<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub composite_rule_type: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub composing_rules: Vec<RuleDefinition>,
}

impl Default for RuleDefinition {
    fn default() -> Self {
        Self {
            name: DEFAULT_RULE_NAME.to_owned(),
            description: DEFAULT_RULE_DESCRIPTION.to_owned(),
            priority: DEFAULT_RULE_PRIORITY,
            condition: String::new(),
            actions: Vec::new(),
            composite_rule_type: None,
            composing_rules: Vec::new(),
        }
    }
}

impl RuleDefinition {
    /// A simple rule definition.
    #[must_use]
    pub fn new(name: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            condition: condition.into(),
            ..Self::default()
        }
    }

    /// A composite definition of the given group type.
    #[must_use]
    pub fn group(name: impl Into<String>, composite_rule_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            composite_rule_type: Some(composite_rule_type.into()),
            ..Self::default()
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

    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    #[must_use]
    pub fn with_member(mut self, member: RuleDefinition) -> Self {
        self.composing_rules.push(member);
        self
    }

    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.composite_rule_type.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_rule_defaults() {
        let def = RuleDefinition::default();
        assert_eq!(def.name, DEFAULT_RULE_NAME);
        assert_eq!(def.description, DEFAULT_RULE_DESCRIPTION);
        assert_eq!(def.priority, DEFAULT_RULE_PRIORITY);
        assert!(!def.is_composite());
    }

    #[test]
    fn builders() {
        let def = RuleDefinition::group("g", "UnitRuleGroup")
            .with_priority(3)
            .with_member(RuleDefinition::new("a", "x > 1").with_action("y = 1"));
        assert!(def.is_composite());
        assert_eq!(def.priority, 3);
        assert_eq!(def.composing_rules[0].actions, vec!["y = 1"]);
    }
}
