use thiserror::Error;

/// A malformed declarative rule shape, raised when the adapter is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rule name must not be empty")]
    EmptyName,

    #[error("rule '{rule}' has no condition method")]
    MissingCondition { rule: String },

    #[error("rule '{rule}' has more than one condition method: {}", methods.join(", "))]
    DuplicateCondition { rule: String, methods: Vec<String> },

    #[error("rule '{rule}' has more than one priority method: {}", methods.join(", "))]
    DuplicatePriority { rule: String, methods: Vec<String> },

    #[error("priority method '{method}' of rule '{rule}' must not take parameters")]
    PriorityParameters { rule: String, method: String },

    #[error("parameter {index} ({type_name}) of method '{method}' in rule '{rule}' is not bound to a fact")]
    UnboundParameter {
        rule: String,
        method: String,
        index: usize,
        type_name: String,
    },

    #[error("method '{method}' of rule '{rule}' binds the default fact, but the rule declares none")]
    NoDefaultFact { rule: String, method: String },
}

/// A condition that could not be evaluated.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("fact '{fact}' required by rule '{rule}' is missing")]
    MissingFact { rule: String, fact: String },

    #[error("rule group '{group}' has more than one sub-rule with the highest priority {priority}")]
    AmbiguousConditionRule { group: String, priority: i32 },

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl EvaluationError {
    pub fn msg(message: impl Into<String>) -> Self {
        EvaluationError::Failed(message.into())
    }
}

/// A rule action that failed. Aborts the remaining actions of that rule only.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("fact '{fact}' required by rule '{rule}' is missing")]
    MissingFact { rule: String, fact: String },

    #[error("cannot apply '{op}' to {left} and {right}")]
    TypeMismatch {
        op: String,
        left: &'static str,
        right: &'static str,
    },

    #[error("sub-rule '{rule}' failed: {source}")]
    SubRule {
        rule: String,
        #[source]
        source: Box<ActionError>,
    },

    #[error("evaluating sub-rule '{rule}' failed: {source}")]
    SubRuleEvaluation {
        rule: String,
        #[source]
        source: EvaluationError,
    },

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ActionError {
    pub fn msg(message: impl Into<String>) -> Self {
        ActionError::Failed(message.into())
    }
}

/// Errors that abort a whole firing call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("evaluating rule '{rule}' failed: {source}")]
    Evaluation {
        rule: String,
        #[source]
        source: EvaluationError,
    },

    #[error("inference did not reach a fixpoint within {limit} rounds")]
    RoundLimitExceeded { limit: usize },
}

/// An unknown composite rule type name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown composite rule type '{name}'")]
pub struct GroupKindError {
    pub name: String,
}
