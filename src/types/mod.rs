mod definition;
mod error;
mod expr;
mod facts;
mod group;
mod listener;
mod parameters;
mod report;
mod rule;
mod ruleset;
mod value;

pub use definition::RuleDefinition;
pub use error::{ActionError, EngineError, EvaluationError, GroupKindError, ValidationError};
pub use expr::{fact, field, CompareOp, Expr, FieldExpr, Operand, Sign, Statement};
pub use facts::Facts;
pub use group::{GroupKind, RuleGroup};
pub use listener::{RuleListener, RulesEngineListener};
pub use parameters::RulesEngineParameters;
pub use report::{FiringReport, PassReport, RuleOutcome, RuleStatus, StopReason};
pub use rule::{
    rule_order, Action, Condition, DefaultRule, Rule, RuleBuilder, DEFAULT_RULE_DESCRIPTION,
    DEFAULT_RULE_NAME, DEFAULT_RULE_PRIORITY,
};
pub use ruleset::RuleSet;
pub use value::Value;
