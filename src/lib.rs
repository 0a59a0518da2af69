//! A small production-rule engine.
//!
//! Rules pair a condition over a shared [`Facts`] store with actions that
//! update it. A [`RuleSet`] keeps rules in priority order, and a
//! [`RulesEngine`] fires them:
//!
//! - [`DefaultRulesEngine`] makes one ordered pass.
//! - [`InferenceRulesEngine`] repeats passes until nothing more fires.
//!
//! Rules can be written as closures with [`RuleBuilder`], composed into
//! [`RuleGroup`]s, adapted from plain objects with [`RuleAdapter`], or
//! created from expression text with [`ExpressionRuleFactory`].
//!
//! ```
//! use rulekit::{DefaultRulesEngine, Facts, RuleBuilder, RuleSet, RulesEngine, Value};
//!
//! let mut rules = RuleSet::new();
//! rules.register(
//!     RuleBuilder::new("fizz")
//!         .when(|f: &Facts| f.get("n").and_then(Value::as_int).is_some_and(|n| n % 3 == 0))
//!         .then(|f: &mut Facts| {
//!             f.put("said", "fizz");
//!             Ok(())
//!         })
//!         .build(),
//! );
//!
//! let mut facts = Facts::new().set("n", 9_i64);
//! DefaultRulesEngine::new().fire(&mut rules, &mut facts).unwrap();
//! assert_eq!(facts.get("said"), Some(&Value::from("fizz")));
//! ```

mod adapter;
mod engine;
mod error;
mod factory;
pub mod parse;
mod types;

pub use adapter::{AdaptedRule, Bindings, Method, Param, RuleAdapter};
pub use engine::{DefaultRulesEngine, InferenceRulesEngine, RulesEngine};
pub use error::RulesError;
pub use factory::ExpressionRuleFactory;
pub use parse::ParseError;
pub use types::{
    fact, field, rule_order, Action, ActionError, CompareOp, Condition, DefaultRule, EngineError,
    EvaluationError, Expr, Facts, FieldExpr, FiringReport, GroupKind, GroupKindError, Operand,
    PassReport, Rule, RuleBuilder, RuleDefinition, RuleGroup, RuleListener, RuleOutcome, RuleSet,
    RuleStatus, RulesEngineListener, RulesEngineParameters, Sign, Statement, StopReason,
    ValidationError, Value, DEFAULT_RULE_DESCRIPTION, DEFAULT_RULE_NAME, DEFAULT_RULE_PRIORITY,
};
