//! Turning plain objects into rules.
//!
//! A [`RuleAdapter`] wraps any value and lists which of its methods act as the
//! rule's condition, actions, and (optionally) priority. Each method declares
//! the facts its parameters are bound to. The shape is validated once, when
//! the adapter is built, and the result is an [`AdaptedRule`] that implements
//! [`Rule`].
//!
//! ```
//! use rulekit::{ActionError, Facts, Method, Rule, RuleAdapter, Value};
//!
//! #[derive(Default)]
//! struct Umbrella {
//!     reminders: usize,
//! }
//!
//! let rule = RuleAdapter::new(Umbrella::default())
//!     .name("umbrella")
//!     .method(
//!         Method::condition("it_rains", |_: &Umbrella, args| {
//!             args.get("rain") == Some(&Value::Bool(true))
//!         })
//!         .fact("rain"),
//!     )
//!     .method(Method::action("remind", |u: &mut Umbrella, _, _: &mut Facts| {
//!         u.reminders += 1;
//!         Ok::<(), ActionError>(())
//!     }))
//!     .build()
//!     .unwrap();
//!
//! let mut facts = Facts::new().set("rain", true);
//! assert!(rule.evaluate(&facts).unwrap());
//! rule.execute(&mut facts).unwrap();
//! assert_eq!(rule.with_target(|u| u.reminders), 1);
//! ```

use std::cell::RefCell;
use std::fmt;

use crate::{
    ActionError, EvaluationError, Facts, Rule, ValidationError, Value, DEFAULT_RULE_DESCRIPTION,
    DEFAULT_RULE_NAME, DEFAULT_RULE_PRIORITY,
};

type ConditionFn<T> = Box<dyn Fn(&T, &Bindings) -> bool>;
type ActionFn<T> = Box<dyn Fn(&mut T, &Bindings, &mut Facts) -> Result<(), ActionError>>;
type PriorityFn<T> = Box<dyn Fn(&T) -> i32>;

/// Where a method parameter gets its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// The fact with this name.
    Fact(String),
    /// The fact named by [`RuleAdapter::default_fact`].
    DefaultFact,
    /// A plain argument of the given type. Never bindable.
    Arg(String),
}

/// Fact values bound to a method's parameters, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: Vec<(String, Value)>,
}

impl Bindings {
    /// Value bound from the named fact.
    #[must_use]
    pub fn get(&self, fact: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == fact).map(|(_, v)| v)
    }

    /// Value of the parameter at `index`.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.values.get(index).map(|(_, v)| v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

enum MethodKind<T> {
    Condition(ConditionFn<T>),
    Action(ActionFn<T>),
    Priority(PriorityFn<T>),
}

/// One capability of an adapted object.
#[must_use]
pub struct Method<T> {
    name: String,
    kind: MethodKind<T>,
    params: Vec<Param>,
    order: Option<i32>,
}

impl<T> Method<T> {
    fn new(name: impl Into<String>, kind: MethodKind<T>) -> Self {
        Self {
            name: name.into(),
            kind,
            params: Vec::new(),
            order: None,
        }
    }

    /// The rule's condition. Exactly one is required.
    pub fn condition<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T, &Bindings) -> bool + 'static,
    {
        Self::new(name, MethodKind::Condition(Box::new(f)))
    }

    /// An action. Actions run by ascending [`order`](Self::order), then in
    /// declaration order.
    pub fn action<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut T, &Bindings, &mut Facts) -> Result<(), ActionError> + 'static,
    {
        Self::new(name, MethodKind::Action(Box::new(f)))
    }

    /// Computes the rule's priority from the object. At most one is allowed.
    pub fn priority<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T) -> i32 + 'static,
    {
        Self::new(name, MethodKind::Priority(Box::new(f)))
    }

    /// Bind the next parameter to the named fact.
    pub fn fact(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::Fact(name.into()));
        self
    }

    /// Bind the next parameter to the rule's default fact.
    pub fn default_fact(mut self) -> Self {
        self.params.push(Param::DefaultFact);
        self
    }

    /// Declare a parameter that is not bound to any fact.
    pub fn arg(mut self, type_name: impl Into<String>) -> Self {
        self.params.push(Param::Arg(type_name.into()));
        self
    }

    /// Execution order of an action. Defaults to 0.
    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

impl<T> fmt::Debug for Method<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            MethodKind::Condition(_) => "condition",
            MethodKind::Action(_) => "action",
            MethodKind::Priority(_) => "priority",
        };
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("params", &self.params)
            .field("order", &self.order)
            .finish()
    }
}

/// Builder that validates an object's capabilities and produces an [`AdaptedRule`].
#[must_use]
pub struct RuleAdapter<T> {
    target: T,
    name: String,
    description: String,
    priority: i32,
    default_fact: Option<String>,
    methods: Vec<Method<T>>,
}

impl<T> RuleAdapter<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            name: DEFAULT_RULE_NAME.to_owned(),
            description: DEFAULT_RULE_DESCRIPTION.to_owned(),
            priority: DEFAULT_RULE_PRIORITY,
            default_fact: None,
            methods: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Priority used when no priority method is declared.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// The fact that [`Param::DefaultFact`] parameters are bound to.
    pub fn default_fact(mut self, fact: impl Into<String>) -> Self {
        self.default_fact = Some(fact.into());
        self
    }

    pub fn method(mut self, method: Method<T>) -> Self {
        self.methods.push(method);
        self
    }

    /// Validate the declared shape.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the name is empty, if there is not
    /// exactly one condition, if there is more than one priority method or it
    /// takes parameters, or if a parameter cannot be bound to a fact.
    pub fn build(self) -> Result<AdaptedRule<T>, ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let mut conditions = Vec::new();
        let mut actions = Vec::new();
        let mut priorities = Vec::new();
        for method in self.methods {
            let Method {
                name,
                kind,
                params,
                order,
            } = method;
            for (index, param) in params.iter().enumerate() {
                match param {
                    Param::Arg(type_name) if !matches!(kind, MethodKind::Priority(_)) => {
                        return Err(ValidationError::UnboundParameter {
                            rule: self.name,
                            method: name,
                            index,
                            type_name: type_name.clone(),
                        });
                    }
                    Param::DefaultFact if self.default_fact.is_none() => {
                        return Err(ValidationError::NoDefaultFact {
                            rule: self.name,
                            method: name,
                        });
                    }
                    _ => {}
                }
            }
            match kind {
                MethodKind::Condition(call) => conditions.push(Bound { name, params, call }),
                MethodKind::Action(call) => {
                    actions.push((order.unwrap_or(0), Bound { name, params, call }));
                }
                MethodKind::Priority(call) => priorities.push(Bound { name, params, call }),
            }
        }

        if conditions.len() > 1 {
            return Err(ValidationError::DuplicateCondition {
                rule: self.name,
                methods: conditions.into_iter().map(|c| c.name).collect(),
            });
        }
        let Some(condition) = conditions.pop() else {
            return Err(ValidationError::MissingCondition { rule: self.name });
        };
        if priorities.len() > 1 {
            return Err(ValidationError::DuplicatePriority {
                rule: self.name,
                methods: priorities.into_iter().map(|p| p.name).collect(),
            });
        }
        let priority_method = priorities.pop();
        if let Some(method) = &priority_method {
            if !method.params.is_empty() {
                return Err(ValidationError::PriorityParameters {
                    rule: self.name,
                    method: method.name.clone(),
                });
            }
        }

        // Stable: equal orders keep declaration order.
        actions.sort_by_key(|(order, _)| *order);

        Ok(AdaptedRule {
            target: RefCell::new(self.target),
            name: self.name,
            description: self.description,
            priority: self.priority,
            priority_method: priority_method.map(|m| m.call),
            default_fact: self.default_fact,
            condition,
            actions: actions.into_iter().map(|(_, a)| a).collect(),
        })
    }
}

struct Bound<F> {
    name: String,
    params: Vec<Param>,
    call: F,
}

/// A rule backed by an adapted object. Built by [`RuleAdapter::build`].
pub struct AdaptedRule<T> {
    target: RefCell<T>,
    name: String,
    description: String,
    priority: i32,
    priority_method: Option<PriorityFn<T>>,
    default_fact: Option<String>,
    condition: Bound<ConditionFn<T>>,
    actions: Vec<Bound<ActionFn<T>>>,
}

impl<T> AdaptedRule<T> {
    /// Read the wrapped object.
    pub fn with_target<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.target.borrow())
    }

    #[must_use]
    pub fn into_target(self) -> T {
        self.target.into_inner()
    }

    /// Names of the action methods in execution order.
    #[must_use]
    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name.as_str()).collect()
    }

    /// Resolve parameters against the facts. On failure, returns the missing fact name.
    fn bind(&self, params: &[Param], facts: &Facts) -> Result<Bindings, String> {
        let mut values = Vec::with_capacity(params.len());
        for param in params {
            let fact = match param {
                Param::Fact(name) => name.as_str(),
                // Validation guarantees a default fact exists and no plain args remain.
                Param::DefaultFact | Param::Arg(_) => self.default_fact.as_deref().unwrap_or_default(),
            };
            let value = facts.get(fact).ok_or_else(|| fact.to_owned())?;
            values.push((fact.to_owned(), value.clone()));
        }
        Ok(Bindings { values })
    }
}

impl<T> Rule for AdaptedRule<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn priority(&self) -> i32 {
        match &self.priority_method {
            Some(call) => call(&self.target.borrow()),
            None => self.priority,
        }
    }

    fn evaluate(&self, facts: &Facts) -> Result<bool, EvaluationError> {
        let bindings = self
            .bind(&self.condition.params, facts)
            .map_err(|fact| EvaluationError::MissingFact {
                rule: self.name.clone(),
                fact,
            })?;
        Ok((self.condition.call)(&self.target.borrow(), &bindings))
    }

    fn execute(&self, facts: &mut Facts) -> Result<(), ActionError> {
        for action in &self.actions {
            let bindings = self
                .bind(&action.params, facts)
                .map_err(|fact| ActionError::MissingFact {
                    rule: self.name.clone(),
                    fact,
                })?;
            tracing::trace!(rule = %self.name, action = %action.name, "invoking action");
            (action.call)(&mut self.target.borrow_mut(), &bindings, facts)?;
        }
        Ok(())
    }
}

impl<T> fmt::Debug for AdaptedRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptedRule")
            .field("name", &self.name)
            .field("condition", &self.condition.name)
            .field("actions", &self.action_names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct FizzBuzz {
        divisor: i64,
        level: i32,
        said: Vec<String>,
    }

    fn divisible(_: &FizzBuzz, args: &Bindings) -> bool {
        args.at(0).and_then(Value::as_int).is_some_and(|n| n % 3 == 0)
    }

    fn say(word: &'static str) -> Method<FizzBuzz> {
        Method::action(word, move |fb: &mut FizzBuzz, _: &Bindings, _: &mut Facts| {
            fb.said.push(word.to_owned());
            Ok(())
        })
    }

    fn adapter() -> RuleAdapter<FizzBuzz> {
        RuleAdapter::new(FizzBuzz {
            divisor: 3,
            level: 4,
            ..FizzBuzz::default()
        })
        .name("fizz")
        .description("multiples of three")
    }

    #[test]
    fn builds_and_fires() {
        let rule = adapter()
            .method(Method::condition("divisible", divisible).fact("number"))
            .method(say("fizz"))
            .build()
            .unwrap();

        let mut facts = Facts::new().set("number", 9_i64);
        assert_eq!(rule.name(), "fizz");
        assert_eq!(rule.description(), "multiples of three");
        assert_eq!(rule.priority(), DEFAULT_RULE_PRIORITY);
        assert!(rule.evaluate(&facts).unwrap());
        rule.execute(&mut facts).unwrap();
        assert_eq!(rule.into_target().said, vec!["fizz"]);
    }

    #[test]
    fn missing_condition_is_rejected() {
        let err = adapter().method(say("fizz")).build().unwrap_err();
        assert_eq!(err, ValidationError::MissingCondition { rule: "fizz".into() });
    }

    #[test]
    fn duplicate_condition_is_rejected() {
        let err = adapter()
            .method(Method::condition("a", divisible).fact("n"))
            .method(Method::condition("b", divisible).fact("n"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateCondition { methods, .. } if methods == ["a", "b"]));
    }

    #[test]
    fn action_with_plain_argument_is_rejected() {
        let err = adapter()
            .method(Method::condition("divisible", divisible).fact("number"))
            .method(say("fizz").arg("String"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnboundParameter {
                rule: "fizz".into(),
                method: "fizz".into(),
                index: 0,
                type_name: "String".into(),
            }
        );
    }

    #[test]
    fn default_fact_must_be_declared() {
        let err = adapter()
            .method(Method::condition("divisible", divisible).default_fact())
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::NoDefaultFact { .. }));

        let rule = adapter()
            .default_fact("number")
            .method(Method::condition("divisible", divisible).default_fact())
            .build()
            .unwrap();
        assert!(rule.evaluate(&Facts::new().set("number", 6_i64)).unwrap());
    }

    #[test]
    fn priority_method_rules() {
        let rule = adapter()
            .method(Method::condition("divisible", divisible).fact("n"))
            .method(Method::priority("level", |fb: &FizzBuzz| fb.level))
            .build()
            .unwrap();
        assert_eq!(rule.priority(), 4);

        let err = adapter()
            .method(Method::condition("divisible", divisible).fact("n"))
            .method(Method::priority("p1", |fb: &FizzBuzz| fb.level))
            .method(Method::priority("p2", |_: &FizzBuzz| 1))
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::DuplicatePriority { .. }));

        let err = adapter()
            .method(Method::condition("divisible", divisible).fact("n"))
            .method(Method::priority("p", |fb: &FizzBuzz| fb.level).arg("i32"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::PriorityParameters { .. }));
    }

    #[test]
    fn static_priority_without_method() {
        let rule = adapter()
            .priority(7)
            .method(Method::condition("divisible", divisible).fact("n"))
            .build()
            .unwrap();
        assert_eq!(rule.priority(), 7);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = adapter()
            .name("")
            .method(Method::condition("divisible", divisible).fact("n"))
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyName);
    }

    #[test]
    fn actions_follow_order_then_declaration() {
        let rule = adapter()
            .method(Method::condition("divisible", divisible).fact("number"))
            .method(say("third").order(2))
            .method(say("first"))
            .method(say("second"))
            .method(say("zeroth").order(-1))
            .build()
            .unwrap();
        assert_eq!(rule.action_names(), vec!["zeroth", "first", "second", "third"]);
    }

    #[test]
    fn missing_fact_surfaces_at_invocation() {
        let rule = adapter()
            .method(Method::condition("divisible", divisible).fact("number"))
            .method(say("fizz").fact("audience"))
            .build()
            .unwrap();

        let err = rule.evaluate(&Facts::new()).unwrap_err();
        assert!(matches!(err, EvaluationError::MissingFact { ref fact, .. } if fact == "number"));

        let mut facts = Facts::new().set("number", 3_i64);
        let err = rule.execute(&mut facts).unwrap_err();
        assert!(matches!(err, ActionError::MissingFact { ref fact, .. } if fact == "audience"));
    }

    #[test]
    fn failing_action_stops_later_actions() {
        let rule = adapter()
            .method(Method::condition("divisible", divisible).fact("number"))
            .method(Method::action(
                "explode",
                |_: &mut FizzBuzz, _: &Bindings, _: &mut Facts| Err(ActionError::msg("boom")),
            ))
            .method(say("never"))
            .build()
            .unwrap();

        let mut facts = Facts::new().set("number", 3_i64);
        assert!(rule.execute(&mut facts).is_err());
        assert!(rule.with_target(|fb| fb.said.is_empty()));
        assert_eq!(rule.with_target(|fb| fb.divisor), 3);
    }
}
