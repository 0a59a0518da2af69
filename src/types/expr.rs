use std::fmt;
use std::ops::Not;

use super::error::ActionError;
use super::facts::Facts;
use super::value::Value;

/// Comparison operators supported in conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Condition AST. Fact names are plain strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    /// True when the named fact is the boolean `true`.
    Fact(String),
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Neq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Compare { field, op, value } => write!(f, "({field} {op} {value})"),
            Expr::And(a, b) => write!(f, "({a} and {b})"),
            Expr::Or(a, b) => write!(f, "({a} or {b})"),
            Expr::Not(inner) => write!(f, "(not {inner})"),
            Expr::Fact(name) => write!(f, "{name}"),
        }
    }
}

impl Expr {
    #[must_use]
    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }

    /// Evaluate against the facts.
    ///
    /// A comparison whose fact is missing, or whose types cannot be
    /// compared, is false.
    #[must_use]
    pub fn evaluate(&self, facts: &Facts) -> bool {
        match self {
            Expr::Compare { field, op, value } => facts
                .get(field)
                .and_then(|actual| actual.compare(*op, value))
                .unwrap_or(false),
            Expr::And(a, b) => a.evaluate(facts) && b.evaluate(facts),
            Expr::Or(a, b) => a.evaluate(facts) || b.evaluate(facts),
            Expr::Not(inner) => !inner.evaluate(facts),
            Expr::Fact(name) => facts.get(name).and_then(Value::as_bool).unwrap_or(false),
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

/// Builder for comparisons against one fact. Created by [`field()`].
#[derive(Debug, Clone)]
pub struct FieldExpr {
    path: String,
}

impl FieldExpr {
    fn compare(self, op: CompareOp, value: impl Into<Value>) -> Expr {
        Expr::Compare {
            field: self.path,
            op,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn eq(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Eq, value)
    }

    #[must_use]
    pub fn neq(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Neq, value)
    }

    #[must_use]
    pub fn gt(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Gt, value)
    }

    #[must_use]
    pub fn gte(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Gte, value)
    }

    #[must_use]
    pub fn lt(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Lt, value)
    }

    #[must_use]
    pub fn lte(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Lte, value)
    }
}

#[must_use]
pub fn field(path: &str) -> FieldExpr {
    FieldExpr {
        path: path.to_owned(),
    }
}

/// Condition that holds when the named fact is `true`.
#[must_use]
pub fn fact(name: &str) -> Expr {
    Expr::Fact(name.to_owned())
}

/// Operator between the terms of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Add,
    Sub,
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sign::Add => write!(f, "+"),
            Sign::Sub => write!(f, "-"),
        }
    }
}

/// One side of an arithmetic step: a literal or another fact.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    Fact(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(v) => write!(f, "{v}"),
            Operand::Fact(name) => write!(f, "{name}"),
        }
    }
}

/// Action AST: one fact update.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `target = first (+|- term)*`
    Assign {
        target: String,
        first: Operand,
        rest: Vec<(Sign, Operand)>,
    },
    /// `remove target`
    Remove(String),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Assign {
                target,
                first,
                rest,
            } => {
                write!(f, "{target} = {first}")?;
                for (sign, operand) in rest {
                    write!(f, " {sign} {operand}")?;
                }
                Ok(())
            }
            Statement::Remove(target) => write!(f, "remove {target}"),
        }
    }
}

impl Statement {
    /// Apply the update to the facts on behalf of `rule`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::MissingFact`] if an operand names an absent
    /// fact, and [`ActionError::TypeMismatch`] if two operands cannot be
    /// combined.
    pub fn apply(&self, rule: &str, facts: &mut Facts) -> Result<(), ActionError> {
        match self {
            Statement::Assign {
                target,
                first,
                rest,
            } => {
                let mut acc = resolve(first, rule, facts)?;
                for (sign, operand) in rest {
                    let rhs = resolve(operand, rule, facts)?;
                    acc = combine(acc, *sign, rhs)?;
                }
                facts.put(target, acc);
            }
            Statement::Remove(target) => {
                facts.remove(target);
            }
        }
        Ok(())
    }
}

fn resolve(operand: &Operand, rule: &str, facts: &Facts) -> Result<Value, ActionError> {
    match operand {
        Operand::Literal(v) => Ok(v.clone()),
        Operand::Fact(name) => facts.get(name).cloned().ok_or_else(|| ActionError::MissingFact {
            rule: rule.to_owned(),
            fact: name.clone(),
        }),
    }
}

#[allow(clippy::cast_precision_loss)]
fn combine(lhs: Value, sign: Sign, rhs: Value) -> Result<Value, ActionError> {
    let mismatch = |l: &Value, r: &Value| ActionError::TypeMismatch {
        op: sign.to_string(),
        left: l.type_name(),
        right: r.type_name(),
    };
    match (lhs, sign, rhs) {
        (Value::Int(a), Sign::Add, Value::Int(b)) => a
            .checked_add(b)
            .map(Value::Int)
            .ok_or_else(|| ActionError::msg(format!("integer overflow in {a} + {b}"))),
        (Value::Int(a), Sign::Sub, Value::Int(b)) => a
            .checked_sub(b)
            .map(Value::Int)
            .ok_or_else(|| ActionError::msg(format!("integer overflow in {a} - {b}"))),
        (Value::Float(a), s, Value::Float(b)) => Ok(Value::Float(float_op(a, s, b))),
        (Value::Int(a), s, Value::Float(b)) => Ok(Value::Float(float_op(a as f64, s, b))),
        (Value::Float(a), s, Value::Int(b)) => Ok(Value::Float(float_op(a, s, b as f64))),
        (Value::String(mut a), Sign::Add, Value::String(b)) => {
            a.push_str(&b);
            Ok(Value::String(a))
        }
        (Value::List(mut items), Sign::Add, Value::List(more)) => {
            items.extend(more);
            Ok(Value::List(items))
        }
        (Value::List(mut items), Sign::Add, item) => {
            items.push(item);
            Ok(Value::List(items))
        }
        (Value::List(mut items), Sign::Sub, item) => {
            items.retain(|v| v != &item);
            Ok(Value::List(items))
        }
        (l, _, r) => Err(mismatch(&l, &r)),
    }
}

fn float_op(a: f64, sign: Sign, b: f64) -> f64 {
    match sign {
        Sign::Add => a + b,
        Sign::Sub => a - b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_builders() {
        assert_eq!(
            field("user.age").gte(18_i64),
            Expr::Compare {
                field: "user.age".to_owned(),
                op: CompareOp::Gte,
                value: Value::Int(18),
            }
        );
        assert_eq!(
            field("status").eq("active"),
            Expr::Compare {
                field: "status".to_owned(),
                op: CompareOp::Eq,
                value: Value::String("active".to_owned()),
            }
        );
    }

    #[test]
    fn combinators_build_trees() {
        let expr = fact("a").and(fact("b")).or(!field("x").lt(3_i64));
        match expr {
            Expr::Or(left, right) => {
                assert!(matches!(*left, Expr::And(_, _)));
                assert!(matches!(*right, Expr::Not(_)));
            }
            other => panic!("expected Or, got {other:?}"),
        }
    }

    #[test]
    fn evaluate_comparisons() {
        let facts = Facts::new().set("age", 30_i64).set("name", "ada");
        assert!(field("age").gte(18_i64).evaluate(&facts));
        assert!(field("age").lt(30.5).evaluate(&facts));
        assert!(field("name").eq("ada").evaluate(&facts));
        assert!(!field("name").eq("bob").evaluate(&facts));
    }

    #[test]
    fn missing_or_mismatched_facts_are_false() {
        let facts = Facts::new().set("age", "thirty");
        assert!(!field("age").gte(18_i64).evaluate(&facts));
        assert!(!field("height").gt(1_i64).evaluate(&facts));
        assert!((!field("height").gt(1_i64)).evaluate(&facts));
    }

    #[test]
    fn bare_fact_checks_for_true() {
        let facts = Facts::new()
            .set("rain", true)
            .set("sun", false)
            .set("count", 1_i64);
        assert!(fact("rain").evaluate(&facts));
        assert!(!fact("sun").evaluate(&facts));
        assert!(!fact("count").evaluate(&facts));
        assert!(!fact("snow").evaluate(&facts));
    }

    fn assign(target: &str, first: Operand, rest: Vec<(Sign, Operand)>) -> Statement {
        Statement::Assign {
            target: target.to_owned(),
            first,
            rest,
        }
    }

    #[test]
    fn assignment_arithmetic() {
        let mut facts = Facts::new().set("n", 4_i64).set("greeting", "hi");
        assign(
            "n",
            Operand::Fact("n".into()),
            vec![(Sign::Add, Operand::Literal(Value::Int(3)))],
        )
        .apply("r", &mut facts)
        .unwrap();
        assert_eq!(facts.get("n"), Some(&Value::Int(7)));

        assign(
            "half",
            Operand::Fact("n".into()),
            vec![(Sign::Sub, Operand::Literal(Value::Float(3.5)))],
        )
        .apply("r", &mut facts)
        .unwrap();
        assert_eq!(facts.get("half"), Some(&Value::Float(3.5)));

        assign(
            "greeting",
            Operand::Fact("greeting".into()),
            vec![(Sign::Add, Operand::Literal(Value::from(" there")))],
        )
        .apply("r", &mut facts)
        .unwrap();
        assert_eq!(facts.get("greeting"), Some(&Value::from("hi there")));
    }

    #[test]
    fn list_append_and_remove() {
        let mut facts = Facts::new().set("log", Value::List(vec![Value::from("A")]));
        let append = assign(
            "log",
            Operand::Fact("log".into()),
            vec![(Sign::Add, Operand::Literal(Value::from("B")))],
        );
        append.apply("r", &mut facts).unwrap();
        append.apply("r", &mut facts).unwrap();
        assert_eq!(
            facts.get("log"),
            Some(&Value::from(vec!["A", "B", "B"]))
        );

        assign(
            "log",
            Operand::Fact("log".into()),
            vec![(Sign::Sub, Operand::Literal(Value::from("B")))],
        )
        .apply("r", &mut facts)
        .unwrap();
        assert_eq!(facts.get("log"), Some(&Value::from(vec!["A"])));
    }

    #[test]
    fn missing_operand_is_an_error() {
        let mut facts = Facts::new();
        let err = assign("y", Operand::Fact("x".into()), Vec::new())
            .apply("copy", &mut facts)
            .unwrap_err();
        assert!(matches!(
            err,
            ActionError::MissingFact { ref rule, ref fact } if rule == "copy" && fact == "x"
        ));
        assert!(facts.is_empty());
    }

    #[test]
    fn incompatible_operands_are_an_error() {
        let mut facts = Facts::new().set("flag", true);
        let err = assign(
            "flag",
            Operand::Fact("flag".into()),
            vec![(Sign::Add, Operand::Literal(Value::Int(1)))],
        )
        .apply("r", &mut facts)
        .unwrap_err();
        assert!(matches!(err, ActionError::TypeMismatch { left: "bool", right: "int", .. }));
    }

    #[test]
    fn integer_overflow_is_an_error() {
        let mut facts = Facts::new().set("n", i64::MAX);
        let err = assign(
            "n",
            Operand::Fact("n".into()),
            vec![(Sign::Add, Operand::Literal(Value::Int(1)))],
        )
        .apply("r", &mut facts)
        .unwrap_err();
        assert!(matches!(err, ActionError::Failed(_)));
        assert_eq!(facts.get("n"), Some(&Value::Int(i64::MAX)));
    }

    #[test]
    fn remove_statement() {
        let mut facts = Facts::new().set("x", 1_i64);
        Statement::Remove("x".into()).apply("r", &mut facts).unwrap();
        assert!(!facts.contains("x"));
        // Removing an absent fact is fine.
        Statement::Remove("x".into()).apply("r", &mut facts).unwrap();
    }

    #[test]
    fn display_round_trips_shape() {
        let stmt = assign(
            "total",
            Operand::Fact("a".into()),
            vec![
                (Sign::Add, Operand::Literal(Value::Int(2))),
                (Sign::Sub, Operand::Fact("b".into())),
            ],
        );
        assert_eq!(stmt.to_string(), "total = a + 2 - b");
        assert_eq!(
            field("x").eq(1_i64).and(fact("y")).to_string(),
            "((x == 1) and y)"
        );
    }
}
