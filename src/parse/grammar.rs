use winnow::ascii::{dec_int, till_line_ending, Caseless};
use winnow::combinator::{alt, cut_err, delimited, not, opt, preceded, repeat, terminated};
use winnow::error::{ContextError, ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use crate::{CompareOp, Expr, Operand, Sign, Statement, Value};

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Identifiers ------------------------------------------------------------

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_ident_char),
    )
        .take()
        .parse_next(input)
}

/// A case-insensitive keyword that is not the prefix of a longer identifier.
fn keyword<'i>(word: &'static str) -> impl Parser<&'i str, &'i str, ErrMode<ContextError>> {
    terminated(Caseless(word), not(one_of(is_ident_char)))
}

// -- Values -----------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn negative_number(input: &mut &str) -> ModalResult<Value> {
    let text = ('-', take_while(1.., |c: char| c.is_ascii_digit() || c == '.'))
        .take()
        .parse_next(input)?;
    if text.contains('.') {
        let f: f64 = text.parse().map_err(|_| ErrMode::from_input(input).cut())?;
        Ok(Value::Float(f))
    } else {
        let i: i64 = text.parse().map_err(|_| ErrMode::from_input(input).cut())?;
        Ok(Value::Int(i))
    }
}

fn float_literal(input: &mut &str) -> ModalResult<f64> {
    (
        take_while(1.., |c: char| c.is_ascii_digit()),
        '.',
        take_while(1.., |c: char| c.is_ascii_digit()),
    )
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

fn literal(input: &mut &str) -> ModalResult<Value> {
    ws.parse_next(input)?;
    alt((
        string_literal.map(Value::String),
        keyword("true").value(Value::Bool(true)),
        keyword("false").value(Value::Bool(false)),
        negative_number,
        float_literal.map(Value::Float),
        dec_int::<_, i64, _>.map(Value::Int),
    ))
    .context(StrContext::Expected(StrContextValue::Description("literal")))
    .parse_next(input)
}

// -- Comparison operators ---------------------------------------------------

fn compare_op(input: &mut &str) -> ModalResult<CompareOp> {
    ws.parse_next(input)?;
    alt((
        ">=".value(CompareOp::Gte),
        ">".value(CompareOp::Gt),
        "<=".value(CompareOp::Lte),
        "<".value(CompareOp::Lt),
        "==".value(CompareOp::Eq),
        "!=".value(CompareOp::Neq),
    ))
    .parse_next(input)
}

// -- Conditions (precedence: or < and < not < primary) ----------------------

fn primary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    alt((delimited('(', condition, (ws, cut_err(')'))), comparison_or_fact))
        .context(StrContext::Expected(StrContextValue::Description(
            "condition",
        )))
        .parse_next(input)
}

fn comparison_or_fact(input: &mut &str) -> ModalResult<Expr> {
    let name = ident.parse_next(input)?;
    let checkpoint = input.checkpoint();
    if let Ok(op) = compare_op.parse_next(input) {
        let value = cut_err(literal).parse_next(input)?;
        Ok(Expr::Compare {
            field: name.to_owned(),
            op,
            value,
        })
    } else {
        input.reset(&checkpoint);
        Ok(Expr::Fact(name.to_owned()))
    }
}

fn unary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    if opt(keyword("not")).parse_next(input)?.is_some() {
        let inner = cut_err(unary).parse_next(input)?;
        Ok(Expr::Not(Box::new(inner)))
    } else {
        primary(input)
    }
}

fn and_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = unary(input)?;
    let rest: Vec<Expr> =
        repeat(0.., preceded((ws, keyword("and")), cut_err(unary))).parse_next(input)?;
    Ok(rest
        .into_iter()
        .fold(first, |acc, r| Expr::And(Box::new(acc), Box::new(r))))
}

fn or_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = and_expr(input)?;
    let rest: Vec<Expr> =
        repeat(0.., preceded((ws, keyword("or")), cut_err(and_expr))).parse_next(input)?;
    Ok(rest
        .into_iter()
        .fold(first, |acc, r| Expr::Or(Box::new(acc), Box::new(r))))
}

pub(super) fn condition(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    terminated(or_expr, ws).parse_next(input)
}

// -- Actions ----------------------------------------------------------------

fn operand(input: &mut &str) -> ModalResult<Operand> {
    ws.parse_next(input)?;
    alt((
        literal.map(Operand::Literal),
        ident.map(|name: &str| Operand::Fact(name.to_owned())),
    ))
    .context(StrContext::Expected(StrContextValue::Description("operand")))
    .parse_next(input)
}

fn sign(input: &mut &str) -> ModalResult<Sign> {
    ws.parse_next(input)?;
    alt(('+'.value(Sign::Add), '-'.value(Sign::Sub))).parse_next(input)
}

fn assignment(input: &mut &str) -> ModalResult<Statement> {
    let target = ident.parse_next(input)?;
    ws.parse_next(input)?;
    // `==` is a comparison, not an assignment.
    ('=', not('=')).parse_next(input)?;
    let first = cut_err(operand).parse_next(input)?;
    let rest: Vec<(Sign, Operand)> = repeat(0.., (sign, cut_err(operand))).parse_next(input)?;
    Ok(Statement::Assign {
        target: target.to_owned(),
        first,
        rest,
    })
}

fn removal(input: &mut &str) -> ModalResult<Statement> {
    keyword("remove").parse_next(input)?;
    ws.parse_next(input)?;
    let target = cut_err(ident)
        .context(StrContext::Expected(StrContextValue::Description(
            "fact name",
        )))
        .parse_next(input)?;
    Ok(Statement::Remove(target.to_owned()))
}

pub(super) fn statement(input: &mut &str) -> ModalResult<Statement> {
    ws.parse_next(input)?;
    // `remove` is also a valid fact name, so an assignment to it wins.
    terminated(alt((assignment, removal)), ws)
        .context(StrContext::Expected(StrContextValue::Description(
            "action",
        )))
        .parse_next(input)
}
