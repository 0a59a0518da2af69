//! Text form of conditions and actions.
//!
//! Conditions combine comparisons with `and`, `or`, `not` and parentheses:
//!
//! ```text
//! age >= 18 and (member or total > 100.0)
//! ```
//!
//! A bare fact name holds when that fact is `true`. Actions assign or remove
//! one fact each:
//!
//! ```text
//! total = total - 5
//! tags = tags + "vip"
//! remove pending
//! ```
//!
//! `#` starts a comment that runs to the end of the line.

mod error;
mod grammar;

pub use error::ParseError;

use winnow::Parser;

use crate::{Expr, Statement};

/// Parse a condition.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid condition.
pub fn parse_condition(input: &str) -> Result<Expr, ParseError> {
    grammar::condition
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}

/// Parse a single action statement.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid action.
pub fn parse_action(input: &str) -> Result<Statement, ParseError> {
    grammar::statement
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}
