use thiserror::Error;

use crate::parse::ParseError;
use crate::{EngineError, GroupKindError, ValidationError};

/// Unified error type covering rule construction and firing.
///
/// Returned by [`ExpressionRuleFactory`](crate::ExpressionRuleFactory) and
/// convertible from every narrower error in the crate, so callers can use `?`
/// across building and firing.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    GroupKind(#[from] GroupKindError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("composite rule '{name}' has no composing rules")]
    EmptyGroup { name: String },

    #[error("a rule named '{name}' is already registered")]
    DuplicateRule { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_messages() {
        let err = RulesError::from(GroupKindError {
            name: "Nope".into(),
        });
        assert_eq!(err.to_string(), "unknown composite rule type 'Nope'");

        let err = RulesError::from(ValidationError::EmptyName);
        assert_eq!(err.to_string(), ValidationError::EmptyName.to_string());
    }

    #[test]
    fn own_messages() {
        assert_eq!(
            RulesError::EmptyGroup { name: "g".into() }.to_string(),
            "composite rule 'g' has no composing rules"
        );
        assert_eq!(
            RulesError::DuplicateRule { name: "r".into() }.to_string(),
            "a rule named 'r' is already registered"
        );
    }
}
