use itertools::Itertools;

use crate::{
    path::RulePath,
    symbol::Symbol,
};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("'{constructor}' expects at least {expected} sub-rule(s), but got {got}")]
    InvalidArity {
        constructor: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("token '{0}' is already declared")]
    DuplicateToken(Symbol),

    #[error("symbol '{name}' is undefined (at {path})")]
    UndefinedSymbol { name: Symbol, path: RulePath },

    #[error("grammar has {} error(s):\n{}", .0.len(), bullet_list(.0))]
    MultipleValidationErrors(Vec<Error>),
}

impl Error {
    /// Iterates over the undefined symbols reported by this error, looking
    /// into [`Error::MultipleValidationErrors`].
    pub fn undefined_symbols(&self) -> Box<dyn Iterator<Item = (&Symbol, &RulePath)> + '_> {
        match self {
            Error::UndefinedSymbol { name, path } => Box::new(std::iter::once((name, path))),
            Error::MultipleValidationErrors(errors) => {
                Box::new(errors.iter().flat_map(Error::undefined_symbols))
            }
            _ => Box::new(std::iter::empty()),
        }
    }
}

fn bullet_list(errors: &[Error]) -> String {
    errors.iter().map(|error| format!("  - {error}")).join("\n")
}
