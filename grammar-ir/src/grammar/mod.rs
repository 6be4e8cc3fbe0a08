//! The grammar aggregate.
//!
//! A [`Grammar`] collects the declared tokens, the named rules and the start
//! rules. It stays open for modification until [`Grammar::validate`] turns
//! it into a read-only [`Validated`] grammar, which is what downstream
//! generators consume.

mod validate;

use std::ops::Deref;

use indexmap::{
    map::Entry,
    IndexMap,
    IndexSet,
};

pub use self::validate::{
    Diagnostics,
    ValidateParameters,
    Warning,
};
use crate::{
    bnf::Bnf,
    error::Error,
    rule::Rule,
    symbol::Symbol,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grammar {
    tokens: IndexSet<Symbol>,
    rules: IndexMap<Symbol, Rule>,
    starts: IndexSet<Symbol>,
}

/// Builds a grammar from tokens, start rules and rules in one go.
///
/// # Errors
///
/// Fails with [`Error::DuplicateToken`] if a token is listed twice.
pub fn grammar<N, R>(tokens: &[&str], start: &[&str], rules: R) -> Result<Grammar, Error>
where
    N: Into<Symbol>,
    R: IntoIterator<Item = (N, Rule)>,
{
    let mut grammar = Grammar::new();
    grammar.declare_tokens(tokens.iter().copied())?;
    for &name in start {
        grammar.add_start(name);
    }
    for (name, rule) in rules {
        grammar.define_rule(name, rule);
    }
    Ok(grammar)
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds tokens to the grammar.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::DuplicateToken`] if a name is already declared, or
    /// appears twice in `names`. The token set is left unchanged in that case.
    pub fn declare_tokens<I>(&mut self, names: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        let mut new_tokens = IndexSet::new();
        for name in names {
            let name = name.into();
            if self.tokens.contains(&name) || new_tokens.contains(&name) {
                return Err(Error::DuplicateToken(name));
            }
            new_tokens.insert(name);
        }

        tracing::trace!(count = new_tokens.len(), "declaring tokens");
        self.tokens.extend(new_tokens);
        Ok(())
    }

    /// Defines a rule, replacing any previous definition of the same name.
    ///
    /// Returns the rule that was replaced.
    pub fn define_rule(&mut self, name: impl Into<Symbol>, rule: Rule) -> Option<Rule> {
        match self.rules.entry(name.into()) {
            Entry::Occupied(mut entry) => {
                tracing::debug!(rule = %entry.key(), "redefining rule");
                Some(entry.insert(rule))
            }
            Entry::Vacant(entry) => {
                entry.insert(rule);
                None
            }
        }
    }

    /// Designates a start rule. Adding the same start rule twice has no
    /// effect.
    pub fn add_start(&mut self, name: impl Into<Symbol>) {
        self.starts.insert(name.into());
    }

    /// Merges an independently built grammar into this one.
    ///
    /// Tokens and start rules are unioned. Rules in `other` replace rules of
    /// the same name in `self`.
    pub fn merge(&mut self, other: Grammar) {
        tracing::debug!(
            tokens = other.tokens.len(),
            rules = other.rules.len(),
            "merging grammar"
        );
        self.tokens.extend(other.tokens);
        for (name, rule) in other.rules {
            self.define_rule(name, rule);
        }
        self.starts.extend(other.starts);
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Symbol> {
        self.tokens.iter()
    }

    pub fn rules(&self) -> impl Iterator<Item = (&Symbol, &Rule)> {
        self.rules.iter()
    }

    pub fn starts(&self) -> impl Iterator<Item = &Symbol> {
        self.starts.iter()
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn is_token(&self, name: &str) -> bool {
        self.tokens.contains(name)
    }

    pub fn is_rule(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn num_tokens(&self) -> usize {
        self.tokens.len()
    }

    pub fn num_rules(&self) -> usize {
        self.rules.len()
    }

    /// Validates the grammar with the default [`ValidateParameters`].
    pub fn validate(self) -> Result<Validated, Rejected> {
        self.validate_with(&Default::default())
    }

    /// Validates the grammar.
    ///
    /// On success the grammar becomes [`Validated`]. Otherwise the grammar is
    /// handed back unchanged inside [`Rejected`], together with every
    /// undefined symbol found.
    pub fn validate_with(self, parameters: &ValidateParameters) -> Result<Validated, Rejected> {
        let Diagnostics { errors, warnings } = self.check_with(parameters);

        tracing::debug!(
            errors = errors.len(),
            warnings = warnings.len(),
            "validated grammar"
        );
        for warning in &warnings {
            tracing::warn!("{}", warning);
        }

        if errors.is_empty() {
            Ok(Validated {
                grammar: self,
                warnings,
            })
        }
        else {
            Err(Rejected {
                grammar: self,
                error: Error::MultipleValidationErrors(errors),
                warnings,
            })
        }
    }

    /// Runs validation without consuming the grammar.
    pub fn check(&self) -> Diagnostics {
        self.check_with(&Default::default())
    }

    pub fn check_with(&self, parameters: &ValidateParameters) -> Diagnostics {
        validate::check(self, parameters)
    }
}

/// A grammar without undefined symbols.
///
/// Dereferences to the read-only [`Grammar`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validated {
    grammar: Grammar,
    warnings: Vec<Warning>,
}

impl Validated {
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Reopens the grammar for modification.
    pub fn into_grammar(self) -> Grammar {
        self.grammar
    }

    /// Lowers the grammar into plain BNF.
    pub fn lower(&self) -> Bnf {
        crate::bnf::lower(self)
    }
}

impl Deref for Validated {
    type Target = Grammar;

    fn deref(&self) -> &Grammar {
        &self.grammar
    }
}

/// A grammar that failed validation.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct Rejected {
    pub grammar: Grammar,
    pub error: Error,
    pub warnings: Vec<Warning>,
}

impl Rejected {
    pub fn into_grammar(self) -> Grammar {
        self.grammar
    }
}

impl From<Rejected> for Error {
    fn from(rejected: Rejected) -> Self {
        rejected.error
    }
}
