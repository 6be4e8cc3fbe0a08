//! Validation of a grammar.
//!
//! Every rule tree in the table is walked once. Symbol references are checked
//! against the declared tokens and the rule names, but never expanded, so
//! recursive grammars terminate.

use std::collections::HashSet;

use super::Grammar;
use crate::{
    error::Error,
    path::RulePath,
    rule::Rule,
    symbol::Symbol,
};

/// Which warning passes to run.
#[derive(Clone, Debug)]
pub struct ValidateParameters {
    /// Warn about declared tokens that no rule references.
    pub unused_tokens: bool,

    /// Warn about rules that neither another rule nor a start rule refers
    /// to. Only applies when start rules are given.
    pub unreferenced_rules: bool,

    /// Warn about names that are declared both as a token and as a rule.
    pub shadowed: bool,
}

impl Default for ValidateParameters {
    fn default() -> Self {
        Self {
            unused_tokens: true,
            unreferenced_rules: true,
            shadowed: true,
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, derive_more::Display)]
pub enum Warning {
    #[display(fmt = "token '{}' is never used", _0)]
    UnusedToken(Symbol),

    #[display(fmt = "rule '{}' is never referenced", _0)]
    UnreferencedRule(Symbol),

    #[display(fmt = "'{}' is both a token and a rule, the token takes precedence", _0)]
    Shadowed(Symbol),
}

/// Everything found by one validation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// One [`Error::UndefinedSymbol`] per undefined reference.
    pub errors: Vec<Error>,
    pub warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub(super) fn check(grammar: &Grammar, parameters: &ValidateParameters) -> Diagnostics {
    let mut checker = Checker {
        grammar,
        current: None,
        referenced: HashSet::new(),
        referenced_by_others: HashSet::new(),
        diagnostics: Diagnostics::default(),
    };

    for (name, rule) in &grammar.rules {
        let mut path = RulePath::rule(name);
        checker.current = Some(name.as_str());
        checker.walk(rule, &mut path);
    }

    for start in &grammar.starts {
        if !grammar.is_rule(start.as_str()) {
            checker.diagnostics.errors.push(Error::UndefinedSymbol {
                name: start.clone(),
                path: RulePath::start(),
            });
        }
    }

    if parameters.unused_tokens {
        for token in &grammar.tokens {
            if !checker.referenced.contains(token.as_str()) {
                checker
                    .diagnostics
                    .warnings
                    .push(Warning::UnusedToken(token.clone()));
            }
        }
    }

    if parameters.unreferenced_rules && !grammar.starts.is_empty() {
        for name in grammar.rules.keys() {
            if !checker.referenced_by_others.contains(name.as_str())
                && !grammar.starts.contains(name.as_str())
            {
                checker
                    .diagnostics
                    .warnings
                    .push(Warning::UnreferencedRule(name.clone()));
            }
        }
    }

    if parameters.shadowed {
        for name in grammar.rules.keys() {
            if grammar.is_token(name.as_str()) {
                checker
                    .diagnostics
                    .warnings
                    .push(Warning::Shadowed(name.clone()));
            }
        }
    }

    checker.diagnostics
}

struct Checker<'g> {
    grammar: &'g Grammar,
    /// Rule whose body is being walked.
    current: Option<&'g str>,
    referenced: HashSet<&'g str>,
    /// Names referenced from the body of a rule other than themselves.
    referenced_by_others: HashSet<&'g str>,
    diagnostics: Diagnostics,
}

impl<'g> Checker<'g> {
    fn walk(&mut self, rule: &'g Rule, path: &mut RulePath) {
        match rule {
            Rule::Sym(symbol) => {
                self.referenced.insert(symbol.as_str());
                if self.current != Some(symbol.as_str()) {
                    self.referenced_by_others.insert(symbol.as_str());
                }
                if !self.grammar.is_token(symbol.as_str()) && !self.grammar.is_rule(symbol.as_str())
                {
                    self.diagnostics.errors.push(Error::UndefinedSymbol {
                        name: symbol.clone(),
                        path: path.clone(),
                    });
                }
            }
            _ => {
                for (step, child) in rule.children() {
                    path.push(step);
                    self.walk(child, path);
                    path.pop();
                }
            }
        }
    }
}
