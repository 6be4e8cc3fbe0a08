//! A small intermediate representation for context-free grammars.
//!
//! Grammars are authored programmatically from [`Rule`] trees: sequences,
//! ordered alternatives, repetitions, options, separated lists and
//! precedence annotations. A [`Grammar`] collects those trees under rule
//! names together with the declared tokens. Validating it yields a
//! [`Validated`] grammar without dangling references, which is what a parser
//! generator consumes. [`Validated::lower`] desugars it into plain [`Bnf`].
//!
//! This crate doesn't parse anything. It only describes grammars.
//!
//! # Example
//!
//! ```
//! # use grammar_ir::{Grammar, Error, rule::{sep_by1, seq, many, sym}};
//! # fn main() -> Result<(), Error> {
//! let mut grammar = Grammar::new();
//! grammar.declare_tokens(["NUM", "PLUS", "LBRACE", "RBRACE"])?;
//! grammar.add_start("block");
//!
//! grammar.define_rule("block", seq([sym("LBRACE"), many(sym("stmt")), sym("RBRACE")]));
//! grammar.define_rule("stmt", sep_by1(sym("PLUS"), sym("NUM")));
//!
//! let validated = grammar.validate()?;
//! assert!(validated.warnings().is_empty());
//!
//! let bnf = validated.lower();
//! println!("{bnf}");
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! The crate emits [`tracing`][1] events. Validation warnings are logged at
//! the `warn` level, redefinitions and summaries at `debug`, lowering steps
//! at `trace`.
//!
//! [1]: https://docs.rs/tracing

pub mod bnf;
mod error;
pub mod grammar;
pub mod path;
pub mod rule;
mod symbol;

pub use self::{
    bnf::Bnf,
    error::Error,
    grammar::{
        grammar,
        Diagnostics,
        Grammar,
        Rejected,
        ValidateParameters,
        Validated,
        Warning,
    },
    path::RulePath,
    rule::{
        Assoc,
        Precedence,
        Rule,
    },
    symbol::Symbol,
};
