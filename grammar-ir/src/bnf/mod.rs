//! Plain BNF lowered from a validated grammar.
//!
//! Repetitions, options and separated lists are desugared into left-recursive
//! nonterminals. Each desugared production is tagged with a [`ProdAction`],
//! so that a generator can still build list values from it.

mod lower;
mod sets;
mod token_set;

use std::fmt::{
    self,
    Display,
};

use itertools::Itertools;

pub(crate) use self::lower::lower;
pub use self::token_set::TokenSet;
use crate::{
    rule::{
        Assoc,
        Precedence,
    },
    symbol::Symbol,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bnf {
    /// Indexed by [`TermId`].
    pub tokens: Vec<Symbol>,
    pub starts: Vec<NontermId>,
    /// Indexed by [`NontermId`]. Named rules come first, in definition order.
    pub nonterms: Vec<Nonterm>,
}

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, derive_more::Display)]
pub struct TermId(pub u32);

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, derive_more::Display)]
pub struct NontermId(pub u32);

impl TermId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl NontermId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum Element {
    Term(TermId),
    Nonterm(NontermId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nonterm {
    pub name: String,
    /// non-empty
    pub prods: Vec<Production>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Production {
    pub action: ProdAction,
    pub prec: Option<Precedence>,
    pub symbols: Vec<Element>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ProdAction {
    #[default]
    None,
    /// `rule*  ->  ε`
    StartMany,
    /// `rule*  ->  rule* rule`
    ContinueMany,
    /// `rule+  ->  rule`
    StartMany1,
    /// `rule+  ->  rule+ rule`
    ContinueMany1,
    /// `rule?  ->  ε`
    EmptyOption,
    /// `rule?  ->  rule`
    NonemptyOption,
    /// `sepBy(sep, rule)  ->  ε`
    EmptySepBy,
    /// `sepBy(sep, rule)  ->  sepBy1(sep, rule)`
    NonemptySepBy,
    /// `sepBy1(sep, rule)  ->  rule`
    StartSepBy1,
    /// `sepBy1(sep, rule)  ->  sepBy1(sep, rule) sep rule`
    ContinueSepBy1,
}

impl Bnf {
    pub fn token(&self, id: TermId) -> &Symbol {
        &self.tokens[id.index()]
    }

    pub fn nonterm(&self, id: NontermId) -> &Nonterm {
        &self.nonterms[id.index()]
    }

    pub fn term_id(&self, name: &str) -> Option<TermId> {
        self.tokens
            .iter()
            .position(|token| token == name)
            .map(|i| TermId(i as u32))
    }

    /// Looks up a nonterminal by name. Named rules are found before generated
    /// nonterminals.
    pub fn nonterm_id(&self, name: &str) -> Option<NontermId> {
        self.nonterms
            .iter()
            .position(|nonterm| nonterm.name == name)
            .map(|i| NontermId(i as u32))
    }

    /// Which nonterminals can derive the empty string, indexed by
    /// [`NontermId`].
    pub fn nullable(&self) -> Vec<bool> {
        sets::gen_nullable(self)
    }

    /// The terminals that can begin each nonterminal, indexed by
    /// [`NontermId`].
    pub fn first_sets(&self) -> Vec<TokenSet> {
        sets::gen_first(self, &self.nullable())
    }

    fn write_element(&self, f: &mut fmt::Formatter, element: Element) -> fmt::Result {
        match element {
            Element::Term(id) => write!(f, "{}", self.token(id)),
            Element::Nonterm(id) => write!(f, "<{}>", self.nonterm(id).name),
        }
    }

    fn write_production(&self, f: &mut fmt::Formatter, prod: &Production) -> fmt::Result {
        if prod.symbols.is_empty() {
            write!(f, "ε")?;
        }
        for (i, element) in prod.symbols.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            self.write_element(f, *element)?;
        }
        if let Some(precedence) = prod.prec {
            match precedence.assoc {
                Assoc::None => write!(f, " [prec {}]", precedence.level)?,
                Assoc::Left => write!(f, " [prec {} left]", precedence.level)?,
                Assoc::Right => write!(f, " [prec {} right]", precedence.level)?,
            }
        }
        Ok(())
    }
}

/// One `<name> ::= ... | ...` line per nonterminal.
impl Display for Bnf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for nonterm in &self.nonterms {
            write!(
                f,
                "<{}> ::= {}",
                nonterm.name,
                nonterm
                    .prods
                    .iter()
                    .format_with(" | ", |prod, f| f(&ProductionDisplay(self, prod)))
            )?;
            writeln!(f)?;
        }
        Ok(())
    }
}

struct ProductionDisplay<'a>(&'a Bnf, &'a Production);

impl<'a> Display for ProductionDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.write_production(f, self.1)
    }
}
