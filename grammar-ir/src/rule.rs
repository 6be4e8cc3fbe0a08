//! The rule algebra.
//!
//! A [`Rule`] is built bottom-up with the constructor functions in this
//! module:
//!
//! ```
//! # use grammar_ir::rule::{many, or, sep_by, seq, sym};
//! # fn main() -> Result<(), grammar_ir::Error> {
//! let call = seq([
//!     sym("id"),
//!     sym("("),
//!     sep_by(sym(","), sym("expr")),
//!     sym(")"),
//! ]);
//! let expr = or([sym("num"), sym("id"), call])?;
//! let block = seq([sym("{"), many(sym("stmt")), sym("}")]);
//!
//! assert_eq!(expr.to_string(), "num | id | id ( sepBy(,, expr) )");
//! # let _ = block;
//! # Ok(())
//! # }
//! ```
//!
//! Symbol references are not resolved here. A rule can refer to names that
//! are defined later, or to itself; that is checked by
//! [`Grammar::validate`][crate::Grammar::validate].

use std::{
    fmt::{
        self,
        Display,
    },
    ops::BitOr,
};

use itertools::Itertools;

use crate::{
    error::Error,
    path::Step,
    symbol::Symbol,
};

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Rule {
    /// Reference to a token or a named rule.
    Sym(Symbol),
    /// Match all sub-rules in order. The empty sequence matches the empty
    /// string.
    Seq(Vec<Rule>),
    /// Ordered alternatives. Earlier alternatives have priority.
    Or(Alternatives),
    /// Zero or more repetitions. Built by [`many`].
    Many0(Box<Rule>),
    /// One or more repetitions. Built by [`some`].
    Many1(Box<Rule>),
    /// Zero or one occurrence. Built by [`option`].
    Optional(Box<Rule>),
    /// Zero or more elements with separators between them. Built by
    /// [`sep_by`].
    SepBy(Box<SepBy>),
    /// One or more elements with separators between them. Built by
    /// [`sep_by1`].
    SepBy1(Box<SepBy>),
    /// Precedence annotation. Built by [`prec`], [`prec_left`] and
    /// [`prec_right`].
    Prec(Box<Prec>),
}

/// The alternatives of an [`Rule::Or`]. Never empty.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Alternatives(Vec<Rule>);

impl Alternatives {
    pub fn new(rules: Vec<Rule>) -> Result<Self, Error> {
        if rules.is_empty() {
            return Err(Error::InvalidArity {
                constructor: "or",
                expected: 1,
                got: 0,
            });
        }
        Ok(Self(rules))
    }

    pub fn as_slice(&self) -> &[Rule] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_vec(self) -> Vec<Rule> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Alternatives {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct SepBy {
    pub sep: Rule,
    pub rule: Rule,
}

#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq)]
pub enum Assoc {
    #[default]
    None,
    Left,
    Right,
}

/// Precedence level and associativity. The level is never interpreted by
/// this crate.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct Precedence {
    pub level: i32,
    pub assoc: Assoc,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Prec {
    pub precedence: Precedence,
    pub rule: Rule,
}

pub fn sym(name: impl Into<Symbol>) -> Rule {
    Rule::Sym(name.into())
}

pub fn seq<I>(rules: I) -> Rule
where
    I: IntoIterator,
    I::Item: Into<Rule>,
{
    Rule::Seq(rules.into_iter().map(Into::into).collect())
}

/// # Errors
///
/// Fails with [`Error::InvalidArity`] if `rules` is empty.
pub fn or<I>(rules: I) -> Result<Rule, Error>
where
    I: IntoIterator,
    I::Item: Into<Rule>,
{
    let rules = rules.into_iter().map(Into::into).collect();
    Ok(Rule::Or(Alternatives::new(rules)?))
}

pub fn many(rule: impl Into<Rule>) -> Rule {
    Rule::Many0(Box::new(rule.into()))
}

pub fn some(rule: impl Into<Rule>) -> Rule {
    Rule::Many1(Box::new(rule.into()))
}

pub fn option(rule: impl Into<Rule>) -> Rule {
    Rule::Optional(Box::new(rule.into()))
}

pub fn sep_by(sep: impl Into<Rule>, rule: impl Into<Rule>) -> Rule {
    Rule::SepBy(Box::new(SepBy {
        sep: sep.into(),
        rule: rule.into(),
    }))
}

pub fn sep_by1(sep: impl Into<Rule>, rule: impl Into<Rule>) -> Rule {
    Rule::SepBy1(Box::new(SepBy {
        sep: sep.into(),
        rule: rule.into(),
    }))
}

pub fn prec(level: i32, rule: impl Into<Rule>) -> Rule {
    prec_assoc(level, Assoc::None, rule)
}

pub fn prec_left(level: i32, rule: impl Into<Rule>) -> Rule {
    prec_assoc(level, Assoc::Left, rule)
}

pub fn prec_right(level: i32, rule: impl Into<Rule>) -> Rule {
    prec_assoc(level, Assoc::Right, rule)
}

pub fn prec_assoc(level: i32, assoc: Assoc, rule: impl Into<Rule>) -> Rule {
    Rule::Prec(Box::new(Prec {
        precedence: Precedence { level, assoc },
        rule: rule.into(),
    }))
}

impl Rule {
    /// Direct sub-rules, in order, together with their position.
    pub fn children(&self) -> Vec<(Step, &Rule)> {
        match self {
            Rule::Sym(_) => vec![],
            Rule::Seq(rules) => {
                rules
                    .iter()
                    .enumerate()
                    .map(|(i, rule)| (Step::Seq(i), rule))
                    .collect()
            }
            Rule::Or(alternatives) => {
                alternatives
                    .iter()
                    .enumerate()
                    .map(|(i, rule)| (Step::Or(i), rule))
                    .collect()
            }
            Rule::Many0(rule) => vec![(Step::Many0, &**rule)],
            Rule::Many1(rule) => vec![(Step::Many1, &**rule)],
            Rule::Optional(rule) => vec![(Step::Optional, &**rule)],
            Rule::SepBy(sep_by) | Rule::SepBy1(sep_by) => {
                vec![
                    (Step::Separator, &sep_by.sep),
                    (Step::Element, &sep_by.rule),
                ]
            }
            Rule::Prec(prec) => vec![(Step::Prec, &prec.rule)],
        }
    }

    /// Every symbol referenced in this tree, depth-first and left to right.
    /// Named rules are not followed.
    pub fn symbols(&self) -> Symbols<'_> {
        Symbols { stack: vec![self] }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Rule::Sym(symbol) => Some(symbol),
            _ => None,
        }
    }
}

pub struct Symbols<'a> {
    stack: Vec<&'a Rule>,
}

impl<'a> Iterator for Symbols<'a> {
    type Item = &'a Symbol;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(rule) = self.stack.pop() {
            if let Rule::Sym(symbol) = rule {
                return Some(symbol);
            }
            self.stack
                .extend(rule.children().into_iter().rev().map(|(_, child)| child));
        }
        None
    }
}

impl From<Symbol> for Rule {
    fn from(value: Symbol) -> Self {
        Rule::Sym(value)
    }
}

impl<'a> From<&'a str> for Rule {
    fn from(value: &'a str) -> Self {
        Rule::Sym(value.into())
    }
}

impl From<String> for Rule {
    fn from(value: String) -> Self {
        Rule::Sym(value.into())
    }
}

/// `a | b` builds an alternation, appending to an existing one on either
/// side.
impl BitOr for Rule {
    type Output = Rule;

    fn bitor(self, rhs: Rule) -> Rule {
        let rules = match (self, rhs) {
            (Rule::Or(lhs), Rule::Or(rhs)) => {
                let mut rules = lhs.into_vec();
                rules.extend(rhs.into_vec());
                rules
            }
            (Rule::Or(lhs), rhs) => {
                let mut rules = lhs.into_vec();
                rules.push(rhs);
                rules
            }
            (lhs, Rule::Or(rhs)) => {
                let mut rules = rhs.into_vec();
                rules.insert(0, lhs);
                rules
            }
            (lhs, rhs) => vec![lhs, rhs],
        };
        Rule::Or(Alternatives(rules))
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Position {
    Top,
    Seq,
    Postfix,
}

fn write_rule(f: &mut fmt::Formatter, rule: &Rule, position: Position) -> fmt::Result {
    match rule {
        Rule::Sym(symbol) => write!(f, "{symbol}"),
        Rule::Seq(rules) if rules.is_empty() => write!(f, "()"),
        Rule::Seq(rules) if rules.len() == 1 => write_rule(f, &rules[0], position),
        Rule::Seq(rules) => {
            let parens = position == Position::Postfix;
            if parens {
                write!(f, "(")?;
            }
            for (i, rule) in rules.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write_rule(f, rule, Position::Seq)?;
            }
            if parens {
                write!(f, ")")?;
            }
            Ok(())
        }
        Rule::Or(alternatives) => {
            let parens = position != Position::Top || alternatives.len() == 1;
            if parens {
                write!(f, "(")?;
            }
            write!(
                f,
                "{}",
                alternatives
                    .iter()
                    .format_with(" | ", |rule, f| f(&Inner(rule, Position::Seq)))
            )?;
            if parens {
                write!(f, ")")?;
            }
            Ok(())
        }
        Rule::Many0(rule) => {
            write_rule(f, rule, Position::Postfix)?;
            write!(f, "*")
        }
        Rule::Many1(rule) => {
            write_rule(f, rule, Position::Postfix)?;
            write!(f, "+")
        }
        Rule::Optional(rule) => {
            write_rule(f, rule, Position::Postfix)?;
            write!(f, "?")
        }
        Rule::SepBy(sep_by) => {
            write!(
                f,
                "sepBy({}, {})",
                Inner(&sep_by.sep, Position::Top),
                Inner(&sep_by.rule, Position::Top)
            )
        }
        Rule::SepBy1(sep_by) => {
            write!(
                f,
                "sepBy1({}, {})",
                Inner(&sep_by.sep, Position::Top),
                Inner(&sep_by.rule, Position::Top)
            )
        }
        Rule::Prec(prec) => {
            let name = match prec.precedence.assoc {
                Assoc::None => "prec",
                Assoc::Left => "prec_left",
                Assoc::Right => "prec_right",
            };
            write!(
                f,
                "{name}({}, {})",
                prec.precedence.level,
                Inner(&prec.rule, Position::Top)
            )
        }
    }
}

struct Inner<'a>(&'a Rule, Position);

impl<'a> Display for Inner<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_rule(f, self.0, self.1)
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_rule(f, self, Position::Top)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn it_builds_matching_variants() {
        let a = sym("a");
        let b = sym("b");

        assert_eq!(a, Rule::Sym("a".into()));
        assert_eq!(
            seq([a.clone(), b.clone()]),
            Rule::Seq(vec![a.clone(), b.clone()])
        );
        assert_eq!(
            or([a.clone(), b.clone()]).unwrap(),
            Rule::Or(Alternatives(vec![a.clone(), b.clone()]))
        );
        assert_eq!(many(a.clone()), Rule::Many0(Box::new(a.clone())));
        assert_eq!(some(a.clone()), Rule::Many1(Box::new(a.clone())));
        assert_eq!(option(a.clone()), Rule::Optional(Box::new(a.clone())));
        assert_eq!(
            sep_by(b.clone(), a.clone()),
            Rule::SepBy(Box::new(SepBy {
                sep: b.clone(),
                rule: a.clone(),
            }))
        );
        assert_eq!(
            sep_by1(b.clone(), a.clone()),
            Rule::SepBy1(Box::new(SepBy {
                sep: b.clone(),
                rule: a.clone(),
            }))
        );
        assert_eq!(
            prec(3, a.clone()),
            Rule::Prec(Box::new(Prec {
                precedence: Precedence {
                    level: 3,
                    assoc: Assoc::None,
                },
                rule: a.clone(),
            }))
        );
        assert_eq!(
            prec_right(-1, a.clone()),
            Rule::Prec(Box::new(Prec {
                precedence: Precedence {
                    level: -1,
                    assoc: Assoc::Right,
                },
                rule: a,
            }))
        );
    }

    #[test]
    fn it_rejects_empty_alternation() {
        let error = or(Vec::<Rule>::new()).unwrap_err();
        assert_eq!(
            error,
            Error::InvalidArity {
                constructor: "or",
                expected: 1,
                got: 0,
            }
        );
    }

    #[test]
    fn it_keeps_single_alternatives_distinct_from_symbols() {
        let single = or([sym("a")]).unwrap();
        assert!(matches!(&single, Rule::Or(alternatives) if alternatives.len() == 1));
        assert_ne!(single, sym("a"));
    }

    #[test]
    fn it_flattens_alternations_with_bitor() {
        let rule = (sym("a") | sym("b")) | (sym("c") | sym("d"));
        assert_eq!(
            rule,
            or([sym("a"), sym("b"), sym("c"), sym("d")]).unwrap()
        );

        let rule = sym("a") | (sym("b") | sym("c"));
        assert_eq!(rule, or([sym("a"), sym("b"), sym("c")]).unwrap());
    }

    #[test]
    fn it_accepts_strings_as_symbols() {
        assert_eq!(seq(["a", "b"]), seq([sym("a"), sym("b")]));
        assert_eq!(many("stmt"), many(sym("stmt")));
    }

    #[test]
    fn it_lists_children_in_order() {
        let rule = sep_by1(sym(","), seq([sym("a"), option(sym("b"))]));
        let steps = rule
            .children()
            .into_iter()
            .map(|(step, _)| step)
            .collect::<Vec<_>>();
        assert_eq!(steps, vec![Step::Separator, Step::Element]);
    }

    #[test]
    fn it_walks_all_symbols() {
        let rule = seq([
            sym("{"),
            many(or([sym("stmt"), prec(1, sym("expr"))]).unwrap()),
            sep_by(sym(";"), sym("item")),
            sym("}"),
        ]);
        let symbols = rule.symbols().map(Symbol::as_str).collect::<Vec<_>>();
        assert_eq!(symbols, vec!["{", "stmt", "expr", ";", "item", "}"]);
    }

    #[test]
    fn it_displays_rules() {
        let rule = seq([
            sym("a"),
            many(seq([sym("b"), sym("c")])),
            option(sym("a") | sym("b")),
            some(sym("d")),
        ]);
        assert_eq!(rule.to_string(), "a (b c)* (a | b)? d+");

        let rule = prec_left(1, seq([sym("expr"), sym("+"), sym("expr")])) | sym("num");
        assert_eq!(rule.to_string(), "prec_left(1, expr + expr) | num");

        assert_eq!(sep_by1(sym(","), sym("x")).to_string(), "sepBy1(,, x)");
        assert_eq!(seq(Vec::<Rule>::new()).to_string(), "()");
        assert_eq!(or([sym("a")]).unwrap().to_string(), "(a)");
    }
}
