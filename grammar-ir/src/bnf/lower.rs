use std::collections::HashMap;

use super::{
    Bnf,
    Element,
    NontermId,
    Nonterm,
    ProdAction,
    Production,
    TermId,
};
use crate::{
    grammar::Validated,
    rule::{
        Rule,
        SepBy,
    },
};

enum Slot {
    Placeholder(String),
    Ready(Nonterm),
}

impl Slot {
    fn get_ready(self) -> Nonterm {
        match self {
            // every placeholder is finished before the lowerer returns
            Slot::Placeholder(name) => panic!("placeholder left in nonterms: name={name}"),
            Slot::Ready(nonterm) => nonterm,
        }
    }
}

struct Lowerer<'g> {
    symbols: HashMap<&'g str, Element>,
    slots: Vec<Slot>,
    /// Generated nonterminals, shared by structurally equal sub-rules.
    generated: HashMap<&'g Rule, NontermId>,
    generated_sep_by1: HashMap<&'g SepBy, NontermId>,
}

pub(crate) fn lower(validated: &Validated) -> Bnf {
    let grammar = validated.grammar();
    let mut lowerer = Lowerer {
        symbols: HashMap::new(),
        slots: vec![],
        generated: HashMap::new(),
        generated_sep_by1: HashMap::new(),
    };

    // named rules get the first ids, tokens shadow rules of the same name
    let mut named = Vec::with_capacity(grammar.num_rules());
    for (name, _) in grammar.rules() {
        let id = lowerer.new_placeholder(name.to_string());
        lowerer.symbols.insert(name.as_str(), Element::Nonterm(id));
        named.push(id);
    }
    let tokens = grammar.tokens().cloned().collect::<Vec<_>>();
    for (i, token) in grammar.tokens().enumerate() {
        lowerer
            .symbols
            .insert(token.as_str(), Element::Term(TermId(i as u32)));
    }

    for ((_, rule), id) in grammar.rules().zip(named.iter().copied()) {
        let prods = lowerer.productions(id, rule);
        lowerer.finish_nonterm(id, prods);
    }

    // validation made sure every start rule is defined
    let starts = grammar
        .starts()
        .filter_map(|start| {
            grammar
                .rules()
                .position(|(name, _)| name == start)
                .map(|i| named[i])
        })
        .collect();

    let nonterms = lowerer
        .slots
        .into_iter()
        .map(Slot::get_ready)
        .collect::<Vec<_>>();

    tracing::debug!(
        tokens = tokens.len(),
        nonterms = nonterms.len(),
        "lowered grammar"
    );

    Bnf {
        tokens,
        starts,
        nonterms,
    }
}

impl<'g> Lowerer<'g> {
    fn new_placeholder(&mut self, name: String) -> NontermId {
        let id = NontermId(self.slots.len() as u32);
        self.slots.push(Slot::Placeholder(name));
        id
    }

    fn finish_nonterm(&mut self, id: NontermId, prods: Vec<Production>) {
        let slot = self
            .slots
            .get_mut(id.index())
            .unwrap_or_else(|| panic!("invalid nonterm id: {id}"));
        let name = match slot {
            Slot::Placeholder(name) => std::mem::take(name),
            Slot::Ready(_) => panic!("nonterm finished twice: id={id}"),
        };
        tracing::trace!(%id, %name, prods = prods.len(), "finished nonterm");
        *slot = Slot::Ready(Nonterm { name, prods });
    }

    /// Lowers `rule` into a nonterminal named after it. Equal rules are
    /// lowered once.
    fn generated(&mut self, rule: &'g Rule) -> NontermId {
        if let Rule::SepBy1(sep_by) = rule {
            return self.generated_sep_by1(sep_by);
        }
        if let Some(&id) = self.generated.get(rule) {
            return id;
        }
        let id = self.new_placeholder(rule.to_string());
        self.generated.insert(rule, id);
        let prods = self.productions(id, rule);
        self.finish_nonterm(id, prods);
        id
    }

    /// Lowers a separated list into a `sepBy1` nonterminal.
    fn generated_sep_by1(&mut self, sep_by: &'g SepBy) -> NontermId {
        if let Some(&id) = self.generated_sep_by1.get(sep_by) {
            return id;
        }
        let id = self.new_placeholder(format!("sepBy1({}, {})", sep_by.sep, sep_by.rule));
        self.generated_sep_by1.insert(sep_by, id);
        let prods = self.sep_by1_productions(id, sep_by);
        self.finish_nonterm(id, prods);
        id
    }

    /// Productions of the nonterminal `id` whose body is `rule`.
    fn productions(&mut self, id: NontermId, rule: &'g Rule) -> Vec<Production> {
        match rule {
            Rule::Sym(_) | Rule::Seq(_) => vec![self.production(ProdAction::None, rule)],
            Rule::Or(alternatives) => {
                alternatives
                    .iter()
                    .map(|rule| self.production(ProdAction::None, rule))
                    .collect()
            }
            Rule::Many0(rule) => {
                let element = self.element(rule);
                vec![
                    // rule* -> ε
                    Production {
                        action: ProdAction::StartMany,
                        ..Default::default()
                    },
                    // rule* -> rule* rule
                    Production {
                        action: ProdAction::ContinueMany,
                        symbols: vec![Element::Nonterm(id), element],
                        ..Default::default()
                    },
                ]
            }
            Rule::Many1(rule) => {
                let element = self.element(rule);
                vec![
                    // rule+ -> rule
                    Production {
                        action: ProdAction::StartMany1,
                        symbols: vec![element],
                        ..Default::default()
                    },
                    // rule+ -> rule+ rule
                    Production {
                        action: ProdAction::ContinueMany1,
                        symbols: vec![Element::Nonterm(id), element],
                        ..Default::default()
                    },
                ]
            }
            Rule::Optional(rule) => {
                vec![
                    // rule? -> ε
                    Production {
                        action: ProdAction::EmptyOption,
                        ..Default::default()
                    },
                    // rule? -> rule
                    self.production(ProdAction::NonemptyOption, rule),
                ]
            }
            Rule::SepBy(sep_by) => {
                let nonempty = self.generated_sep_by1(sep_by);
                vec![
                    // sepBy(sep, rule) -> ε
                    Production {
                        action: ProdAction::EmptySepBy,
                        ..Default::default()
                    },
                    // sepBy(sep, rule) -> sepBy1(sep, rule)
                    Production {
                        action: ProdAction::NonemptySepBy,
                        symbols: vec![Element::Nonterm(nonempty)],
                        ..Default::default()
                    },
                ]
            }
            Rule::SepBy1(sep_by) => self.sep_by1_productions(id, sep_by),
            Rule::Prec(prec) => {
                let mut prods = self.productions(id, &prec.rule);
                for prod in &mut prods {
                    prod.prec = Some(prec.precedence);
                }
                prods
            }
        }
    }

    fn sep_by1_productions(&mut self, id: NontermId, sep_by: &'g SepBy) -> Vec<Production> {
        let sep = self.element(&sep_by.sep);
        let element = self.element(&sep_by.rule);
        vec![
            // sepBy1(sep, rule) -> rule
            Production {
                action: ProdAction::StartSepBy1,
                symbols: vec![element],
                ..Default::default()
            },
            // sepBy1(sep, rule) -> sepBy1(sep, rule) sep rule
            Production {
                action: ProdAction::ContinueSepBy1,
                symbols: vec![Element::Nonterm(id), sep, element],
                ..Default::default()
            },
        ]
    }

    /// A single production matching `rule`.
    fn production(&mut self, action: ProdAction, rule: &'g Rule) -> Production {
        match rule {
            Rule::Seq(rules) => {
                Production {
                    action,
                    symbols: rules.iter().map(|rule| self.element(rule)).collect(),
                    ..Default::default()
                }
            }
            Rule::Prec(prec) => {
                let mut prod = self.production(action, &prec.rule);
                prod.prec = Some(prec.precedence);
                prod
            }
            _ => {
                Production {
                    action,
                    symbols: vec![self.element(rule)],
                    ..Default::default()
                }
            }
        }
    }

    /// A single symbol matching `rule`.
    fn element(&mut self, rule: &'g Rule) -> Element {
        match rule {
            Rule::Sym(symbol) => {
                *self
                    .symbols
                    .get(symbol.as_str())
                    .unwrap_or_else(|| panic!("unresolved symbol in validated grammar: {symbol}"))
            }
            _ => Element::Nonterm(self.generated(rule)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        grammar::grammar,
        rule::{
            many,
            option,
            prec_left,
            sep_by,
            sep_by1,
            seq,
            some,
            sym,
            Assoc,
            Precedence,
        },
    };

    fn nt(id: u32) -> Element {
        Element::Nonterm(NontermId(id))
    }

    fn t(id: u32) -> Element {
        Element::Term(TermId(id))
    }

    #[test]
    fn it_lowers_separated_lists() {
        let bnf = grammar(
            &["NUM", "PLUS"],
            &["expr"],
            [("expr", sep_by1(sym("PLUS"), sym("NUM")))],
        )
        .unwrap()
        .validate()
        .unwrap()
        .lower();

        assert_eq!(
            bnf,
            Bnf {
                tokens: vec!["NUM".into(), "PLUS".into()],
                starts: vec![NontermId(0)],
                nonterms: vec![Nonterm {
                    name: "expr".to_owned(),
                    prods: vec![
                        Production {
                            action: ProdAction::StartSepBy1,
                            symbols: vec![t(0)],
                            ..Default::default()
                        },
                        Production {
                            action: ProdAction::ContinueSepBy1,
                            symbols: vec![nt(0), t(1), t(0)],
                            ..Default::default()
                        },
                    ],
                }],
            }
        );
    }

    #[test]
    fn it_lowers_nested_repetitions_into_generated_nonterms() {
        let bnf = grammar(
            &["{", "}", "x", ","],
            &[],
            [
                ("block", seq([sym("{"), many(sym("stmt")), sym("}")])),
                ("stmt", sym("x") | seq([sym("x"), sep_by(sym(","), sym("x"))])),
            ],
        )
        .unwrap()
        .validate()
        .unwrap()
        .lower();

        let names = bnf
            .nonterms
            .iter()
            .map(|nonterm| nonterm.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["block", "stmt", "stmt*", "sepBy(,, x)", "sepBy1(,, x)"]
        );

        // block -> { stmt* }
        assert_eq!(bnf.nonterms[0].prods[0].symbols, vec![t(0), nt(2), t(1)]);
        // stmt -> x | x sepBy(, x)
        assert_eq!(bnf.nonterms[1].prods[0].symbols, vec![t(2)]);
        assert_eq!(bnf.nonterms[1].prods[1].symbols, vec![t(2), nt(3)]);
        // stmt* -> ε | stmt* stmt
        assert_eq!(bnf.nonterms[2].prods[0].symbols, vec![]);
        assert_eq!(bnf.nonterms[2].prods[1].symbols, vec![nt(2), nt(1)]);
        // sepBy(, x) -> ε | sepBy1(, x)
        assert_eq!(bnf.nonterms[3].prods[0].action, ProdAction::EmptySepBy);
        assert_eq!(bnf.nonterms[3].prods[1].symbols, vec![nt(4)]);
        // sepBy1(, x) -> x | sepBy1(, x) , x
        assert_eq!(bnf.nonterms[4].prods[1].symbols, vec![nt(4), t(3), t(2)]);
    }

    #[test]
    fn it_lowers_options_and_some() {
        let bnf = grammar(
            &["a", "b"],
            &[],
            [("r", seq([option(seq([sym("a"), sym("b")])), some(sym("b"))]))],
        )
        .unwrap()
        .validate()
        .unwrap()
        .lower();

        let option = &bnf.nonterms[1];
        assert_eq!(option.name, "(a b)?");
        assert_eq!(option.prods[0].action, ProdAction::EmptyOption);
        assert_eq!(option.prods[1].action, ProdAction::NonemptyOption);
        assert_eq!(option.prods[1].symbols, vec![t(0), t(1)]);

        let some = &bnf.nonterms[2];
        assert_eq!(some.name, "b+");
        assert_eq!(some.prods[0].symbols, vec![t(1)]);
        assert_eq!(some.prods[1].symbols, vec![nt(2), t(1)]);
    }

    #[test]
    fn it_attaches_precedence_to_productions() {
        let bnf = grammar(
            &["+", "*", "num"],
            &["expr"],
            [(
                "expr",
                prec_left(0, seq([sym("expr"), sym("+"), sym("expr")]))
                    | prec_left(1, seq([sym("expr"), sym("*"), sym("expr")]))
                    | sym("num"),
            )],
        )
        .unwrap()
        .validate()
        .unwrap()
        .lower();

        let prods = &bnf.nonterms[0].prods;
        assert_eq!(prods.len(), 3);
        assert_eq!(
            prods[0].prec,
            Some(Precedence {
                level: 0,
                assoc: Assoc::Left
            })
        );
        assert_eq!(prods[0].symbols, vec![nt(0), t(0), nt(0)]);
        assert_eq!(
            prods[1].prec,
            Some(Precedence {
                level: 1,
                assoc: Assoc::Left
            })
        );
        assert_eq!(prods[2].prec, None);
    }

    #[test]
    fn it_shares_generated_nonterms_between_equal_rules() {
        let bnf = grammar(
            &["x", ","],
            &[],
            [
                ("a", seq([many(sym("x")), sep_by(sym(","), sym("x"))])),
                ("b", seq([sym(","), many(sym("x"))])),
                ("c", option(sep_by1(sym(","), sym("x")))),
            ],
        )
        .unwrap()
        .validate()
        .unwrap()
        .lower();

        let names = bnf
            .nonterms
            .iter()
            .map(|nonterm| nonterm.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["a", "b", "c", "x*", "sepBy(,, x)", "sepBy1(,, x)"]
        );
        assert_eq!(bnf.nonterms[1].prods[0].symbols, vec![t(1), nt(3)]);
        assert_eq!(bnf.nonterms[2].prods[1].symbols, vec![nt(5)]);
        assert_eq!(bnf.nonterm_id("x*"), Some(NontermId(3)));
    }

    #[test]
    fn it_prefers_tokens_over_rules() {
        let bnf = grammar(&["id"], &[], [("id", sym("id")), ("use", sym("id"))])
            .unwrap()
            .validate()
            .unwrap()
            .lower();

        assert_eq!(bnf.nonterms[1].prods[0].symbols, vec![t(0)]);
    }

    #[test]
    fn it_displays_bnf() {
        let bnf = grammar(
            &["NUM", "PLUS"],
            &["expr"],
            [("expr", option(sep_by1(sym("PLUS"), sym("NUM"))))],
        )
        .unwrap()
        .validate()
        .unwrap()
        .lower();

        assert_eq!(
            bnf.to_string(),
            "<expr> ::= ε | <sepBy1(PLUS, NUM)>\n<sepBy1(PLUS, NUM)> ::= NUM | <sepBy1(PLUS, NUM)> PLUS NUM\n"
        );
    }
}
