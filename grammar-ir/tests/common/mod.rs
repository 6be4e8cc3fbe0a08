//! Earley recognizer over lowered grammars, for checking what a grammar
//! accepts.

use std::collections::HashSet;

use grammar_ir::bnf::{
    Bnf,
    Element,
    NontermId,
};

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
struct Item {
    nonterm: usize,
    prod: usize,
    dot: usize,
    origin: usize,
}

struct Chart {
    sets: Vec<Vec<Item>>,
    seen: Vec<HashSet<Item>>,
}

impl Chart {
    fn new(len: usize) -> Self {
        Self {
            sets: vec![vec![]; len + 1],
            seen: vec![HashSet::new(); len + 1],
        }
    }

    fn add(&mut self, k: usize, item: Item) {
        if self.seen[k].insert(item) {
            self.sets[k].push(item);
        }
    }
}

/// Returns whether `start` derives exactly `input`.
pub fn recognize(bnf: &Bnf, start: NontermId, input: &[&str]) -> bool {
    let tokens = input
        .iter()
        .map(|token| bnf.term_id(token).expect("unknown token"))
        .collect::<Vec<_>>();
    let nullable = bnf.nullable();
    let mut chart = Chart::new(tokens.len());

    for prod in 0..bnf.nonterm(start).prods.len() {
        chart.add(
            0,
            Item {
                nonterm: start.index(),
                prod,
                dot: 0,
                origin: 0,
            },
        );
    }

    for k in 0..=tokens.len() {
        let mut i = 0;
        while i < chart.sets[k].len() {
            let item = chart.sets[k][i];
            i += 1;

            let symbols = &bnf.nonterms[item.nonterm].prods[item.prod].symbols;
            let advanced = Item {
                dot: item.dot + 1,
                ..item
            };

            match symbols.get(item.dot) {
                None => {
                    // complete
                    let parents = chart.sets[item.origin].clone();
                    for parent in parents {
                        let parent_symbols = &bnf.nonterms[parent.nonterm].prods[parent.prod].symbols;
                        if parent_symbols.get(parent.dot)
                            == Some(&Element::Nonterm(NontermId(item.nonterm as u32)))
                        {
                            chart.add(
                                k,
                                Item {
                                    dot: parent.dot + 1,
                                    ..parent
                                },
                            );
                        }
                    }
                }
                Some(Element::Nonterm(id)) => {
                    // predict
                    for prod in 0..bnf.nonterm(*id).prods.len() {
                        chart.add(
                            k,
                            Item {
                                nonterm: id.index(),
                                prod,
                                dot: 0,
                                origin: k,
                            },
                        );
                    }
                    if nullable[id.index()] {
                        chart.add(k, advanced);
                    }
                }
                Some(Element::Term(id)) => {
                    // scan
                    if k < tokens.len() && tokens[k] == *id {
                        chart.add(k + 1, advanced);
                    }
                }
            }
        }
    }

    chart.sets[tokens.len()].iter().any(|item| {
        item.nonterm == start.index()
            && item.origin == 0
            && item.dot == bnf.nonterms[item.nonterm].prods[item.prod].symbols.len()
    })
}
