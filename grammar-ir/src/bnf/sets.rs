use super::{
    Bnf,
    Element,
    TokenSet,
};

pub(super) fn gen_nullable(bnf: &Bnf) -> Vec<bool> {
    let mut nullable = vec![false; bnf.nonterms.len()];

    loop {
        let mut changed = false;
        for (i, nonterm) in bnf.nonterms.iter().enumerate() {
            if nullable[i] {
                continue;
            }
            if nonterm
                .prods
                .iter()
                .any(|prod| prod.symbols.iter().all(|sym| is_nullable(&nullable, sym)))
            {
                nullable[i] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    nullable
}

fn is_nullable(nullable: &[bool], sym: &Element) -> bool {
    match sym {
        Element::Term(_) => false,
        Element::Nonterm(id) => nullable[id.index()],
    }
}

pub(super) fn gen_first(bnf: &Bnf, nullable: &[bool]) -> Vec<TokenSet> {
    let num_tokens = bnf.tokens.len();
    let mut first = vec![TokenSet::new(num_tokens); bnf.nonterms.len()];

    loop {
        let mut changed = false;
        for (i, nonterm) in bnf.nonterms.iter().enumerate() {
            for prod in &nonterm.prods {
                for sym in &prod.symbols {
                    match *sym {
                        Element::Term(id) => {
                            changed |= first[i].insert(id);
                            break;
                        }
                        Element::Nonterm(id) => {
                            if id.index() != i {
                                let other = first[id.index()].clone();
                                changed |= first[i].union_with(&other);
                            }
                            if !nullable[id.index()] {
                                break;
                            }
                        }
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    first
}
