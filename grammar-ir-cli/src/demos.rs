//! Grammars bundled with the CLI.

use grammar_ir::{
    grammar,
    rule::{
        many,
        option,
        or,
        prec_left,
        prec_right,
        sep_by,
        sep_by1,
        seq,
        some,
        sym,
    },
    Error,
    Grammar,
};

pub const NAMES: &[&str] = &["expr", "json", "lists", "block"];

pub fn load(name: &str) -> Option<Result<Grammar, Error>> {
    let grammar = match name {
        "expr" => expr(),
        "json" => json(),
        "lists" => lists(),
        "block" => block(),
        _ => return None,
    };
    Some(grammar)
}

/// Arithmetic with calls and precedence.
fn expr() -> Result<Grammar, Error> {
    grammar(
        &["+", "-", "*", "/", "^", "num", "(", ")", "id", ","],
        &["expr"],
        [
            (
                "expr",
                prec_left(0, seq([sym("expr"), sym("+") | sym("-"), sym("expr")]))
                    | prec_left(1, seq([sym("expr"), sym("*") | sym("/"), sym("expr")]))
                    | prec_right(2, seq([sym("expr"), sym("^"), sym("expr")]))
                    | seq([sym("-"), sym("expr")])
                    | seq([sym("("), sym("expr"), sym(")")])
                    | sym("call")
                    | sym("id")
                    | sym("num"),
            ),
            (
                "call",
                seq([sym("id"), sym("("), sep_by(sym(","), sym("expr")), sym(")")]),
            ),
        ],
    )
}

/// JSON over a token stream.
fn json() -> Result<Grammar, Error> {
    grammar(
        &[
            "{", "}", "[", "]", ":", ",", "string", "number", "true", "false", "null",
        ],
        &["value"],
        [
            (
                "value",
                or([
                    sym("object"),
                    sym("array"),
                    sym("string"),
                    sym("number"),
                    sym("true"),
                    sym("false"),
                    sym("null"),
                ])?,
            ),
            (
                "object",
                seq([sym("{"), sep_by(sym(","), sym("member")), sym("}")]),
            ),
            ("member", seq([sym("string"), sym(":"), sym("value")])),
            (
                "array",
                seq([sym("["), sep_by(sym(","), sym("value")), sym("]")]),
            ),
        ],
    )
}

/// Repetitions and options, nested.
fn lists() -> Result<Grammar, Error> {
    grammar(
        &["a", "b", "c", "d", ";"],
        &["A", "B"],
        [
            (
                "A",
                seq([
                    many(seq([sym("a"), option(sym("C")), sym("B") | sym("b")])),
                    option(seq([sym("A"), sym("a")])),
                ]),
            ),
            (
                "B",
                some(sym("c") | seq([sym("d"), sym("B")])),
            ),
            ("C", sym("B") | sym("b")),
            ("D", sep_by1(sym(";"), sym("C"))),
        ],
    )
}

/// A block of statements, with the statement rule missing.
fn block() -> Result<Grammar, Error> {
    grammar(
        &["LBRACE", "RBRACE", "SEMI"],
        &["block"],
        [(
            "block",
            seq([sym("LBRACE"), many(sym("stmt")), sym("RBRACE")]),
        )],
    )
}
