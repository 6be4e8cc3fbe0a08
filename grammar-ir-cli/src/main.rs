mod demos;

use color_eyre::eyre::{
    eyre,
    Error,
};
use grammar_ir::{
    Grammar,
    ValidateParameters,
};
use itertools::Itertools;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
enum Args {
    /// List the bundled grammars.
    List,
    /// Print a grammar.
    Show { name: String },
    /// Validate a grammar and print its warnings.
    Validate {
        name: String,

        /// Don't warn about unused tokens.
        #[structopt(long)]
        allow_unused_tokens: bool,

        /// Don't warn about rules that nothing refers to.
        #[structopt(long)]
        allow_unreferenced: bool,
    },
    /// Validate a grammar and print its BNF lowering.
    Lower {
        name: String,

        /// Also print nullable nonterminals and FIRST sets.
        #[structopt(long)]
        sets: bool,
    },
}

impl Args {
    pub fn run(self) -> Result<(), Error> {
        match self {
            Self::List => {
                for name in demos::NAMES {
                    println!("{name}");
                }
            }
            Self::Show { name } => {
                let grammar = load(&name)?;
                print_grammar(&grammar);
            }
            Self::Validate {
                name,
                allow_unused_tokens,
                allow_unreferenced,
            } => {
                let parameters = ValidateParameters {
                    unused_tokens: !allow_unused_tokens,
                    unreferenced_rules: !allow_unreferenced,
                    ..Default::default()
                };

                match load(&name)?.validate_with(&parameters) {
                    Ok(validated) => {
                        for warning in validated.warnings() {
                            println!("warning: {warning}");
                        }
                        println!(
                            "{name}: ok ({} tokens, {} rules)",
                            validated.num_tokens(),
                            validated.num_rules()
                        );
                    }
                    Err(rejected) => {
                        for warning in &rejected.warnings {
                            println!("warning: {warning}");
                        }
                        return Err(rejected.error.into());
                    }
                }
            }
            Self::Lower { name, sets } => {
                let validated = load(&name)?.validate()?;
                let bnf = validated.lower();
                print!("{bnf}");

                if sets {
                    let nullable = bnf.nullable();
                    let first = bnf.first_sets();
                    println!();
                    for (i, nonterm) in bnf.nonterms.iter().enumerate() {
                        println!(
                            "<{}>: nullable={}, first={{{}}}",
                            nonterm.name,
                            nullable[i],
                            first[i].iter().map(|id| bnf.token(id)).join(", ")
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

fn load(name: &str) -> Result<Grammar, Error> {
    let grammar = demos::load(name).ok_or_else(|| {
        eyre!(
            "unknown grammar '{name}', expected one of: {}",
            demos::NAMES.join(", ")
        )
    })??;
    Ok(grammar)
}

fn print_grammar(grammar: &Grammar) {
    println!("tokens: {}", grammar.tokens().join(" "));
    println!("start: {}", grammar.starts().join(" "));
    for (name, rule) in grammar.rules() {
        println!("{name} ::= {rule}");
    }
}

fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = Args::from_args();
    args.run()?;

    Ok(())
}
