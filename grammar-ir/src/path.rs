use std::fmt::{
    self,
    Display,
};

use crate::symbol::Symbol;

/// A sub-rule position inside a [`Rule`][crate::Rule].
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum Step {
    /// Element `n` of a sequence.
    Seq(usize),
    /// Alternative `n` of an alternation.
    Or(usize),
    Many0,
    Many1,
    Optional,
    /// Separator of a `sepBy` or `sepBy1`.
    Separator,
    /// Element of a `sepBy` or `sepBy1`.
    Element,
    Prec,
}

impl Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Step::Seq(i) => write!(f, "seq[{i}]"),
            Step::Or(i) => write!(f, "or[{i}]"),
            Step::Many0 => write!(f, "many"),
            Step::Many1 => write!(f, "some"),
            Step::Optional => write!(f, "option"),
            Step::Separator => write!(f, "sep"),
            Step::Element => write!(f, "elem"),
            Step::Prec => write!(f, "prec"),
        }
    }
}

/// Where a symbol reference sits in a grammar.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum PathRoot {
    /// Inside the body of a named rule.
    Rule(Symbol),
    /// In the list of start rules.
    Start,
}

/// Location of a symbol reference: a root followed by the steps taken from
/// it.
///
/// Displays as `expr > or[2] > seq[0]`.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct RulePath {
    root: PathRoot,
    steps: Vec<Step>,
}

impl RulePath {
    pub fn rule(name: impl Into<Symbol>) -> Self {
        Self {
            root: PathRoot::Rule(name.into()),
            steps: vec![],
        }
    }

    pub fn start() -> Self {
        Self {
            root: PathRoot::Start,
            steps: vec![],
        }
    }

    pub fn root(&self) -> &PathRoot {
        &self.root
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns a copy of this path extended by `step`.
    pub fn join(&self, step: Step) -> Self {
        let mut path = self.clone();
        path.push(step);
        path
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn pop(&mut self) -> Option<Step> {
        self.steps.pop()
    }
}

impl Display for RulePath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.root {
            PathRoot::Rule(name) => write!(f, "{name}")?,
            PathRoot::Start => write!(f, "start")?,
        }
        for step in &self.steps {
            write!(f, " > {step}")?;
        }
        Ok(())
    }
}
