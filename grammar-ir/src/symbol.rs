/// Name of a token or a rule.
///
/// A symbol is only a name. Whether it refers to a terminal or a nonterminal
/// is decided by the [`Grammar`][crate::Grammar] it ends up in, and only when
/// that grammar is validated.
#[derive(
    Clone,
    Debug,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    derive_more::Display,
    derive_more::From,
)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'a> From<&'a str> for Symbol {
    fn from(value: &'a str) -> Self {
        value.to_owned().into()
    }
}

impl<'a> From<&'a Symbol> for Symbol {
    fn from(value: &'a Symbol) -> Self {
        value.clone()
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl<'a> PartialEq<&'a str> for Symbol {
    fn eq(&self, other: &&'a str) -> bool {
        self.0 == *other
    }
}
