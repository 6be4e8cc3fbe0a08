use std::fmt::{
    self,
    Debug,
    Formatter,
};

use super::TermId;

type BitBlock = u64;

const BLOCK_NBITS: usize = BitBlock::BITS as usize;

/// A set of terminals, stored as a bit set sized for a given number of
/// tokens.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TokenSet {
    slice: Box<[BitBlock]>,
}

impl TokenSet {
    pub fn new(num_tokens: usize) -> Self {
        let len = (num_tokens + BLOCK_NBITS - 1) / BLOCK_NBITS;
        Self {
            slice: vec![0; len].into_boxed_slice(),
        }
    }

    /// Returns whether the token was newly inserted.
    ///
    /// # Panics
    ///
    /// Panics if `token` is out of range for the set.
    pub fn insert(&mut self, token: TermId) -> bool {
        let (block, mask) = position(token);
        let old = self.slice[block];
        self.slice[block] |= mask;
        old != self.slice[block]
    }

    pub fn contains(&self, token: TermId) -> bool {
        let (block, mask) = position(token);
        self.slice
            .get(block)
            .map_or(false, |bits| bits & mask != 0)
    }

    /// Returns whether the set has changed.
    pub fn union_with(&mut self, other: &TokenSet) -> bool {
        let mut changed = false;
        for (bits, other) in self.slice.iter_mut().zip(other.slice.iter()) {
            let old = *bits;
            *bits |= other;
            changed |= old != *bits;
        }
        changed
    }

    pub fn len(&self) -> usize {
        self.slice
            .iter()
            .map(|bits| bits.count_ones() as usize)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slice.iter().all(|bits| *bits == 0)
    }

    pub fn iter(&self) -> Iter {
        Iter {
            slice: &self.slice,
            bit: 0,
            index: 0,
        }
    }
}

fn position(token: TermId) -> (usize, BitBlock) {
    let index = token.index();
    (index / BLOCK_NBITS, 1 << (index % BLOCK_NBITS))
}

pub struct Iter<'a> {
    slice: &'a [BitBlock],
    bit: usize,
    index: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = TermId;

    fn next(&mut self) -> Option<TermId> {
        while self.index < self.slice.len() {
            if self.bit < BLOCK_NBITS {
                let remaining = self.slice[self.index] & (BitBlock::MAX << self.bit);
                let bit = remaining.trailing_zeros() as usize;
                if bit < BLOCK_NBITS {
                    self.bit = bit + 1;
                    return Some(TermId((self.index * BLOCK_NBITS + bit) as u32));
                }
            }

            self.index += 1;
            self.bit = 0;
        }
        None
    }
}

impl Debug for TokenSet {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|id| id.0)).finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn it_inserts_and_iterates_in_order() {
        let mut set = TokenSet::new(130);

        assert!(set.insert(TermId(7)));
        assert!(set.insert(TermId(3)));
        assert!(!set.insert(TermId(7)));
        assert!(set.insert(TermId(64)));
        assert!(set.insert(TermId(129)));

        let ids = set.iter().map(|id| id.0).collect::<Vec<_>>();
        assert_eq!(ids, vec![3, 7, 64, 129]);
        assert_eq!(set.len(), 4);
        assert!(set.contains(TermId(64)));
        assert!(!set.contains(TermId(63)));
        assert!(!set.contains(TermId(1000)));
    }

    #[test]
    fn it_reports_changes_on_union() {
        let mut a = TokenSet::new(10);
        let mut b = TokenSet::new(10);
        a.insert(TermId(1));
        b.insert(TermId(1));

        assert!(!a.union_with(&b));
        b.insert(TermId(9));
        assert!(a.union_with(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn it_starts_empty() {
        let set = TokenSet::new(0);
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
        assert_eq!(format!("{:?}", set), "{}");
    }
}
