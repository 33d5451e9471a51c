use super::token::Kind;
use std::collections::HashMap;

/// ## Admissible token kinds
///
/// A reference counted multiset. Grammar rules insert the kinds they can
/// accept next before descending and remove them on the way out. A kind
/// stays admissible while any insertion of it is outstanding, so nested
/// and overlapping rules compose without bookkeeping at the call site.

#[derive(Debug, Default, Clone)]
pub struct Admit {
    counts: HashMap<Kind, usize>,
}

impl Admit {
    pub fn new() -> Admit {
        Admit::default()
    }

    pub fn insert(&mut self, kinds: &[Kind]) {
        for kind in kinds {
            *self.counts.entry(*kind).or_insert(0) += 1;
        }
    }

    pub fn remove(&mut self, kinds: &[Kind]) {
        for kind in kinds {
            if let Some(count) = self.counts.get_mut(kind) {
                *count -= 1;
                if *count == 0 {
                    self.counts.remove(kind);
                }
            } else {
                debug_assert!(false, "removed {:?} without insert", kind);
            }
        }
    }

    pub fn contains(&self, kind: Kind) -> bool {
        self.counts.contains_key(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_inserts() {
        let mut a = Admit::new();
        a.insert(&[Kind::RParen, Kind::Comma]);
        a.insert(&[Kind::RParen]);
        a.remove(&[Kind::RParen]);
        assert!(a.contains(Kind::RParen));
        a.remove(&[Kind::RParen, Kind::Comma]);
        assert!(!a.contains(Kind::RParen));
        assert!(a.is_empty());
    }

    #[test]
    fn test_repeated_kind() {
        let mut a = Admit::new();
        a.insert(&[Kind::Plus, Kind::Minus, Kind::Plus]);
        a.remove(&[Kind::Plus, Kind::Minus]);
        assert!(a.contains(Kind::Plus));
        assert!(!a.contains(Kind::Minus));
        a.remove(&[Kind::Plus]);
        assert!(a.is_empty());
    }
}
