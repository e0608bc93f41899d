use std::ops::Not;

use crate::cnf::Lit;

/// A variable index, starting at 0.
pub type Var = u32;

/// Solver-side literal: `2 * var + negated`, so that it can directly index watch lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal(u32);

impl Literal {
    pub fn new(var: Var, negated: bool) -> Self {
        Literal(2 * var + negated as u32)
    }

    pub fn var(self) -> Var {
        self.0 >> 1
    }

    pub fn is_negated(self) -> bool {
        self.0 & 1 == 1
    }

    pub(super) fn index(self) -> usize {
        self.0 as usize
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        Literal(self.0 ^ 1)
    }
}

impl From<Lit> for Literal {
    fn from(lit: Lit) -> Self {
        Literal::new(lit.var() as Var, lit.is_negated())
    }
}

/// A lifted boolean: unassigned variables are `Undef`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LBool {
    True,
    False,
    Undef,
}

impl LBool {
    pub(super) fn from_bool(b: bool) -> Self {
        if b { LBool::True } else { LBool::False }
    }

    /// Flips `True` and `False` iff `negated` is set.
    pub(super) fn xor(self, negated: bool) -> Self {
        match (self, negated) {
            (LBool::Undef, _) | (_, false) => self,
            (LBool::True, true) => LBool::False,
            (LBool::False, true) => LBool::True,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn literal_test() {
        let l = Literal::new(3, false);
        assert_eq!(l.var(), 3);
        assert!(!l.is_negated());
        assert!((!l).is_negated());
        assert_eq!((!l).var(), 3);
        assert_eq!(!!l, l);
        assert_eq!(Literal::from(Lit::from(-4)), Literal::new(3, true));
        assert_eq!(Literal::from(Lit::from(1)).index(), 0);
    }

    #[test]
    fn lbool_test() {
        assert_eq!(LBool::True.xor(true), LBool::False);
        assert_eq!(LBool::False.xor(true), LBool::True);
        assert_eq!(LBool::Undef.xor(true), LBool::Undef);
        assert_eq!(LBool::from_bool(false).xor(false), LBool::False);
    }
}
