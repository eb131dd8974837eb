//! Binary operators for the `apply` algorithm
//!
//! Operators form a closed set known at compile time, so they are modelled
//! as a sealed enum rather than a trait hierarchy. Each operator carries its
//! pointwise rule on terminal values ([`BinOp::terminal_rule`]), a stable
//! identifier used as part of the operation-cache key and a commutativity
//! flag that lets `apply` canonicalise operand order before memoisation.
//!
//! Sentinel behaviour: [`UNDEFINED`] and [`NONDETERMINED`] sit at the top of
//! the value range. `And`/`Or` short-circuit through their absorbing element
//! even when the other operand is a sentinel; most derived operators let the
//! sentinel through unchanged.

use crate::types::{is_special, Value, NONDETERMINED, UNDEFINED};

/// Binary operators understood by `apply`.
///
/// `Plus` and `Times` are modular in `m`; the modulus participates in the
/// cache identifier so differently parameterised instances never share
/// memo entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Min,
    Max,
    /// Conjunction used when folding extended derivatives; UNDEFINED acts
    /// as the identity instead of poisoning the result.
    PiConj,
    Implies,
    /// Addition modulo `m`.
    Plus { m: Value },
    /// Multiplication modulo `m`.
    Times { m: Value },
}

impl BinOp {
    /// Pointwise rule applied when both operands are terminal values.
    pub fn terminal_rule(self, l: Value, r: Value) -> Value {
        let mi = l.min(r);
        let ma = l.max(r);
        match self {
            BinOp::And => {
                if mi == 0 {
                    0
                } else {
                    ma
                }
            }
            BinOp::Or => {
                if mi == 0 {
                    ma
                } else {
                    mi
                }
            }
            BinOp::Xor => {
                if is_special(ma) {
                    ma
                } else {
                    l ^ r
                }
            }
            BinOp::Nand => {
                if is_special(ma) {
                    ma
                } else {
                    1 - mi.min(1)
                }
            }
            BinOp::Nor => {
                // Defined from first principles: a sentinel operand wins,
                // otherwise boolean NOR of the operands.
                if is_special(ma) {
                    ma
                } else if ma == 0 {
                    1
                } else {
                    0
                }
            }
            BinOp::Xnor | BinOp::Equal => {
                if is_special(ma) {
                    ma
                } else {
                    Value::from(l == r)
                }
            }
            BinOp::NotEqual => {
                if is_special(ma) {
                    ma
                } else {
                    Value::from(l != r)
                }
            }
            BinOp::Less => {
                if is_special(ma) {
                    ma
                } else {
                    Value::from(l < r)
                }
            }
            BinOp::LessEqual => {
                if is_special(ma) {
                    ma
                } else {
                    Value::from(l <= r)
                }
            }
            BinOp::Greater => {
                if is_special(ma) {
                    ma
                } else {
                    Value::from(l > r)
                }
            }
            BinOp::GreaterEqual => {
                if is_special(ma) {
                    ma
                } else {
                    Value::from(l >= r)
                }
            }
            BinOp::Min => {
                if mi == 0 || ma != NONDETERMINED {
                    mi
                } else {
                    ma
                }
            }
            BinOp::Max => ma,
            BinOp::PiConj => {
                if mi == 0 {
                    0
                } else if ma == UNDEFINED {
                    mi
                } else {
                    ma
                }
            }
            BinOp::Implies => {
                if l == 0 {
                    1
                } else if l == 1 {
                    r
                } else if r == 1 {
                    1
                } else {
                    NONDETERMINED
                }
            }
            BinOp::Plus { m } => {
                if is_special(ma) {
                    ma
                } else {
                    ((u64::from(l) + u64::from(r)) % u64::from(m)) as Value
                }
            }
            BinOp::Times { m } => {
                if mi == 0 {
                    0
                } else if is_special(ma) {
                    ma
                } else {
                    ((u64::from(l) * u64::from(r)) % u64::from(m)) as Value
                }
            }
        }
    }

    /// Identifier used as part of the operation-cache key.
    pub(crate) fn cache_id(self) -> u64 {
        match self {
            BinOp::And => 1,
            BinOp::Or => 2,
            BinOp::Xor => 3,
            BinOp::PiConj => 4,
            BinOp::Nand => 5,
            BinOp::Nor => 6,
            BinOp::Xnor => 7,
            BinOp::Equal => 8,
            BinOp::NotEqual => 9,
            BinOp::Less => 10,
            BinOp::LessEqual => 11,
            BinOp::Greater => 12,
            BinOp::GreaterEqual => 13,
            BinOp::Min => 14,
            BinOp::Max => 15,
            BinOp::Implies => 16,
            BinOp::Plus { m } => 17 | (u64::from(m) << 8),
            BinOp::Times { m } => 18 | (u64::from(m) << 8),
        }
    }

    /// Commutative operators have their operands ordered before the cache
    /// is consulted, so `apply(op, a, b)` and `apply(op, b, a)` share one
    /// memo entry.
    pub fn is_commutative(self) -> bool {
        !matches!(
            self,
            BinOp::Less
                | BinOp::LessEqual
                | BinOp::Greater
                | BinOp::GreaterEqual
                | BinOp::Implies
        )
    }
}

/// Strategy for reducing a sequence of diagrams into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldType {
    /// Fold left to right; cheap for short sequences.
    Left,
    /// Pairwise reduction in O(log n) passes; keeps the operation-cache
    /// working set small for long sequences.
    Tree,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_tables() {
        for l in 0..2 {
            for r in 0..2 {
                assert_eq!(BinOp::And.terminal_rule(l, r), l & r);
                assert_eq!(BinOp::Or.terminal_rule(l, r), l | r);
                assert_eq!(BinOp::Xor.terminal_rule(l, r), l ^ r);
                assert_eq!(BinOp::Nand.terminal_rule(l, r), 1 - (l & r));
                assert_eq!(BinOp::Nor.terminal_rule(l, r), 1 - (l | r));
                assert_eq!(BinOp::Xnor.terminal_rule(l, r), 1 - (l ^ r));
            }
        }
    }

    #[test]
    fn multi_valued_and_or() {
        assert_eq!(BinOp::And.terminal_rule(2, 3), 3);
        assert_eq!(BinOp::And.terminal_rule(0, 3), 0);
        assert_eq!(BinOp::Or.terminal_rule(0, 3), 3);
        assert_eq!(BinOp::Or.terminal_rule(2, 3), 2);
    }

    #[test]
    fn and_short_circuits_through_zero() {
        assert_eq!(BinOp::And.terminal_rule(0, UNDEFINED), 0);
        assert_eq!(BinOp::And.terminal_rule(1, UNDEFINED), UNDEFINED);
    }

    #[test]
    fn or_short_circuits_through_one() {
        assert_eq!(BinOp::Or.terminal_rule(1, UNDEFINED), 1);
        assert_eq!(BinOp::Or.terminal_rule(0, UNDEFINED), UNDEFINED);
    }

    #[test]
    fn nondetermined_absorbs() {
        assert_eq!(BinOp::Xor.terminal_rule(1, NONDETERMINED), NONDETERMINED);
        assert_eq!(BinOp::Nor.terminal_rule(1, NONDETERMINED), NONDETERMINED);
        assert_eq!(BinOp::Less.terminal_rule(0, NONDETERMINED), NONDETERMINED);
        assert_eq!(
            BinOp::Plus { m: 3 }.terminal_rule(2, NONDETERMINED),
            NONDETERMINED
        );
    }

    #[test]
    fn implies_table() {
        assert_eq!(BinOp::Implies.terminal_rule(0, 0), 1);
        assert_eq!(BinOp::Implies.terminal_rule(0, NONDETERMINED), 1);
        assert_eq!(BinOp::Implies.terminal_rule(1, 0), 0);
        assert_eq!(BinOp::Implies.terminal_rule(1, 1), 1);
        assert_eq!(
            BinOp::Implies.terminal_rule(1, NONDETERMINED),
            NONDETERMINED
        );
        assert_eq!(BinOp::Implies.terminal_rule(NONDETERMINED, 1), 1);
        assert_eq!(
            BinOp::Implies.terminal_rule(NONDETERMINED, 0),
            NONDETERMINED
        );
    }

    #[test]
    fn pi_conj_treats_undefined_as_identity() {
        assert_eq!(BinOp::PiConj.terminal_rule(1, UNDEFINED), 1);
        assert_eq!(BinOp::PiConj.terminal_rule(0, UNDEFINED), 0);
        assert_eq!(BinOp::PiConj.terminal_rule(1, 2), 2);
    }

    #[test]
    fn modular_ops() {
        assert_eq!(BinOp::Plus { m: 3 }.terminal_rule(2, 2), 1);
        assert_eq!(BinOp::Times { m: 3 }.terminal_rule(2, 2), 1);
        assert_eq!(BinOp::Times { m: 5 }.terminal_rule(0, NONDETERMINED), 0);
    }

    #[test]
    fn modulus_distinguishes_cache_ids() {
        assert_ne!(
            BinOp::Plus { m: 3 }.cache_id(),
            BinOp::Plus { m: 4 }.cache_id()
        );
        assert_ne!(
            BinOp::Plus { m: 3 }.cache_id(),
            BinOp::Times { m: 3 }.cache_id()
        );
    }
}
