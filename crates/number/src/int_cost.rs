use std::fmt;
use std::ops::Add;

use crate::Cost;
use crate::cost::NEG_INFINITY;
use crate::cost::debug_assert_not_poison;

/// A plain integer cost. Used when the planning task has no zero-cost
/// actions, so label costs can be summed directly without an infinitesimal
/// component.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntCost(i64);

impl IntCost {
    /// Wraps a raw value. Only used internally and by tests; production
    /// code should go through [`Cost::from_finite`] or [`Cost::neg_infinity`].
    pub(crate) fn raw(value: i64) -> Self {
        debug_assert_not_poison(value);
        Self(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl Cost for IntCost {
    fn zero() -> Self {
        Self(0)
    }

    fn neg_infinity() -> Self {
        Self(NEG_INFINITY)
    }

    fn is_neg_infinity(&self) -> bool {
        self.0 == NEG_INFINITY
    }

    fn saturating_add(self, other: Self) -> Self {
        if self.is_neg_infinity() || other.is_neg_infinity() {
            return Self::neg_infinity();
        }
        Self::raw(self.0.saturating_add(other.0))
    }

    fn truncate(self, truncate_value: i64) -> Self {
        if !self.is_neg_infinity() && self.0 < -truncate_value {
            Self::neg_infinity()
        } else {
            self
        }
    }

    fn epsilon_if_zero(label_cost: i64) -> Self {
        // No infinitesimal representable: the smallest positive cost is 1.
        Self::raw(if label_cost == 0 { 1 } else { label_cost })
    }

    fn from_finite(value: i64) -> Self {
        Self::raw(value)
    }

    fn negate(self) -> Self {
        if self.is_neg_infinity() { self } else { Self::raw(-self.0) }
    }
}

impl Add for IntCost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl fmt::Debug for IntCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_neg_infinity() {
            write!(f, "-inf")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Display for IntCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neg_infinity_absorbs_addition() {
        let a = IntCost::neg_infinity();
        let b = IntCost::from_finite(5);
        assert!((a + b).is_neg_infinity());
        assert!((b + a).is_neg_infinity());
    }

    #[test]
    fn truncate_collapses_below_threshold() {
        let value = IntCost::from_finite(-1001);
        assert!(value.truncate(1000).is_neg_infinity());
        assert_eq!(IntCost::from_finite(-1000).truncate(1000), IntCost::from_finite(-1000));
    }

    #[test]
    fn epsilon_if_zero_bumps_zero_cost() {
        assert_eq!(IntCost::epsilon_if_zero(0), IntCost::from_finite(1));
        assert_eq!(IntCost::epsilon_if_zero(3), IntCost::from_finite(3));
    }

    #[test]
    fn ordering_treats_neg_infinity_as_smallest() {
        assert!(IntCost::neg_infinity() < IntCost::zero());
        assert!(IntCost::from_finite(-1000) > IntCost::neg_infinity());
    }
}
