use std::fmt::Debug;
use std::fmt::Display;

/// The sentinel used internally to represent the lattice bottom (negative
/// infinity). Any arithmetic touching this value must saturate back to it
/// instead of wrapping, since the underlying storage is a plain `i64`.
pub(crate) const NEG_INFINITY: i64 = i64::MIN;

/// One above [`NEG_INFINITY`]. No valid cost may ever equal this value; doing
/// so indicates that `NEG_INFINITY` arithmetic was performed without
/// saturating, which is a logic error in the fixpoint (spec: "a poison
/// intermediate must be detectable in debug builds").
pub(crate) const POISON: i64 = NEG_INFINITY + 1;

#[inline]
pub(crate) fn debug_assert_not_poison(value: i64) {
    debug_assert_ne!(value, POISON, "numeric dominance value collapsed onto the reserved poison sentinel");
}

/// A cost-like numeric type used throughout the dominance fixpoints.
///
/// Implementors form a total order with an explicit lattice bottom
/// (`neg_infinity`) that absorbs every other value under addition: any
/// arithmetic touching it yields `neg_infinity` again rather than wrapping or
/// panicking. Two concrete instantiations are provided: [`IntCost`] for tasks
/// with no zero-cost actions, and [`EpsilonCost`] for tasks where a
/// zero-cost action must still be ordered strictly above an action that can
/// never be free (spec "Cost type T").
///
/// Kept generic (not `dyn`) so the dominance fixpoints are monomorphized per
/// cost type and never pay for dynamic dispatch in their hot loops.
pub trait Cost: Copy + Clone + Eq + Ord + Debug + Display + Send + Sync + 'static {
    /// The neutral element: `R_i(s, s) = zero()`.
    fn zero() -> Self;

    /// The lattice bottom, "no simulation possible".
    fn neg_infinity() -> Self;

    /// True iff `self` is the lattice bottom.
    fn is_neg_infinity(&self) -> bool;

    /// Saturating addition: if either operand is `neg_infinity`, the result
    /// is `neg_infinity`.
    fn saturating_add(self, other: Self) -> Self;

    /// Collapses `self` to `neg_infinity` if it falls below `-truncate_value`
    /// (spec: "Truncate below `-truncate_value` to `-infty` to guarantee
    /// termination").
    fn truncate(self, truncate_value: i64) -> Self;

    /// Converts a non-negative integer label cost, bumping a literal `0` up
    /// to a strictly positive infinitesimal (spec: "An action of integer
    /// cost 0 is treated as cost epsilon>0 for the purpose of tau-label cost
    /// accumulation").
    fn epsilon_if_zero(label_cost: i64) -> Self;

    /// Constructs a finite cost from a plain, non-negative integer.
    fn from_finite(value: i64) -> Self;

    /// Negates a finite, non-negative distance (e.g. a tau-distance) into the
    /// cost domain, where it is used as a penalty. `neg_infinity` negates to
    /// itself: "infinitely far away" stays the bottom, it never flips to a
    /// would-be `+infinity`.
    fn negate(self) -> Self;
}
