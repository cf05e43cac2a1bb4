//! Debug assertion macros for ring buffer invariants.
//!
//! Active only in debug builds (`debug_assert!`), so release builds pay nothing.
//! All of them are evaluated while the buffer mutex is held.

// =============================================================================
// Bounded Count
// =============================================================================

/// Assert that occupancy never exceeds capacity.
///
/// **Invariant**: `0 ≤ count ≤ capacity`
///
/// Used in: `State::push_slice()` after advancing `head`
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "bounded count violated: count {} exceeds capacity {}",
            $count,
            $capacity
        )
    };
}

// =============================================================================
// Index Range
// =============================================================================

/// Assert that a ring index stays inside the backing storage.
///
/// **Invariant**: `head, tail ∈ [0, capacity)`
///
/// Used in: `State::push_slice()` and `State::pop()` after wrapping
macro_rules! debug_assert_index_in_range {
    ($name:literal, $idx:expr, $capacity:expr) => {
        debug_assert!(
            $idx < $capacity,
            "index range violated: {} = {} outside [0, {})",
            $name,
            $idx,
            $capacity
        )
    };
}

// =============================================================================
// Occupancy Consistency
// =============================================================================

/// Assert that `head - tail` (mod capacity) agrees with `count`.
///
/// **Invariant**: `(tail + count) mod capacity == head`
///
/// Used in: every mutation of `State`
macro_rules! debug_assert_indices_match_count {
    ($head:expr, $tail:expr, $count:expr, $capacity:expr) => {
        debug_assert!(
            ($tail + $count) % $capacity == $head,
            "occupancy mismatch: tail {} + count {} != head {} (mod {})",
            $tail,
            $count,
            $head,
            $capacity
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_index_in_range;
pub(crate) use debug_assert_indices_match_count;
