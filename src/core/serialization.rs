/*!
 * Serde Helper Functions
 * Predicates shared by `skip_serializing_if` attributes
 */

/// Skip serializing zero counters
#[inline]
pub fn is_zero_usize(value: &usize) -> bool {
    *value == 0
}
