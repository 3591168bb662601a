use crate::constants::INTERNAL_ID_SEED;

/// Internal id that follows the current maximum, or the seed for an empty
/// ledger.
pub fn next_internal_id(last: Option<i64>) -> i64 {
    match last {
        Some(max) => max + 1,
        None => INTERNAL_ID_SEED,
    }
}
