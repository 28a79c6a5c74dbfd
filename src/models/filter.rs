//! Predicate helpers shared by every entity filter.
//!
//! A filter is a conjunction: a record is kept only when every constraint the
//! filter carries holds. Constraints that are absent always hold.

use super::Timestamp;

/// Implemented by each entity filter.
pub trait Matches<T: ?Sized> {
    fn matches(&self, record: &T) -> bool;
}

/// Keeps the records accepted by `filter`; `None` keeps everything.
pub fn apply<T, F>(records: Vec<T>, filter: Option<&F>) -> Vec<T>
where
    F: Matches<T>,
{
    match filter {
        Some(filter) => records.into_iter().filter(|r| filter.matches(r)).collect(),
        None => records,
    }
}

/// Case-insensitive substring containment.
pub fn contains_text(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

/// Inclusive range check over optional bounds.
///
/// With at least one bound present, a missing value never matches.
pub fn within_range(
    value: Option<Timestamp>,
    after: Option<Timestamp>,
    before: Option<Timestamp>,
) -> bool {
    if after.is_none() && before.is_none() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    after.map_or(true, |after| value >= after) && before.map_or(true, |before| value <= before)
}

/// Strict equality against an optional expected value.
pub fn equals<T: PartialEq + ?Sized>(value: &T, expected: Option<&T>) -> bool {
    expected.map_or(true, |expected| value == expected)
}
