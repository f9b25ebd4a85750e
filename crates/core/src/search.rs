//! Search pagination constants and helpers.
//!
//! Lives in `core` so both the API layer and the search repository agree on
//! the same bounds.

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of search results per page.
pub const DEFAULT_SEARCH_LIMIT: i64 = 10;

/// Maximum number of search results per page.
pub const MAX_SEARCH_LIMIT: i64 = 100;

/// Clamp a user-provided limit to `[1, max]`.
///
/// Missing, zero and negative limits fall back to `default` rather than being
/// floored, so `?limit=0` behaves like an omitted parameter.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    match limit {
        Some(limit) if limit >= 1 => limit.min(max),
        _ => default,
    }
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
