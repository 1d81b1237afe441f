//! Page bounds for list queries.

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Normalize caller-supplied paging: the limit defaults to [`DEFAULT_LIMIT`] and is
/// clamped to `1..=MAX_LIMIT`; the offset is never negative.
pub fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(page_bounds(None, None), (20, 0));
    }

    #[test]
    fn test_clamping() {
        assert_eq!(page_bounds(Some(0), Some(-5)), (1, 0));
        assert_eq!(page_bounds(Some(500), Some(40)), (100, 40));
        assert_eq!(page_bounds(Some(-1), None), (1, 0));
    }
}
