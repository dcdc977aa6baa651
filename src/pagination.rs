pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Limits below 1 fall back to the default, limits above the cap are capped.
pub fn clamp_limit(limit: i64) -> i64 {
    if limit < 1 {
        DEFAULT_LIMIT
    } else {
        limit.min(MAX_LIMIT)
    }
}

pub fn clamp_offset(offset: i64) -> i64 {
    offset.max(0)
}
