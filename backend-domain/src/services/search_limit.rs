use thiserror::Error;

pub const DEFAULT_SEARCH_LIMIT: u32 = 8;
pub const MAX_SEARCH_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchLimitError {
    #[error("invalid limit value")]
    Invalid,
    #[error("limit value is too high")]
    TooHigh,
}

/// Absent or empty means the default; anything else must be 1..=100.
pub fn parse_search_limit(raw: Option<&str>) -> Result<u32, SearchLimitError> {
    let raw = raw.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Ok(DEFAULT_SEARCH_LIMIT);
    }
    let limit: i64 = raw.parse().map_err(|_| SearchLimitError::Invalid)?;
    if limit > i64::from(MAX_SEARCH_LIMIT) {
        return Err(SearchLimitError::TooHigh);
    }
    if limit < 1 {
        return Err(SearchLimitError::Invalid);
    }
    Ok(limit as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_limit_defaults() {
        assert_eq!(parse_search_limit(None), Ok(8));
        assert_eq!(parse_search_limit(Some("")), Ok(8));
    }

    #[test]
    fn limit_bounds() {
        assert_eq!(parse_search_limit(Some("100")), Ok(100));
        assert_eq!(parse_search_limit(Some("150")), Err(SearchLimitError::TooHigh));
        assert_eq!(parse_search_limit(Some("0")), Err(SearchLimitError::Invalid));
        assert_eq!(parse_search_limit(Some("ten")), Err(SearchLimitError::Invalid));
    }
}
