use anyhow::{anyhow, Result};
use chrono::NaiveDate;

/// Strict yyyy-mm-dd parsing; zero padded only.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    let trimmed = date.trim();
    if trimmed.len() != 10 {
        return Err(anyhow!("date '{}' is not in yyyy-mm-dd format", date));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|err| anyhow!(err))
}
