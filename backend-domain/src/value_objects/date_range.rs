// Inclusive date range value object

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bounds are kept as `yyyy-mm-dd`, the form stored in `almanax.date`.
/// A reversed range is valid and matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: String,
    pub to: String,
}

impl DateRange {
    pub fn from_dates(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: from.format("%Y-%m-%d").to_string(),
            to: to.format("%Y-%m-%d").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_zero_padded() {
        let from = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
        let to = NaiveDate::from_ymd_opt(2024, 12, 31).expect("date");
        let range = DateRange::from_dates(from, to);
        assert_eq!(range.from, "2024-05-01");
        assert_eq!(range.to, "2024-12-31");
    }
}
