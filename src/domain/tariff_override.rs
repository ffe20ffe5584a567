// ==========================================
// Plantation Tariff Core - Tariff Override Entity
// ==========================================
// Time-bounded replacement of some of a rule's pay parameters for
// a special occasion (normal/holiday/festival).
// Invariant: effective_from <= effective_to when both set.
// Overlapping same-type periods are allowed at write time; the
// resolution engine breaks the tie (latest effective_from wins).
// ==========================================

use crate::domain::types::{OverrideType, RateSet};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffOverride {
    pub override_id: String,  // UUID
    pub rule_id: String,      // owning rule
    pub override_type: OverrideType,
    pub effective_from: Option<NaiveDate>, // None = open-ended below
    pub effective_to: Option<NaiveDate>,   // None = open-ended above
    pub rates: RateSet,       // None fields inherit from the base rule
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TariffOverride {
    /// Period containment, inclusive on both ends; an override with
    /// no dates is treated as always covering
    pub fn covers(&self, as_of: NaiveDate) -> bool {
        let after_start = self.effective_from.map_or(true, |from| as_of >= from);
        let before_end = self.effective_to.map_or(true, |to| as_of <= to);
        after_start && before_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn override_with(from: Option<NaiveDate>, to: Option<NaiveDate>) -> TariffOverride {
        TariffOverride {
            override_id: "o1".to_string(),
            rule_id: "r1".to_string(),
            override_type: OverrideType::Holiday,
            effective_from: from,
            effective_to: to,
            rates: RateSet::default(),
            notes: None,
            is_active: true,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_covers_inclusive_bounds() {
        let o = override_with(Some(d(2024, 12, 24)), Some(d(2024, 12, 26)));
        assert!(o.covers(d(2024, 12, 24)));
        assert!(o.covers(d(2024, 12, 25)));
        assert!(o.covers(d(2024, 12, 26)));
        assert!(!o.covers(d(2024, 12, 23)));
        assert!(!o.covers(d(2024, 12, 27)));
    }

    #[test]
    fn test_covers_open_ended() {
        assert!(override_with(None, None).covers(d(2024, 1, 1)));
        assert!(override_with(Some(d(2024, 6, 1)), None).covers(d(2030, 1, 1)));
        assert!(!override_with(Some(d(2024, 6, 1)), None).covers(d(2024, 5, 31)));
        assert!(override_with(None, Some(d(2024, 6, 1))).covers(d(2020, 1, 1)));
    }
}
