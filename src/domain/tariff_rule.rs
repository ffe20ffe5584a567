// ==========================================
// Plantation Tariff Core - Tariff Rule Entity
// ==========================================
// One BJR-range tier with its base pay parameters.
// Invariant: bjr_min_kg < bjr_max_kg when both set.
// Invariant: active tiers of one (company, land type) scope must
// not overlap; enforced at the operation boundary before writes.
// ==========================================

use crate::domain::types::{perlakuan_label, RateSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffRule {
    pub rule_id: String,        // UUID
    pub company_id: String,     // owning company scope
    pub land_type_id: String,   // scheme source
    pub scheme_code: String,    // mirrors the land type's code
    pub tarif_code: String,     // tier identifier, unique within a scheme
    pub bjr_min_kg: Option<f64>, // tier lower bound, inclusive; None = unbounded below
    pub bjr_max_kg: Option<f64>, // tier upper bound, exclusive; None = unbounded above
    pub rates: RateSet,         // base pay parameters, None = not set
    pub sort_order: i32,        // advisory ordering and tie-break only
    pub keterangan: Option<String>, // free-form description
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TariffRule {
    /// Derived display label (never persisted)
    pub fn perlakuan(&self) -> String {
        perlakuan_label(&self.scheme_code, &self.tarif_code)
    }

    /// Half-open interval containment: bjr_min_kg <= bjr < bjr_max_kg,
    /// an absent bound is unbounded on that side
    pub fn contains_bjr(&self, bjr: f64) -> bool {
        let above_min = self.bjr_min_kg.map_or(true, |min| bjr >= min);
        let below_max = self.bjr_max_kg.map_or(true, |max| bjr < max);
        above_min && below_max
    }

    /// True when this tier's BJR range overlaps another tier's range.
    /// Both ranges are half-open [min, max); an absent bound is unbounded.
    pub fn bjr_range_overlaps(&self, other: &TariffRule) -> bool {
        bjr_ranges_overlap(
            self.bjr_min_kg,
            self.bjr_max_kg,
            other.bjr_min_kg,
            other.bjr_max_kg,
        )
    }
}

/// Overlap check for two half-open [min, max) ranges,
/// None = unbounded on that side
pub fn bjr_ranges_overlap(
    a_min: Option<f64>,
    a_max: Option<f64>,
    b_min: Option<f64>,
    b_max: Option<f64>,
) -> bool {
    let a_starts_before_b_ends = match (a_min, b_max) {
        (Some(amin), Some(bmax)) => amin < bmax,
        _ => true,
    };
    let b_starts_before_a_ends = match (b_min, a_max) {
        (Some(bmin), Some(amax)) => bmin < amax,
        _ => true,
    };
    a_starts_before_b_ends && b_starts_before_a_ends
}
