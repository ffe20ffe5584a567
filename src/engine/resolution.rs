// ==========================================
// Plantation Tariff Core - Resolution Engine
// ==========================================
// Responsibility: pure tier selection, override precedence, and
// rate merging for "effective rate for rule R on date D"
// Red line: stateless, no side effects, no I/O. Identical inputs
// must yield identical results on every call.
// ==========================================

use crate::domain::tariff_override::TariffOverride;
use crate::domain::tariff_rule::TariffRule;
use crate::domain::types::{OverrideType, RateSet};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// ==========================================
// EffectiveRateSet - merged result with provenance
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveRateSet {
    pub rule_id: String,
    pub perlakuan: String,
    pub as_of: NaiveDate,
    pub rates: RateSet,
    /// Which override produced the replaced fields, if any
    pub override_id: Option<String>,
    pub override_type: Option<OverrideType>,
}

// ==========================================
// ResolutionEngine - pure function toolkit
// ==========================================
pub struct ResolutionEngine;

impl ResolutionEngine {
    /// Select the tariff tier for a measured bunch weight.
    ///
    /// # Rules
    /// - only active rules participate
    /// - a tier matches when bjr lies in its half-open [min, max);
    ///   an absent bound is unbounded on that side
    /// - no exact match: fall back to the highest-bound tier
    ///   (the open-ended upper tier when one exists)
    /// - ties break by ascending sort_order, then tarif_code
    pub fn select_tier(rules: &[TariffRule], bjr: f64) -> Option<&TariffRule> {
        let active: Vec<&TariffRule> = rules.iter().filter(|r| r.is_active).collect();

        let exact = active
            .iter()
            .filter(|r| r.contains_bjr(bjr))
            .copied()
            .min_by(|a, b| tier_tie_break(a, b));
        if exact.is_some() {
            return exact;
        }

        // fallback: highest upper bound; None = unbounded = highest
        active
            .iter()
            .copied()
            .max_by(|a, b| match (a.bjr_max_kg, b.bjr_max_kg) {
                (None, None) => tier_tie_break(b, a), // max_by keeps the tie-break winner
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(am), Some(bm)) => am
                    .partial_cmp(&bm)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| tier_tie_break(b, a)),
            })
    }

    /// Choose the single override applied for one resolution.
    ///
    /// # Rules
    /// - candidates: active overrides whose period covers as_of
    ///   (an override with no dates always covers)
    /// - type precedence: FESTIVAL > HOLIDAY > NORMAL
    /// - within one type, the later effective_from wins (most
    ///   specific/most recent); an absent start date loses to any set one
    /// - final tie-break by override_id so the result is deterministic
    pub fn pick_override(overrides: &[TariffOverride], as_of: NaiveDate) -> Option<&TariffOverride> {
        overrides
            .iter()
            .filter(|o| o.is_active && o.covers(as_of))
            .max_by(|a, b| {
                a.override_type
                    .precedence()
                    .cmp(&b.override_type.precedence())
                    .then_with(|| a.effective_from.cmp(&b.effective_from))
                    .then_with(|| b.override_id.cmp(&a.override_id))
            })
    }

    /// Merge the chosen override over the base rule, field by field:
    /// the override's value where set, otherwise the base value
    pub fn merge(
        rule: &TariffRule,
        chosen: Option<&TariffOverride>,
        as_of: NaiveDate,
    ) -> EffectiveRateSet {
        let rates = match chosen {
            Some(o) => o.rates.merge_over(&rule.rates),
            None => rule.rates,
        };

        EffectiveRateSet {
            rule_id: rule.rule_id.clone(),
            perlakuan: rule.perlakuan(),
            as_of,
            rates,
            override_id: chosen.map(|o| o.override_id.clone()),
            override_type: chosen.map(|o| o.override_type),
        }
    }

    /// Full resolution for a known base rule: filter + precedence + merge
    pub fn resolve(
        rule: &TariffRule,
        overrides: &[TariffOverride],
        as_of: NaiveDate,
    ) -> EffectiveRateSet {
        let chosen = Self::pick_override(overrides, as_of);
        Self::merge(rule, chosen, as_of)
    }
}

/// Ascending sort_order, then tarif_code, then rule_id
fn tier_tie_break(a: &TariffRule, b: &TariffRule) -> Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then_with(|| a.tarif_code.cmp(&b.tarif_code))
        .then_with(|| a.rule_id.cmp(&b.rule_id))
}
