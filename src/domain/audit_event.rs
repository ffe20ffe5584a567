// ==========================================
// Plantation Tariff Core - Audit Event Model
// ==========================================
// Red line: every mutation to rules, overrides, and block
// assignments writes exactly one event, inside the same
// transaction as the mutation. Events are append-only.
// ==========================================

use crate::domain::types::{AuditEventType, OverrideType, RateSet};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// AuditPayload - typed before/after snapshot
// ==========================================
// Tagged union keyed by the event kind, so audit records stay
// machine-verifiable instead of free-form JSON blobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditPayload {
    /// No prior/posterior state (create's before, delete's after)
    Empty,
    BlockAssignment {
        land_type_id: Option<String>,
        tariff_rule_id: Option<String>,
        tarif_code: Option<String>,
        perlakuan: Option<String>,
    },
    RuleValues {
        scheme_code: String,
        tarif_code: String,
        bjr_min_kg: Option<f64>,
        bjr_max_kg: Option<f64>,
        rates: RateSet,
        sort_order: i32,
        is_active: bool,
    },
    OverrideValues {
        override_type: OverrideType,
        effective_from: Option<NaiveDate>,
        effective_to: Option<NaiveDate>,
        rates: RateSet,
        notes: Option<String>,
        is_active: bool,
    },
}

// ==========================================
// AuditEvent - one audited mutation
// ==========================================
// Subject identifiers (block/rule/override, division) are
// denormalized so the audit viewer can search without joins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: String,          // UUID
    pub event_type: AuditEventType,
    pub changed_at: NaiveDateTime,
    pub company_id: String,        // denormalized for scoped querying
    pub actor_id: String,
    pub actor_name: String,

    // ===== subject identifiers =====
    pub block_id: Option<String>,
    pub block_code: Option<String>,
    pub block_name: Option<String>,
    pub division_name: Option<String>,
    pub rule_id: Option<String>,
    pub rule_code: Option<String>,
    pub override_id: Option<String>,

    // ===== snapshots =====
    pub before: AuditPayload,
    pub after: AuditPayload,
}

impl AuditEvent {
    /// New event with generated id and current timestamp;
    /// subject fields and snapshots are filled via the with_* helpers
    pub fn new(
        event_type: AuditEventType,
        company_id: String,
        actor_id: String,
        actor_name: String,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            event_type,
            changed_at: chrono::Utc::now().naive_utc(),
            company_id,
            actor_id,
            actor_name,
            block_id: None,
            block_code: None,
            block_name: None,
            division_name: None,
            rule_id: None,
            rule_code: None,
            override_id: None,
            before: AuditPayload::Empty,
            after: AuditPayload::Empty,
        }
    }

    /// Attach rule subject identifiers
    pub fn with_rule(mut self, rule_id: &str, rule_code: &str) -> Self {
        self.rule_id = Some(rule_id.to_string());
        self.rule_code = Some(rule_code.to_string());
        self
    }

    /// Attach override subject identifier
    pub fn with_override(mut self, override_id: &str) -> Self {
        self.override_id = Some(override_id.to_string());
        self
    }

    /// Attach block subject identifiers
    pub fn with_block(mut self, block_id: &str, block_code: &str, block_name: &str, division_name: &str) -> Self {
        self.block_id = Some(block_id.to_string());
        self.block_code = Some(block_code.to_string());
        self.block_name = Some(block_name.to_string());
        self.division_name = Some(division_name.to_string());
        self
    }

    /// Attach before/after snapshots
    pub fn with_snapshots(mut self, before: AuditPayload, after: AuditPayload) -> Self {
        self.before = before;
        self.after = after;
        self
    }
}

impl AuditPayload {
    /// Rule snapshot from the entity's current state
    pub fn rule_values(rule: &crate::domain::tariff_rule::TariffRule) -> Self {
        AuditPayload::RuleValues {
            scheme_code: rule.scheme_code.clone(),
            tarif_code: rule.tarif_code.clone(),
            bjr_min_kg: rule.bjr_min_kg,
            bjr_max_kg: rule.bjr_max_kg,
            rates: rule.rates,
            sort_order: rule.sort_order,
            is_active: rule.is_active,
        }
    }

    /// Override snapshot from the entity's current state
    pub fn override_values(o: &crate::domain::tariff_override::TariffOverride) -> Self {
        AuditPayload::OverrideValues {
            override_type: o.override_type,
            effective_from: o.effective_from,
            effective_to: o.effective_to,
            rates: o.rates,
            notes: o.notes.clone(),
            is_active: o.is_active,
        }
    }
}
