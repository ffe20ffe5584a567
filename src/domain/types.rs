// ==========================================
// Plantation Tariff Core - Shared Value Types
// ==========================================
// Responsibility: enums and value objects shared across layers
// Red line: no data access, no engine logic
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// OverrideType - occasion tag on a tariff override
// ==========================================
// Precedence at resolution time: FESTIVAL > HOLIDAY > NORMAL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverrideType {
    Normal,
    Holiday,
    Festival,
}

impl OverrideType {
    /// String form used for database storage and DTOs
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideType::Normal => "NORMAL",
            OverrideType::Holiday => "HOLIDAY",
            OverrideType::Festival => "FESTIVAL",
        }
    }

    /// Parse from the stored string form
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "NORMAL" => Some(OverrideType::Normal),
            "HOLIDAY" => Some(OverrideType::Holiday),
            "FESTIVAL" => Some(OverrideType::Festival),
            _ => None,
        }
    }

    /// Resolution precedence rank (higher wins)
    pub fn precedence(&self) -> u8 {
        match self {
            OverrideType::Normal => 0,
            OverrideType::Holiday => 1,
            OverrideType::Festival => 2,
        }
    }
}

// ==========================================
// AuditEventType - kind of audited mutation
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEventType {
    BlockAssignmentChanged,
    RuleValuesUpdated,
    OverrideCreated,
    OverrideUpdated,
    OverrideDeleted,
}

impl AuditEventType {
    /// String form used for database storage and DTOs
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::BlockAssignmentChanged => "BLOCK_ASSIGNMENT_CHANGED",
            AuditEventType::RuleValuesUpdated => "RULE_VALUES_UPDATED",
            AuditEventType::OverrideCreated => "OVERRIDE_CREATED",
            AuditEventType::OverrideUpdated => "OVERRIDE_UPDATED",
            AuditEventType::OverrideDeleted => "OVERRIDE_DELETED",
        }
    }

    /// Parse from the stored string form
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "BLOCK_ASSIGNMENT_CHANGED" => Some(AuditEventType::BlockAssignmentChanged),
            "RULE_VALUES_UPDATED" => Some(AuditEventType::RuleValuesUpdated),
            "OVERRIDE_CREATED" => Some(AuditEventType::OverrideCreated),
            "OVERRIDE_UPDATED" => Some(AuditEventType::OverrideUpdated),
            "OVERRIDE_DELETED" => Some(AuditEventType::OverrideDeleted),
            _ => None,
        }
    }
}

// ==========================================
// RateSet - piece-rate pay parameters
// ==========================================
// Shared shape between a rule's base rates and an override's
// replacement rates. None means "not set" (override: inherit base).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSet {
    pub basis: Option<f64>,         // basis quantity (kg per day)
    pub tarif_upah: Option<f64>,    // wage rate
    pub premi: Option<f64>,         // premium rate
    pub tarif_premi1: Option<f64>,  // premium tier 1 rate
    pub tarif_premi2: Option<f64>,  // premium tier 2 rate
    pub tarif_libur: Option<f64>,   // holiday rate
    pub tarif_lebaran: Option<f64>, // festival (Lebaran) rate
}

impl RateSet {
    /// Field-wise merge: self's value where set, otherwise the base value
    pub fn merge_over(&self, base: &RateSet) -> RateSet {
        RateSet {
            basis: self.basis.or(base.basis),
            tarif_upah: self.tarif_upah.or(base.tarif_upah),
            premi: self.premi.or(base.premi),
            tarif_premi1: self.tarif_premi1.or(base.tarif_premi1),
            tarif_premi2: self.tarif_premi2.or(base.tarif_premi2),
            tarif_libur: self.tarif_libur.or(base.tarif_libur),
            tarif_lebaran: self.tarif_lebaran.or(base.tarif_lebaran),
        }
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.basis.is_none()
            && self.tarif_upah.is_none()
            && self.premi.is_none()
            && self.tarif_premi1.is_none()
            && self.tarif_premi2.is_none()
            && self.tarif_libur.is_none()
            && self.tarif_lebaran.is_none()
    }
}

// ==========================================
// Perlakuan - derived display label
// ==========================================
// Built from scheme code + tariff code; never persisted, so the
// label cannot drift from the underlying codes.
pub fn perlakuan_label(scheme_code: &str, tarif_code: &str) -> String {
    format!("{} - {}", scheme_code.trim(), tarif_code.trim())
}
