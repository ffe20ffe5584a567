// ==========================================
// Plantation Tariff Core - Tariff Override API
// ==========================================
// Responsibility: time-bounded rate overrides on catalog rules.
// Single-item operations are transactional with their audit event;
// the bulk apply is deliberately best-effort, one transaction per
// rule, and reports a summary instead of aborting.
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::tariff_rule_api::now_str;
use crate::domain::audit_event::{AuditEvent, AuditPayload};
use crate::domain::tariff_override::TariffOverride;
use crate::domain::types::{AuditEventType, OverrideType, RateSet};
use crate::repository::tariff_override_repo::TariffOverrideRepository;
use crate::repository::tariff_rule_repo::TariffRuleRepository;

// ==========================================
// DTO definitions
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffOverrideDto {
    pub override_id: String,
    pub rule_id: String,
    pub override_type: String,
    pub effective_from: Option<String>,
    pub effective_to: Option<String>,
    pub rates: RateSet,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TariffOverride> for TariffOverrideDto {
    fn from(o: TariffOverride) -> Self {
        Self {
            override_id: o.override_id,
            rule_id: o.rule_id,
            override_type: o.override_type.as_str().to_string(),
            effective_from: o.effective_from.map(|d| d.format("%Y-%m-%d").to_string()),
            effective_to: o.effective_to.map(|d| d.format("%Y-%m-%d").to_string()),
            rates: o.rates,
            notes: o.notes,
            is_active: o.is_active,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOverrideRequest {
    pub company_id: String,
    pub rule_id: String,
    /// NORMAL / HOLIDAY / FESTIVAL
    pub override_type: String,
    pub effective_from: Option<String>, // YYYY-MM-DD
    pub effective_to: Option<String>,   // YYYY-MM-DD
    pub rates: RateSet,
    pub notes: Option<String>,
    pub actor_id: String,
    pub actor_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOverrideRequest {
    pub company_id: String,
    pub override_id: String,
    pub override_type: String,
    pub effective_from: Option<String>,
    pub effective_to: Option<String>,
    pub rates: RateSet,
    pub notes: Option<String>,
    pub is_active: bool,
    pub actor_id: String,
    pub actor_name: String,
}

/// One override stamped onto every active rule of the company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkOverrideRequest {
    pub company_id: String,
    pub override_type: String,
    pub effective_from: Option<String>,
    pub effective_to: Option<String>,
    pub rates: RateSet,
    pub notes: Option<String>,
    pub actor_id: String,
    pub actor_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkOverrideApplyResponse {
    pub created: usize,
    pub failed: usize,
    pub first_error: Option<String>,
}

// ==========================================
// TariffOverrideApi
// ==========================================

/// Override layer operations
///
/// 1. Create / update / delete a single override (atomic with audit)
/// 2. Bulk apply one override across all active rules (best-effort)
pub struct TariffOverrideApi {
    override_repo: Arc<TariffOverrideRepository>,
    rule_repo: Arc<TariffRuleRepository>,
}

impl TariffOverrideApi {
    pub fn new(
        override_repo: Arc<TariffOverrideRepository>,
        rule_repo: Arc<TariffRuleRepository>,
    ) -> Self {
        Self {
            override_repo,
            rule_repo,
        }
    }

    /// Attach an override to an active rule
    pub fn create_override(&self, request: CreateOverrideRequest) -> ApiResult<TariffOverrideDto> {
        validate_actor(&request.actor_id, &request.actor_name)?;
        let override_type = parse_override_type(&request.override_type)?;
        let (from, to) = parse_period(
            request.effective_from.as_deref(),
            request.effective_to.as_deref(),
        )?;
        if request.rates.is_empty() {
            return Err(ApiError::InvalidInput(
                "an override must set at least one rate field".to_string(),
            ));
        }

        let rule = self.load_scoped_rule(&request.company_id, &request.rule_id)?;
        if !rule.is_active {
            return Err(ApiError::ValidationError(format!(
                "rule {} is inactive and accepts no overrides",
                rule.tarif_code
            )));
        }

        let now = now_str();
        let o = TariffOverride {
            override_id: uuid::Uuid::new_v4().to_string(),
            rule_id: request.rule_id.clone(),
            override_type,
            effective_from: from,
            effective_to: to,
            rates: request.rates,
            notes: request.notes.clone(),
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        };

        let event = AuditEvent::new(
            AuditEventType::OverrideCreated,
            request.company_id.clone(),
            request.actor_id.clone(),
            request.actor_name.clone(),
        )
        .with_rule(&rule.rule_id, &rule.tarif_code)
        .with_override(&o.override_id)
        .with_snapshots(AuditPayload::Empty, AuditPayload::override_values(&o));

        self.override_repo.insert_with_audit(&o, &event)?;

        info!(
            override_id = %o.override_id,
            rule_id = %o.rule_id,
            override_type = %o.override_type.as_str(),
            "tariff override created"
        );
        Ok(o.into())
    }

    /// Update an override's period, rates, and flags
    pub fn update_override(&self, request: UpdateOverrideRequest) -> ApiResult<TariffOverrideDto> {
        validate_actor(&request.actor_id, &request.actor_name)?;
        let override_type = parse_override_type(&request.override_type)?;
        let (from, to) = parse_period(
            request.effective_from.as_deref(),
            request.effective_to.as_deref(),
        )?;
        if request.rates.is_empty() {
            return Err(ApiError::InvalidInput(
                "an override must set at least one rate field".to_string(),
            ));
        }

        let existing = self.load_scoped_override(&request.company_id, &request.override_id)?;
        let rule = self.load_scoped_rule(&request.company_id, &existing.rule_id)?;
        if !rule.is_active {
            return Err(ApiError::ValidationError(format!(
                "rule {} is inactive and accepts no overrides",
                rule.tarif_code
            )));
        }

        let mut updated = existing.clone();
        updated.override_type = override_type;
        updated.effective_from = from;
        updated.effective_to = to;
        updated.rates = request.rates;
        updated.notes = request.notes.clone();
        updated.is_active = request.is_active;

        let event = AuditEvent::new(
            AuditEventType::OverrideUpdated,
            request.company_id.clone(),
            request.actor_id.clone(),
            request.actor_name.clone(),
        )
        .with_rule(&rule.rule_id, &rule.tarif_code)
        .with_override(&updated.override_id)
        .with_snapshots(
            AuditPayload::override_values(&existing),
            AuditPayload::override_values(&updated),
        );

        self.override_repo.update_with_audit(&updated, &event)?;

        info!(override_id = %updated.override_id, "tariff override updated");
        let fresh = self.load_scoped_override(&request.company_id, &request.override_id)?;
        Ok(fresh.into())
    }

    /// Remove an override; its audit trail survives the delete
    pub fn delete_override(
        &self,
        company_id: &str,
        override_id: &str,
        actor_id: &str,
        actor_name: &str,
    ) -> ApiResult<bool> {
        validate_actor(actor_id, actor_name)?;
        let existing = self.load_scoped_override(company_id, override_id)?;
        let rule = self.load_scoped_rule(company_id, &existing.rule_id)?;

        let event = AuditEvent::new(
            AuditEventType::OverrideDeleted,
            company_id.to_string(),
            actor_id.to_string(),
            actor_name.to_string(),
        )
        .with_rule(&rule.rule_id, &rule.tarif_code)
        .with_override(override_id)
        .with_snapshots(AuditPayload::override_values(&existing), AuditPayload::Empty);

        self.override_repo.delete_with_audit(override_id, &event)?;

        info!(override_id = %override_id, "tariff override deleted");
        Ok(true)
    }

    /// Management listing of one rule's overrides
    pub fn list_overrides(&self, company_id: &str, rule_id: &str) -> ApiResult<Vec<TariffOverrideDto>> {
        self.load_scoped_rule(company_id, rule_id)?;
        let overrides = self.override_repo.list_by_rule(rule_id)?;
        Ok(overrides.into_iter().map(Into::into).collect())
    }

    /// Stamp one override onto every active rule of the company.
    ///
    /// Each rule gets its own transaction; one failing rule does not
    /// roll back its siblings. The response carries counts and the
    /// first failure message.
    pub fn bulk_create_override_for_all_active_rules(
        &self,
        request: BulkOverrideRequest,
    ) -> ApiResult<BulkOverrideApplyResponse> {
        validate_actor(&request.actor_id, &request.actor_name)?;
        let override_type = parse_override_type(&request.override_type)?;
        let (from, to) = parse_period(
            request.effective_from.as_deref(),
            request.effective_to.as_deref(),
        )?;
        if request.rates.is_empty() {
            return Err(ApiError::InvalidInput(
                "an override must set at least one rate field".to_string(),
            ));
        }

        let rules = self.rule_repo.list_active_by_company(&request.company_id)?;

        let mut created = 0usize;
        let mut failed = 0usize;
        let mut first_error: Option<String> = None;

        for rule in &rules {
            let now = now_str();
            let o = TariffOverride {
                override_id: uuid::Uuid::new_v4().to_string(),
                rule_id: rule.rule_id.clone(),
                override_type,
                effective_from: from,
                effective_to: to,
                rates: request.rates,
                notes: request.notes.clone(),
                is_active: true,
                created_at: now.clone(),
                updated_at: now,
            };

            let event = AuditEvent::new(
                AuditEventType::OverrideCreated,
                request.company_id.clone(),
                request.actor_id.clone(),
                request.actor_name.clone(),
            )
            .with_rule(&rule.rule_id, &rule.tarif_code)
            .with_override(&o.override_id)
            .with_snapshots(AuditPayload::Empty, AuditPayload::override_values(&o));

            match self.override_repo.insert_with_audit(&o, &event) {
                Ok(()) => created += 1,
                Err(e) => {
                    failed += 1;
                    warn!(
                        rule_id = %rule.rule_id,
                        error = %e,
                        "bulk override apply failed for one rule"
                    );
                    if first_error.is_none() {
                        first_error = Some(format!("rule {}: {}", rule.tarif_code, e));
                    }
                }
            }
        }

        info!(
            company_id = %request.company_id,
            created,
            failed,
            "bulk override apply finished"
        );
        Ok(BulkOverrideApplyResponse {
            created,
            failed,
            first_error,
        })
    }

    // ==========================================
    // private helpers
    // ==========================================

    fn load_scoped_rule(
        &self,
        company_id: &str,
        rule_id: &str,
    ) -> ApiResult<crate::domain::tariff_rule::TariffRule> {
        let rule = self
            .rule_repo
            .find_by_id(rule_id)?
            .ok_or_else(|| ApiError::NotFound(format!("tariff rule {} does not exist", rule_id)))?;
        if rule.company_id != company_id {
            return Err(ApiError::CompanyScopeViolation(format!(
                "rule {} belongs to another company",
                rule_id
            )));
        }
        Ok(rule)
    }

    /// Scope check runs through the owning rule; overrides carry no
    /// company_id of their own
    fn load_scoped_override(
        &self,
        company_id: &str,
        override_id: &str,
    ) -> ApiResult<TariffOverride> {
        let o = self
            .override_repo
            .find_by_id(override_id)?
            .ok_or_else(|| ApiError::NotFound(format!("override {} does not exist", override_id)))?;
        self.load_scoped_rule(company_id, &o.rule_id)?;
        Ok(o)
    }
}

fn validate_actor(actor_id: &str, actor_name: &str) -> ApiResult<()> {
    if actor_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("actor_id must not be empty".to_string()));
    }
    if actor_name.trim().is_empty() {
        return Err(ApiError::InvalidInput("actor_name must not be empty".to_string()));
    }
    Ok(())
}

fn parse_override_type(s: &str) -> ApiResult<OverrideType> {
    OverrideType::from_str(s.trim()).ok_or_else(|| {
        ApiError::InvalidInput(format!(
            "override_type must be NORMAL, HOLIDAY, or FESTIVAL (got '{}')",
            s
        ))
    })
}

fn parse_period(
    from: Option<&str>,
    to: Option<&str>,
) -> ApiResult<(Option<NaiveDate>, Option<NaiveDate>)> {
    let from = from.map(parse_date).transpose()?;
    let to = to.map(parse_date).transpose()?;
    if let (Some(lo), Some(hi)) = (from, to) {
        if lo > hi {
            return Err(ApiError::InvalidInput(format!(
                "effective_from ({}) must not be after effective_to ({})",
                lo, hi
            )));
        }
    }
    Ok((from, to))
}

fn parse_date(s: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::InvalidInput(format!("invalid date '{}' (expected YYYY-MM-DD)", s)))
}
