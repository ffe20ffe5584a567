// ==========================================
// Plantation Tariff Core - Tariff Rule API
// ==========================================
// Responsibility: catalog management for BJR-tier piece-rate rules.
// All field validation happens here, before any write; every
// successful mutation commits with exactly one audit event.
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::audit_event::{AuditEvent, AuditPayload};
use crate::domain::land_type::LandType;
use crate::domain::tariff_rule::TariffRule;
use crate::domain::types::{AuditEventType, RateSet};
use crate::repository::land_type_repo::LandTypeRepository;
use crate::repository::tariff_rule_repo::TariffRuleRepository;

// ==========================================
// DTO definitions
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffRuleDto {
    pub rule_id: String,
    pub company_id: String,
    pub land_type_id: String,
    pub scheme_code: String,
    pub tarif_code: String,
    /// Derived display label, never persisted
    pub perlakuan: String,
    pub bjr_min_kg: Option<f64>,
    pub bjr_max_kg: Option<f64>,
    pub rates: RateSet,
    pub sort_order: i32,
    pub keterangan: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TariffRule> for TariffRuleDto {
    fn from(rule: TariffRule) -> Self {
        let perlakuan = rule.perlakuan();
        Self {
            rule_id: rule.rule_id,
            company_id: rule.company_id,
            land_type_id: rule.land_type_id,
            scheme_code: rule.scheme_code,
            tarif_code: rule.tarif_code,
            perlakuan,
            bjr_min_kg: rule.bjr_min_kg,
            bjr_max_kg: rule.bjr_max_kg,
            rates: rule.rates,
            sort_order: rule.sort_order,
            keterangan: rule.keterangan,
            is_active: rule.is_active,
            created_at: rule.created_at,
            updated_at: rule.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandTypeDto {
    pub land_type_id: String,
    pub company_id: String,
    pub code: String,
    pub name: String,
    pub is_active: bool,
}

impl From<LandType> for LandTypeDto {
    fn from(lt: LandType) -> Self {
        Self {
            land_type_id: lt.land_type_id,
            company_id: lt.company_id,
            code: lt.code,
            name: lt.name,
            is_active: lt.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTariffRuleRequest {
    pub company_id: String,
    pub land_type_id: String,
    pub tarif_code: String,
    pub bjr_min_kg: Option<f64>,
    pub bjr_max_kg: Option<f64>,
    pub rates: RateSet,
    pub sort_order: i32,
    pub keterangan: Option<String>,
    pub actor_id: String,
    pub actor_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTariffRuleRequest {
    pub company_id: String,
    pub rule_id: String,
    pub tarif_code: String,
    pub bjr_min_kg: Option<f64>,
    pub bjr_max_kg: Option<f64>,
    pub rates: RateSet,
    pub sort_order: i32,
    pub keterangan: Option<String>,
    pub is_active: bool,
    pub actor_id: String,
    pub actor_name: String,
}

// ==========================================
// TariffRuleApi
// ==========================================

/// Tariff rule catalog operations
///
/// 1. Create / update / deactivate / hard-delete BJR-tier rules
/// 2. Listing with scheme and land-type filters
/// 3. Land type catalog for the new-rule picker
pub struct TariffRuleApi {
    rule_repo: Arc<TariffRuleRepository>,
    land_type_repo: Arc<LandTypeRepository>,
}

impl TariffRuleApi {
    pub fn new(rule_repo: Arc<TariffRuleRepository>, land_type_repo: Arc<LandTypeRepository>) -> Self {
        Self {
            rule_repo,
            land_type_repo,
        }
    }

    /// Create a new tier rule under a land type.
    ///
    /// The scheme code mirrors the land type's code; a deactivated
    /// land type rejects new rules. Active tiers of the same land
    /// type must not overlap in BJR range.
    pub fn create_rule(&self, request: CreateTariffRuleRequest) -> ApiResult<TariffRuleDto> {
        validate_actor(&request.actor_id, &request.actor_name)?;
        validate_tarif_code(&request.tarif_code)?;
        validate_bjr_range(request.bjr_min_kg, request.bjr_max_kg)?;

        let land_type = self
            .land_type_repo
            .find_by_id(&request.land_type_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("land type {} does not exist", request.land_type_id))
            })?;
        if land_type.company_id != request.company_id {
            return Err(ApiError::CompanyScopeViolation(format!(
                "land type {} belongs to another company",
                request.land_type_id
            )));
        }
        if !land_type.is_active {
            return Err(ApiError::ValidationError(format!(
                "land type {} is deactivated and accepts no new rules",
                land_type.code
            )));
        }

        let now = now_str();
        let rule = TariffRule {
            rule_id: uuid::Uuid::new_v4().to_string(),
            company_id: request.company_id.clone(),
            land_type_id: request.land_type_id.clone(),
            scheme_code: land_type.code.clone(),
            tarif_code: request.tarif_code.trim().to_string(),
            bjr_min_kg: request.bjr_min_kg,
            bjr_max_kg: request.bjr_max_kg,
            rates: request.rates,
            sort_order: request.sort_order,
            keterangan: request.keterangan.clone(),
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        };

        self.check_tier_overlap(&rule)?;

        let event = AuditEvent::new(
            AuditEventType::RuleValuesUpdated,
            request.company_id.clone(),
            request.actor_id.clone(),
            request.actor_name.clone(),
        )
        .with_rule(&rule.rule_id, &rule.tarif_code)
        .with_snapshots(AuditPayload::Empty, AuditPayload::rule_values(&rule));

        self.rule_repo.insert_with_audit(&rule, &event)?;

        info!(
            rule_id = %rule.rule_id,
            tarif_code = %rule.tarif_code,
            scheme = %rule.scheme_code,
            "tariff rule created"
        );
        Ok(rule.into())
    }

    /// Update a rule's tier bounds, rates, and flags
    pub fn update_rule(&self, request: UpdateTariffRuleRequest) -> ApiResult<TariffRuleDto> {
        validate_actor(&request.actor_id, &request.actor_name)?;
        validate_tarif_code(&request.tarif_code)?;
        validate_bjr_range(request.bjr_min_kg, request.bjr_max_kg)?;

        let existing = self.load_scoped_rule(&request.company_id, &request.rule_id)?;

        let mut updated = existing.clone();
        updated.tarif_code = request.tarif_code.trim().to_string();
        updated.bjr_min_kg = request.bjr_min_kg;
        updated.bjr_max_kg = request.bjr_max_kg;
        updated.rates = request.rates;
        updated.sort_order = request.sort_order;
        updated.keterangan = request.keterangan.clone();
        updated.is_active = request.is_active;

        self.check_tier_overlap(&updated)?;

        let event = AuditEvent::new(
            AuditEventType::RuleValuesUpdated,
            request.company_id.clone(),
            request.actor_id.clone(),
            request.actor_name.clone(),
        )
        .with_rule(&updated.rule_id, &updated.tarif_code)
        .with_snapshots(
            AuditPayload::rule_values(&existing),
            AuditPayload::rule_values(&updated),
        );

        self.rule_repo.update_with_audit(&updated, &event)?;

        info!(rule_id = %updated.rule_id, "tariff rule updated");
        // Re-read so the DTO carries the database-side updated_at
        let fresh = self.load_scoped_rule(&request.company_id, &request.rule_id)?;
        Ok(fresh.into())
    }

    /// Soft-retire a rule: it stops matching new resolutions, but
    /// existing block assignments keep resolving through it
    pub fn deactivate_rule(
        &self,
        company_id: &str,
        rule_id: &str,
        actor_id: &str,
        actor_name: &str,
    ) -> ApiResult<TariffRuleDto> {
        validate_actor(actor_id, actor_name)?;
        let existing = self.load_scoped_rule(company_id, rule_id)?;
        if !existing.is_active {
            return Err(ApiError::ValidationError(format!(
                "rule {} is already inactive",
                existing.tarif_code
            )));
        }

        let mut updated = existing.clone();
        updated.is_active = false;

        let event = AuditEvent::new(
            AuditEventType::RuleValuesUpdated,
            company_id.to_string(),
            actor_id.to_string(),
            actor_name.to_string(),
        )
        .with_rule(rule_id, &updated.tarif_code)
        .with_snapshots(
            AuditPayload::rule_values(&existing),
            AuditPayload::rule_values(&updated),
        );

        self.rule_repo.update_with_audit(&updated, &event)?;

        info!(rule_id = %rule_id, "tariff rule deactivated");
        let fresh = self.load_scoped_rule(company_id, rule_id)?;
        Ok(fresh.into())
    }

    /// Hard-delete an unreferenced rule. Rules still referenced by a
    /// block assignment or an override are refused by name.
    pub fn delete_rule(
        &self,
        company_id: &str,
        rule_id: &str,
        actor_id: &str,
        actor_name: &str,
    ) -> ApiResult<bool> {
        validate_actor(actor_id, actor_name)?;
        let existing = self.load_scoped_rule(company_id, rule_id)?;

        let block_refs = self.rule_repo.count_block_references(rule_id)?;
        if block_refs > 0 {
            return Err(ApiError::StillReferenced {
                entity: "TariffRule".to_string(),
                id: rule_id.to_string(),
                referenced_by: format!("{} block assignment(s)", block_refs),
            });
        }
        let override_refs = self.rule_repo.count_override_references(rule_id)?;
        if override_refs > 0 {
            return Err(ApiError::StillReferenced {
                entity: "TariffRule".to_string(),
                id: rule_id.to_string(),
                referenced_by: format!("{} override(s)", override_refs),
            });
        }

        let event = AuditEvent::new(
            AuditEventType::RuleValuesUpdated,
            company_id.to_string(),
            actor_id.to_string(),
            actor_name.to_string(),
        )
        .with_rule(rule_id, &existing.tarif_code)
        .with_snapshots(AuditPayload::rule_values(&existing), AuditPayload::Empty);

        self.rule_repo.delete_with_audit(rule_id, &event)?;

        info!(rule_id = %rule_id, tarif_code = %existing.tarif_code, "tariff rule deleted");
        Ok(true)
    }

    /// Catalog listing with optional scheme / land-type filters
    pub fn list_rules(
        &self,
        company_id: &str,
        scheme_filter: Option<&str>,
        land_type_filter: Option<&str>,
    ) -> ApiResult<Vec<TariffRuleDto>> {
        let rules = self
            .rule_repo
            .list_by_company(company_id, scheme_filter, land_type_filter)?;
        Ok(rules.into_iter().map(Into::into).collect())
    }

    /// Active land types for the new-rule picker
    pub fn list_land_types(&self, company_id: &str) -> ApiResult<Vec<LandTypeDto>> {
        let land_types = self.land_type_repo.list_by_company(company_id, true)?;
        Ok(land_types.into_iter().map(Into::into).collect())
    }

    // ==========================================
    // private helpers
    // ==========================================

    /// Load a rule and enforce the caller's company scope
    fn load_scoped_rule(&self, company_id: &str, rule_id: &str) -> ApiResult<TariffRule> {
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

    /// Reject an active tier whose BJR range overlaps a sibling
    /// active tier of the same land type
    fn check_tier_overlap(&self, candidate: &TariffRule) -> ApiResult<()> {
        if !candidate.is_active {
            return Ok(());
        }
        let siblings = self
            .rule_repo
            .list_active_by_land_type(&candidate.land_type_id)?;
        for sibling in &siblings {
            if sibling.rule_id == candidate.rule_id {
                continue;
            }
            if candidate.bjr_range_overlaps(sibling) {
                return Err(ApiError::ValidationError(format!(
                    "BJR range overlaps active tier {} ({:?}..{:?})",
                    sibling.tarif_code, sibling.bjr_min_kg, sibling.bjr_max_kg
                )));
            }
        }
        Ok(())
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

fn validate_tarif_code(tarif_code: &str) -> ApiResult<()> {
    if tarif_code.trim().is_empty() {
        return Err(ApiError::InvalidInput("tarif_code must not be empty".to_string()));
    }
    Ok(())
}

fn validate_bjr_range(min: Option<f64>, max: Option<f64>) -> ApiResult<()> {
    if let Some(m) = min {
        if m < 0.0 || !m.is_finite() {
            return Err(ApiError::InvalidInput(
                "bjr_min_kg must be a non-negative number".to_string(),
            ));
        }
    }
    if let Some(m) = max {
        if m < 0.0 || !m.is_finite() {
            return Err(ApiError::InvalidInput(
                "bjr_max_kg must be a non-negative number".to_string(),
            ));
        }
    }
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo >= hi {
            return Err(ApiError::InvalidInput(format!(
                "bjr_min_kg ({}) must be less than bjr_max_kg ({})",
                lo, hi
            )));
        }
    }
    Ok(())
}

pub(crate) fn now_str() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
