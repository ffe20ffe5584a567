// ==========================================
// Plantation Tariff Core - Resolution API
// ==========================================
// Responsibility: wrap the pure resolution engine with repository
// reads. Read-only; never writes, never audits.
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::RateSet;
use crate::engine::resolution::ResolutionEngine;
use crate::repository::block_repo::BlockRepository;
use crate::repository::tariff_override_repo::TariffOverrideRepository;
use crate::repository::tariff_rule_repo::TariffRuleRepository;

// ==========================================
// DTO definitions
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveRateDto {
    pub rule_id: String,
    pub tarif_code: String,
    pub perlakuan: String,
    pub as_of: String,
    pub rates: RateSet,
    pub override_id: Option<String>,
    pub override_type: Option<String>,
}

// ==========================================
// ResolutionApi
// ==========================================

/// Effective-rate lookups
///
/// 1. By block: follow the block's assignment to its rule
/// 2. By weight: tier lookup within a land type for a measured BJR
pub struct ResolutionApi {
    block_repo: Arc<BlockRepository>,
    rule_repo: Arc<TariffRuleRepository>,
    override_repo: Arc<TariffOverrideRepository>,
}

impl ResolutionApi {
    pub fn new(
        block_repo: Arc<BlockRepository>,
        rule_repo: Arc<TariffRuleRepository>,
        override_repo: Arc<TariffOverrideRepository>,
    ) -> Self {
        Self {
            block_repo,
            rule_repo,
            override_repo,
        }
    }

    /// Effective rate for a block on a date, through its assignment
    pub fn resolve_for_block(
        &self,
        company_id: &str,
        block_id: &str,
        as_of: &str,
    ) -> ApiResult<EffectiveRateDto> {
        let as_of = parse_date(as_of)?;

        let block = self
            .block_repo
            .find_by_id(block_id)?
            .ok_or_else(|| ApiError::NotFound(format!("block {} does not exist", block_id)))?;
        if block.company_id != company_id {
            return Err(ApiError::CompanyScopeViolation(format!(
                "block {} belongs to another company",
                block_id
            )));
        }

        let rule_id = block.tariff_rule_id.as_deref().ok_or_else(|| {
            ApiError::ValidationError(format!(
                "block {} has no tariff rule assigned",
                block.block_code
            ))
        })?;
        let rule = self
            .rule_repo
            .find_by_id(rule_id)?
            .ok_or_else(|| ApiError::NotFound(format!("tariff rule {} does not exist", rule_id)))?;

        self.resolve_rule(&rule, as_of)
    }

    /// Effective rate for a measured bunch weight within a land type
    pub fn resolve_for_weight(
        &self,
        company_id: &str,
        land_type_id: &str,
        bjr: f64,
        as_of: &str,
    ) -> ApiResult<EffectiveRateDto> {
        let as_of = parse_date(as_of)?;
        if !bjr.is_finite() || bjr < 0.0 {
            return Err(ApiError::InvalidInput(
                "bjr must be a non-negative number".to_string(),
            ));
        }

        let rules = self.rule_repo.list_active_by_land_type(land_type_id)?;
        let scoped: Vec<_> = rules
            .into_iter()
            .filter(|r| r.company_id == company_id)
            .collect();
        if scoped.is_empty() {
            return Err(ApiError::NotFound(format!(
                "land type {} has no active tariff rules",
                land_type_id
            )));
        }

        let rule = ResolutionEngine::select_tier(&scoped, bjr).ok_or_else(|| {
            ApiError::NotFound(format!(
                "no tier matches bjr {} in land type {}",
                bjr, land_type_id
            ))
        })?;

        self.resolve_rule(rule, as_of)
    }

    fn resolve_rule(
        &self,
        rule: &crate::domain::tariff_rule::TariffRule,
        as_of: NaiveDate,
    ) -> ApiResult<EffectiveRateDto> {
        let overrides = self.override_repo.list_active_by_rule(&rule.rule_id)?;
        let effective = ResolutionEngine::resolve(rule, &overrides, as_of);

        Ok(EffectiveRateDto {
            rule_id: effective.rule_id,
            tarif_code: rule.tarif_code.clone(),
            perlakuan: effective.perlakuan,
            as_of: effective.as_of.format("%Y-%m-%d").to_string(),
            rates: effective.rates,
            override_id: effective.override_id,
            override_type: effective.override_type.map(|t| t.as_str().to_string()),
        })
    }
}

fn parse_date(s: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::InvalidInput(format!("invalid date '{}' (expected YYYY-MM-DD)", s)))
}
