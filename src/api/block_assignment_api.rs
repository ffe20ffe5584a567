// ==========================================
// Plantation Tariff Core - Block Assignment API
// ==========================================
// Responsibility: bind one (land type, rule) pair to a block.
// The pair is replaced in a single UPDATE; the before/after
// assignment snapshot commits in the same transaction.
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::audit_event::{AuditEvent, AuditPayload};
use crate::domain::block::Block;
use crate::domain::types::AuditEventType;
use crate::repository::block_repo::BlockRepository;
use crate::repository::tariff_rule_repo::TariffRuleRepository;

// ==========================================
// DTO definitions
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDto {
    pub block_id: String,
    pub company_id: String,
    pub division_id: String,
    pub division_name: String,
    pub block_code: String,
    pub block_name: String,
    pub land_type_id: Option<String>,
    pub tariff_rule_id: Option<String>,
    pub updated_at: String,
}

impl From<Block> for BlockDto {
    fn from(b: Block) -> Self {
        Self {
            block_id: b.block_id,
            company_id: b.company_id,
            division_id: b.division_id,
            division_name: b.division_name,
            block_code: b.block_code,
            block_name: b.block_name,
            land_type_id: b.land_type_id,
            tariff_rule_id: b.tariff_rule_id,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignBlockRuleRequest {
    pub company_id: String,
    pub block_id: String,
    pub land_type_id: String,
    pub tariff_rule_id: String,
    pub actor_id: String,
    pub actor_name: String,
}

// ==========================================
// BlockAssignmentApi
// ==========================================

/// Block-to-rule assignment operations
pub struct BlockAssignmentApi {
    block_repo: Arc<BlockRepository>,
    rule_repo: Arc<TariffRuleRepository>,
}

impl BlockAssignmentApi {
    pub fn new(block_repo: Arc<BlockRepository>, rule_repo: Arc<TariffRuleRepository>) -> Self {
        Self {
            block_repo,
            rule_repo,
        }
    }

    /// Assign a rule (and its land type) to a block.
    ///
    /// The rule must belong to the given land type and to the
    /// caller's company; the block must be in the same company.
    pub fn assign_rule(&self, request: AssignBlockRuleRequest) -> ApiResult<BlockDto> {
        if request.actor_id.trim().is_empty() || request.actor_name.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "actor_id and actor_name must not be empty".to_string(),
            ));
        }

        let block = self
            .block_repo
            .find_by_id(&request.block_id)?
            .ok_or_else(|| ApiError::NotFound(format!("block {} does not exist", request.block_id)))?;
        if block.company_id != request.company_id {
            return Err(ApiError::CompanyScopeViolation(format!(
                "block {} belongs to another company",
                request.block_id
            )));
        }

        let rule = self
            .rule_repo
            .find_by_id(&request.tariff_rule_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("tariff rule {} does not exist", request.tariff_rule_id))
            })?;
        if rule.company_id != request.company_id {
            return Err(ApiError::CompanyScopeViolation(format!(
                "rule {} belongs to another company",
                request.tariff_rule_id
            )));
        }
        if rule.land_type_id != request.land_type_id {
            return Err(ApiError::ValidationError(format!(
                "rule {} does not belong to land type {}",
                rule.tarif_code, request.land_type_id
            )));
        }
        if !rule.is_active {
            return Err(ApiError::ValidationError(format!(
                "rule {} is inactive and cannot be assigned",
                rule.tarif_code
            )));
        }

        // previous assignment for the before-snapshot
        let before = match &block.tariff_rule_id {
            Some(old_rule_id) => {
                let old = self.rule_repo.find_by_id(old_rule_id)?;
                AuditPayload::BlockAssignment {
                    land_type_id: block.land_type_id.clone(),
                    tariff_rule_id: block.tariff_rule_id.clone(),
                    tarif_code: old.as_ref().map(|r| r.tarif_code.clone()),
                    perlakuan: old.as_ref().map(|r| r.perlakuan()),
                }
            }
            None => AuditPayload::Empty,
        };
        let after = AuditPayload::BlockAssignment {
            land_type_id: Some(request.land_type_id.clone()),
            tariff_rule_id: Some(request.tariff_rule_id.clone()),
            tarif_code: Some(rule.tarif_code.clone()),
            perlakuan: Some(rule.perlakuan()),
        };

        let event = AuditEvent::new(
            AuditEventType::BlockAssignmentChanged,
            request.company_id.clone(),
            request.actor_id.clone(),
            request.actor_name.clone(),
        )
        .with_block(
            &block.block_id,
            &block.block_code,
            &block.block_name,
            &block.division_name,
        )
        .with_rule(&rule.rule_id, &rule.tarif_code)
        .with_snapshots(before, after);

        self.block_repo.update_assignment_with_audit(
            &request.block_id,
            &request.land_type_id,
            &request.tariff_rule_id,
            &event,
        )?;

        info!(
            block_id = %request.block_id,
            rule_id = %request.tariff_rule_id,
            "block assignment changed"
        );
        let fresh = self
            .block_repo
            .find_by_id(&request.block_id)?
            .ok_or_else(|| ApiError::NotFound(format!("block {} does not exist", request.block_id)))?;
        Ok(fresh.into())
    }

    /// Listing for the assignment screen
    pub fn list_blocks(&self, company_id: &str) -> ApiResult<Vec<BlockDto>> {
        let blocks = self.block_repo.list_by_company(company_id)?;
        Ok(blocks.into_iter().map(Into::into).collect())
    }
}
