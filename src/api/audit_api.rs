// ==========================================
// Plantation Tariff Core - Audit Query Facade
// ==========================================
// Responsibility: read-only, paginated access to the audit trail.
// The write path stays inside the repositories; no public API
// appends, updates, or deletes events.
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::audit_event::{AuditEvent, AuditPayload};
use crate::domain::types::AuditEventType;
use crate::repository::audit_log_repo::{AuditEventFilter, AuditLogRepository};

const MAX_PAGE_SIZE: i64 = 500;

// ==========================================
// DTO definitions
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEventDto {
    pub event_id: String,
    pub event_type: String,
    pub changed_at: String,
    pub actor_id: String,
    pub actor_name: String,
    pub block_id: Option<String>,
    pub block_code: Option<String>,
    pub block_name: Option<String>,
    pub division_name: Option<String>,
    pub rule_id: Option<String>,
    pub rule_code: Option<String>,
    pub override_id: Option<String>,
    pub before: AuditPayload,
    pub after: AuditPayload,
}

impl From<AuditEvent> for AuditEventDto {
    fn from(e: AuditEvent) -> Self {
        Self {
            event_id: e.event_id,
            event_type: e.event_type.as_str().to_string(),
            changed_at: e.changed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            actor_id: e.actor_id,
            actor_name: e.actor_name,
            block_id: e.block_id,
            block_code: e.block_code,
            block_name: e.block_name,
            division_name: e.division_name,
            rule_id: e.rule_id,
            rule_code: e.rule_code,
            override_id: e.override_id,
            before: e.before,
            after: e.after,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedAuditEvents {
    pub events: Vec<AuditEventDto>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

// ==========================================
// AuditApi
// ==========================================

/// Audit viewer facade, most-recent-first
pub struct AuditApi {
    audit_repo: Arc<AuditLogRepository>,
}

impl AuditApi {
    pub fn new(audit_repo: Arc<AuditLogRepository>) -> Self {
        Self { audit_repo }
    }

    /// One page of a company's audit events.
    ///
    /// `search` is a case-insensitive substring over rule code,
    /// block code/name, and division name. `event_type` narrows to
    /// one kind. Pages are 1-based.
    pub fn list_events(
        &self,
        company_id: &str,
        search: Option<&str>,
        event_type: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> ApiResult<PaginatedAuditEvents> {
        if page < 1 {
            return Err(ApiError::InvalidInput("page must be >= 1".to_string()));
        }
        if page_size < 1 || page_size > MAX_PAGE_SIZE {
            return Err(ApiError::InvalidInput(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let event_type = event_type
            .map(|s| {
                AuditEventType::from_str(s.trim()).ok_or_else(|| {
                    ApiError::InvalidInput(format!("unknown event_type '{}'", s))
                })
            })
            .transpose()?;

        let filter = AuditEventFilter {
            search: search.map(|s| s.to_string()),
            event_type,
        };

        let total = self.audit_repo.count(company_id, &filter)?;
        let offset = (page - 1) * page_size;
        let events = self
            .audit_repo
            .list_paged(company_id, &filter, page_size, offset)?;

        Ok(PaginatedAuditEvents {
            events: events.into_iter().map(Into::into).collect(),
            total,
            page,
            page_size,
        })
    }

    /// Full trail of one rule (compliance export)
    pub fn list_events_for_rule(&self, rule_id: &str) -> ApiResult<Vec<AuditEventDto>> {
        let events = self.audit_repo.list_by_rule(rule_id)?;
        Ok(events.into_iter().map(Into::into).collect())
    }
}
