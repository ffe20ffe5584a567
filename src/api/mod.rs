// ==========================================
// Plantation Tariff Core - API Layer
// ==========================================
// Responsibility: the operation boundary. Request validation,
// company-scope checks, audit event construction; no SQL here.
// ==========================================

pub mod audit_api;
pub mod block_assignment_api;
pub mod error;
pub mod resolution_api;
pub mod tariff_override_api;
pub mod tariff_rule_api;

// Re-export API types
pub use audit_api::{AuditApi, AuditEventDto, PaginatedAuditEvents};
pub use block_assignment_api::{AssignBlockRuleRequest, BlockAssignmentApi, BlockDto};
pub use error::{ApiError, ApiResult};
pub use resolution_api::{EffectiveRateDto, ResolutionApi};
pub use tariff_override_api::{
    BulkOverrideApplyResponse, BulkOverrideRequest, CreateOverrideRequest, TariffOverrideApi,
    TariffOverrideDto, UpdateOverrideRequest,
};
pub use tariff_rule_api::{
    CreateTariffRuleRequest, LandTypeDto, TariffRuleApi, TariffRuleDto, UpdateTariffRuleRequest,
};
