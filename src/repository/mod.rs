// ==========================================
// Plantation Tariff Core - Repository Layer
// ==========================================
// Responsibility: data access, shielding database details
// Red line: Repository holds no business logic; every mutation to
// rules, overrides, and assignments commits together with its
// audit event. All queries are parameterized.
// ==========================================

pub mod audit_log_repo;
pub mod block_repo;
pub mod error;
pub mod land_type_repo;
pub mod tariff_override_repo;
pub mod tariff_rule_repo;

// Re-export core repositories
pub use audit_log_repo::{AuditEventFilter, AuditLogRepository};
pub use block_repo::BlockRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use land_type_repo::LandTypeRepository;
pub use tariff_override_repo::TariffOverrideRepository;
pub use tariff_rule_repo::TariffRuleRepository;
