// ==========================================
// Plantation Tariff Core - Audit Log Repository
// ==========================================
// Red line: append-only. No update or delete statement exists for
// tariff_audit_log; the only write path is append_in_tx, invoked
// from inside the same transaction as the audited mutation.
// ==========================================

mod core;
mod queries;

pub use self::core::AuditLogRepository;
pub use self::queries::AuditEventFilter;
