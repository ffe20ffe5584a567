// ==========================================
// Plantation Tariff Core - Domain Layer
// ==========================================
// Responsibility: entities, value types, derivations
// Red line: no data access logic, no engine logic
// ==========================================

pub mod audit_event;
pub mod block;
pub mod land_type;
pub mod tariff_override;
pub mod tariff_rule;
pub mod types;

// Re-export core types
pub use audit_event::{AuditEvent, AuditPayload};
pub use block::Block;
pub use land_type::LandType;
pub use tariff_override::TariffOverride;
pub use tariff_rule::{bjr_ranges_overlap, TariffRule};
pub use types::{perlakuan_label, AuditEventType, OverrideType, RateSet};
