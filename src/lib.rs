// ==========================================
// Plantation Tariff Core - Library Root
// ==========================================
// Tariff resolution and audit subsystem for plantation harvest
// operations: BJR-tier piece-rate rules, time-bounded overrides,
// block assignments, and an append-only audit trail over SQLite.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and value types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Engine layer - pure resolution logic
pub mod engine;

// Database infrastructure (connection init / PRAGMA / schema)
pub mod db;

// Logging setup
pub mod logging;

// API layer - operation boundary
pub mod api;

// ==========================================
// Core type re-exports
// ==========================================

// Domain types
pub use domain::types::{AuditEventType, OverrideType, RateSet};

// Domain entities
pub use domain::{AuditEvent, AuditPayload, Block, LandType, TariffOverride, TariffRule};

// Engine
pub use engine::{EffectiveRateSet, ResolutionEngine};

// API
pub use api::{
    ApiError, ApiResult, AuditApi, BlockAssignmentApi, ResolutionApi, TariffOverrideApi,
    TariffRuleApi,
};

// Repositories
pub use repository::{
    AuditLogRepository, BlockRepository, LandTypeRepository, TariffOverrideRepository,
    TariffRuleRepository,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "Plantation Tariff Core";
