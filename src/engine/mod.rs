// ==========================================
// Plantation Tariff Core - Engine Layer
// ==========================================
// Responsibility: pure computation, no persistence
// ==========================================

pub mod resolution;

pub use resolution::{EffectiveRateSet, ResolutionEngine};
