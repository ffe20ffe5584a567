// ==========================================
// Plantation Tariff Core - Block Assignment Entity
// ==========================================
// A harvested block and its single active (land type, tariff rule)
// pair. Identity and hierarchy position come from the external
// company/estate/division CRUD; this core owns only the assignment.
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub block_id: String,      // UUID, supplied by the hierarchy
    pub company_id: String,    // denormalized company scope
    pub division_id: String,   // hierarchy position
    pub division_name: String, // for audit labeling
    pub block_code: String,
    pub block_name: String,
    pub land_type_id: Option<String>,    // assignment pair, set together
    pub tariff_rule_id: Option<String>,  // with land_type_id atomically
    pub updated_at: String,
}

impl Block {
    /// True when the block currently has a rule assignment
    pub fn has_assignment(&self) -> bool {
        self.land_type_id.is_some() && self.tariff_rule_id.is_some()
    }
}
