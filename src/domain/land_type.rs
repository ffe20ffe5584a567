// ==========================================
// Plantation Tariff Core - Land Type Entity
// ==========================================
// Leaf catalog of named soil/land categories, referenced by
// tariff rules and block assignments. Maintained by the external
// master-data CRUD; this core only reads and validates against it.
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandType {
    pub land_type_id: String, // UUID
    pub company_id: String,   // owning company scope
    pub code: String,         // unique per company, mirrored as scheme_code
    pub name: String,         // display name
    pub is_active: bool,      // deactivation hides from new-rule pickers only
    pub created_at: String,
    pub updated_at: String,
}

impl LandType {
    /// New active land type with generated id and timestamps
    pub fn new(company_id: String, code: String, name: String) -> Self {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        Self {
            land_type_id: uuid::Uuid::new_v4().to_string(),
            company_id,
            code,
            name,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
