// ==========================================
// API integration test helpers
// ==========================================
// Shared environment builder: every API wired over one in-memory
// SQLite connection, plus seeding shortcuts for master data.
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use plantation_tariff::api::{
    AuditApi, BlockAssignmentApi, CreateTariffRuleRequest, ResolutionApi, TariffOverrideApi,
    TariffRuleApi,
};
use plantation_tariff::domain::{Block, LandType};
use plantation_tariff::repository::{
    AuditLogRepository, BlockRepository, LandTypeRepository, TariffOverrideRepository,
    TariffRuleRepository,
};
use plantation_tariff::RateSet;

pub const COMPANY: &str = "company-1";
pub const ACTOR_ID: &str = "user-1";
pub const ACTOR_NAME: &str = "Admin Kebun";

/// Test environment: all APIs and repositories over one connection
pub struct ApiTestEnv {
    pub conn: Arc<Mutex<Connection>>,

    pub rule_api: TariffRuleApi,
    pub override_api: TariffOverrideApi,
    pub block_api: BlockAssignmentApi,
    pub resolution_api: ResolutionApi,
    pub audit_api: AuditApi,

    // repositories for test data preparation
    pub land_type_repo: Arc<LandTypeRepository>,
    pub rule_repo: Arc<TariffRuleRepository>,
    pub override_repo: Arc<TariffOverrideRepository>,
    pub block_repo: Arc<BlockRepository>,
    pub audit_repo: Arc<AuditLogRepository>,
}

impl ApiTestEnv {
    pub fn new() -> ApiTestEnv {
        let conn = Arc::new(Mutex::new(
            plantation_tariff::db::open_in_memory().expect("cannot open in-memory database"),
        ));

        let land_type_repo = Arc::new(LandTypeRepository::new(conn.clone()));
        let rule_repo = Arc::new(TariffRuleRepository::new(conn.clone()));
        let override_repo = Arc::new(TariffOverrideRepository::new(conn.clone()));
        let block_repo = Arc::new(BlockRepository::new(conn.clone()));
        let audit_repo = Arc::new(AuditLogRepository::new(conn.clone()));

        ApiTestEnv {
            rule_api: TariffRuleApi::new(rule_repo.clone(), land_type_repo.clone()),
            override_api: TariffOverrideApi::new(override_repo.clone(), rule_repo.clone()),
            block_api: BlockAssignmentApi::new(block_repo.clone(), rule_repo.clone()),
            resolution_api: ResolutionApi::new(
                block_repo.clone(),
                rule_repo.clone(),
                override_repo.clone(),
            ),
            audit_api: AuditApi::new(audit_repo.clone()),
            conn,
            land_type_repo,
            rule_repo,
            override_repo,
            block_repo,
            audit_repo,
        }
    }

    /// Seed a land type for the given company and return its id
    pub fn seed_land_type(&self, company_id: &str, code: &str) -> String {
        let lt = LandType::new(company_id.to_string(), code.to_string(), code.to_string());
        self.land_type_repo.insert(&lt).expect("cannot seed land type");
        lt.land_type_id
    }

    /// Seed an unassigned block row
    pub fn seed_block(&self, company_id: &str, block_id: &str, block_code: &str) {
        let block = Block {
            block_id: block_id.to_string(),
            company_id: company_id.to_string(),
            division_id: "div-1".to_string(),
            division_name: "Divisi Sungai".to_string(),
            block_code: block_code.to_string(),
            block_name: format!("Blok {}", block_code),
            land_type_id: None,
            tariff_rule_id: None,
            updated_at: "2024-01-01 00:00:00".to_string(),
        };
        self.block_repo.insert(&block).expect("cannot seed block");
    }

    /// Create a rule through the API and return its id
    pub fn create_rule(
        &self,
        land_type_id: &str,
        tarif_code: &str,
        bjr_min: Option<f64>,
        bjr_max: Option<f64>,
        tarif_upah: f64,
    ) -> String {
        let dto = self
            .rule_api
            .create_rule(CreateTariffRuleRequest {
                company_id: COMPANY.to_string(),
                land_type_id: land_type_id.to_string(),
                tarif_code: tarif_code.to_string(),
                bjr_min_kg: bjr_min,
                bjr_max_kg: bjr_max,
                rates: RateSet {
                    basis: Some(1400.0),
                    tarif_upah: Some(tarif_upah),
                    premi: Some(50.0),
                    ..Default::default()
                },
                sort_order: 1,
                keterangan: None,
                actor_id: ACTOR_ID.to_string(),
                actor_name: ACTOR_NAME.to_string(),
            })
            .expect("cannot create rule");
        dto.rule_id
    }

    /// Count rows in the audit trail
    pub fn audit_count(&self) -> i64 {
        let c = self.conn.lock().unwrap();
        c.query_row("SELECT COUNT(*) FROM tariff_audit_log", [], |row| row.get(0))
            .unwrap()
    }
}
