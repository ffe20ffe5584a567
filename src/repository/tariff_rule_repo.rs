// ==========================================
// Plantation Tariff Core - Tariff Rule Repository
// ==========================================
// Responsibility: data access for the tariff_rules catalog.
// Red line: no business logic, only data mapping. Mutations that
// must be audited run in one transaction with the audit append
// (see *_with_audit), so a rule change is never observable
// without its trail.
// ==========================================

use crate::domain::audit_event::AuditEvent;
use crate::domain::tariff_rule::TariffRule;
use crate::domain::types::RateSet;
use crate::repository::audit_log_repo::AuditLogRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct TariffRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

const RULE_COLUMNS: &str = r#"
    rule_id, company_id, land_type_id, scheme_code, tarif_code,
    bjr_min_kg, bjr_max_kg, basis, tarif_upah, premi,
    tarif_premi1, tarif_premi2, tarif_libur, tarif_lebaran,
    sort_order, keterangan, is_active, created_at, updated_at
"#;

impl TariffRuleRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // audited mutations (single transaction)
    // ==========================================

    /// Insert a rule and its audit event atomically
    pub fn insert_with_audit(&self, rule: &TariffRule, event: &AuditEvent) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        Self::insert_in_tx(&tx, rule)?;
        AuditLogRepository::append_in_tx(&tx, event)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// Update a rule and append its audit event atomically
    pub fn update_with_audit(&self, rule: &TariffRule, event: &AuditEvent) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let affected = Self::update_in_tx(&tx, rule)?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "TariffRule".to_string(),
                id: rule.rule_id.clone(),
            });
        }
        AuditLogRepository::append_in_tx(&tx, event)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// Hard-delete a rule and append its audit event atomically.
    /// Referential guards are the caller's responsibility.
    pub fn delete_with_audit(&self, rule_id: &str, event: &AuditEvent) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let affected = tx.execute("DELETE FROM tariff_rules WHERE rule_id = ?1", params![rule_id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "TariffRule".to_string(),
                id: rule_id.to_string(),
            });
        }
        AuditLogRepository::append_in_tx(&tx, event)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    pub(crate) fn insert_in_tx(conn: &Connection, rule: &TariffRule) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO tariff_rules (
                rule_id, company_id, land_type_id, scheme_code, tarif_code,
                bjr_min_kg, bjr_max_kg, basis, tarif_upah, premi,
                tarif_premi1, tarif_premi2, tarif_libur, tarif_lebaran,
                sort_order, keterangan, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            "#,
            params![
                rule.rule_id,
                rule.company_id,
                rule.land_type_id,
                rule.scheme_code,
                rule.tarif_code,
                rule.bjr_min_kg,
                rule.bjr_max_kg,
                rule.rates.basis,
                rule.rates.tarif_upah,
                rule.rates.premi,
                rule.rates.tarif_premi1,
                rule.rates.tarif_premi2,
                rule.rates.tarif_libur,
                rule.rates.tarif_lebaran,
                rule.sort_order,
                rule.keterangan,
                rule.is_active as i32,
                rule.created_at,
                rule.updated_at,
            ],
        )?;
        Ok(())
    }

    pub(crate) fn update_in_tx(conn: &Connection, rule: &TariffRule) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"
            UPDATE tariff_rules SET
                scheme_code = ?2, tarif_code = ?3,
                bjr_min_kg = ?4, bjr_max_kg = ?5,
                basis = ?6, tarif_upah = ?7, premi = ?8,
                tarif_premi1 = ?9, tarif_premi2 = ?10,
                tarif_libur = ?11, tarif_lebaran = ?12,
                sort_order = ?13, keterangan = ?14, is_active = ?15,
                updated_at = datetime('now')
            WHERE rule_id = ?1
            "#,
            params![
                rule.rule_id,
                rule.scheme_code,
                rule.tarif_code,
                rule.bjr_min_kg,
                rule.bjr_max_kg,
                rule.rates.basis,
                rule.rates.tarif_upah,
                rule.rates.premi,
                rule.rates.tarif_premi1,
                rule.rates.tarif_premi2,
                rule.rates.tarif_libur,
                rule.rates.tarif_lebaran,
                rule.sort_order,
                rule.keterangan,
                rule.is_active as i32,
            ],
        )?;
        Ok(affected)
    }

    // ==========================================
    // queries
    // ==========================================

    pub fn find_by_id(&self, rule_id: &str) -> RepositoryResult<Option<TariffRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RULE_COLUMNS} FROM tariff_rules WHERE rule_id = ?1"
        ))?;

        match stmt.query_row(params![rule_id], map_row) {
            Ok(rule) => Ok(Some(rule)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List a company's rules with optional scheme / land-type filters,
    /// default ordering by scheme then sort_order then tariff code
    pub fn list_by_company(
        &self,
        company_id: &str,
        scheme_filter: Option<&str>,
        land_type_filter: Option<&str>,
    ) -> RepositoryResult<Vec<TariffRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {RULE_COLUMNS} FROM tariff_rules
            WHERE company_id = ?1
              AND (?2 IS NULL OR LOWER(TRIM(scheme_code)) = LOWER(TRIM(?2)))
              AND (?3 IS NULL OR land_type_id = ?3)
            ORDER BY scheme_code ASC, sort_order ASC, tarif_code ASC
            "#
        ))?;

        let rows = stmt
            .query_map(params![company_id, scheme_filter, land_type_filter], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// Active rules of one land type (tier lookup input), ordered by
    /// sort_order then tariff code
    pub fn list_active_by_land_type(&self, land_type_id: &str) -> RepositoryResult<Vec<TariffRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {RULE_COLUMNS} FROM tariff_rules
            WHERE land_type_id = ?1 AND is_active = 1
            ORDER BY sort_order ASC, tarif_code ASC
            "#
        ))?;

        let rows = stmt
            .query_map(params![land_type_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// Active rules of a whole company (bulk override apply input)
    pub fn list_active_by_company(&self, company_id: &str) -> RepositoryResult<Vec<TariffRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {RULE_COLUMNS} FROM tariff_rules
            WHERE company_id = ?1 AND is_active = 1
            ORDER BY scheme_code ASC, sort_order ASC, tarif_code ASC
            "#
        ))?;

        let rows = stmt
            .query_map(params![company_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    // ===== referential guards for delete =====

    pub fn count_block_references(&self, rule_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM blocks WHERE tariff_rule_id = ?1",
            params![rule_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn count_override_references(&self, rule_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM tariff_overrides WHERE rule_id = ?1",
            params![rule_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn map_row(row: &Row) -> SqliteResult<TariffRule> {
    Ok(TariffRule {
        rule_id: row.get(0)?,
        company_id: row.get(1)?,
        land_type_id: row.get(2)?,
        scheme_code: row.get(3)?,
        tarif_code: row.get(4)?,
        bjr_min_kg: row.get(5)?,
        bjr_max_kg: row.get(6)?,
        rates: RateSet {
            basis: row.get(7)?,
            tarif_upah: row.get(8)?,
            premi: row.get(9)?,
            tarif_premi1: row.get(10)?,
            tarif_premi2: row.get(11)?,
            tarif_libur: row.get(12)?,
            tarif_lebaran: row.get(13)?,
        },
        sort_order: row.get(14)?,
        keterangan: row.get(15)?,
        is_active: row.get::<_, i32>(16)? != 0,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}
