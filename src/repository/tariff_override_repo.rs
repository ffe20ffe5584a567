// ==========================================
// Plantation Tariff Core - Tariff Override Repository
// ==========================================
// Responsibility: data access for time-bounded rate overrides.
// Red line: no business logic, only data mapping. Audited
// mutations commit the override row and the audit event together.
// ==========================================

use crate::domain::audit_event::AuditEvent;
use crate::domain::tariff_override::TariffOverride;
use crate::domain::types::{OverrideType, RateSet};
use crate::repository::audit_log_repo::AuditLogRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct TariffOverrideRepository {
    conn: Arc<Mutex<Connection>>,
}

const OVERRIDE_COLUMNS: &str = r#"
    override_id, rule_id, override_type, effective_from, effective_to,
    basis, tarif_upah, premi, tarif_premi1, tarif_premi2,
    tarif_libur, tarif_lebaran, notes, is_active, created_at, updated_at
"#;

impl TariffOverrideRepository {
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

    pub fn insert_with_audit(&self, o: &TariffOverride, event: &AuditEvent) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO tariff_overrides (
                override_id, rule_id, override_type, effective_from, effective_to,
                basis, tarif_upah, premi, tarif_premi1, tarif_premi2,
                tarif_libur, tarif_lebaran, notes, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                o.override_id,
                o.rule_id,
                o.override_type.as_str(),
                o.effective_from.map(|d| d.format("%Y-%m-%d").to_string()),
                o.effective_to.map(|d| d.format("%Y-%m-%d").to_string()),
                o.rates.basis,
                o.rates.tarif_upah,
                o.rates.premi,
                o.rates.tarif_premi1,
                o.rates.tarif_premi2,
                o.rates.tarif_libur,
                o.rates.tarif_lebaran,
                o.notes,
                o.is_active as i32,
                o.created_at,
                o.updated_at,
            ],
        )?;
        AuditLogRepository::append_in_tx(&tx, event)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    pub fn update_with_audit(&self, o: &TariffOverride, event: &AuditEvent) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let affected = tx.execute(
            r#"
            UPDATE tariff_overrides SET
                override_type = ?2, effective_from = ?3, effective_to = ?4,
                basis = ?5, tarif_upah = ?6, premi = ?7,
                tarif_premi1 = ?8, tarif_premi2 = ?9,
                tarif_libur = ?10, tarif_lebaran = ?11,
                notes = ?12, is_active = ?13,
                updated_at = datetime('now')
            WHERE override_id = ?1
            "#,
            params![
                o.override_id,
                o.override_type.as_str(),
                o.effective_from.map(|d| d.format("%Y-%m-%d").to_string()),
                o.effective_to.map(|d| d.format("%Y-%m-%d").to_string()),
                o.rates.basis,
                o.rates.tarif_upah,
                o.rates.premi,
                o.rates.tarif_premi1,
                o.rates.tarif_premi2,
                o.rates.tarif_libur,
                o.rates.tarif_lebaran,
                o.notes,
                o.is_active as i32,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "TariffOverride".to_string(),
                id: o.override_id.clone(),
            });
        }
        AuditLogRepository::append_in_tx(&tx, event)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    pub fn delete_with_audit(&self, override_id: &str, event: &AuditEvent) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let affected = tx.execute(
            "DELETE FROM tariff_overrides WHERE override_id = ?1",
            params![override_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "TariffOverride".to_string(),
                id: override_id.to_string(),
            });
        }
        AuditLogRepository::append_in_tx(&tx, event)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    // ==========================================
    // queries
    // ==========================================

    pub fn find_by_id(&self, override_id: &str) -> RepositoryResult<Option<TariffOverride>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {OVERRIDE_COLUMNS} FROM tariff_overrides WHERE override_id = ?1"
        ))?;

        match stmt.query_row(params![override_id], map_row) {
            Ok(o) => Ok(Some(o)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All overrides attached to one rule (management listing)
    pub fn list_by_rule(&self, rule_id: &str) -> RepositoryResult<Vec<TariffOverride>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {OVERRIDE_COLUMNS} FROM tariff_overrides
            WHERE rule_id = ?1
            ORDER BY override_type ASC, effective_from ASC, override_id ASC
            "#
        ))?;

        let rows = stmt
            .query_map(params![rule_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// Active overrides of one rule (resolution input); the engine
    /// filters by date and applies precedence
    pub fn list_active_by_rule(&self, rule_id: &str) -> RepositoryResult<Vec<TariffOverride>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {OVERRIDE_COLUMNS} FROM tariff_overrides
            WHERE rule_id = ?1 AND is_active = 1
            ORDER BY override_type ASC, effective_from ASC, override_id ASC
            "#
        ))?;

        let rows = stmt
            .query_map(params![rule_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}

fn map_row(row: &Row) -> SqliteResult<TariffOverride> {
    let type_str: String = row.get(2)?;
    let override_type = OverrideType::from_str(&type_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown override_type: {type_str}").into(),
        )
    })?;

    let effective_from = parse_date_column(row, 3)?;
    let effective_to = parse_date_column(row, 4)?;

    Ok(TariffOverride {
        override_id: row.get(0)?,
        rule_id: row.get(1)?,
        override_type,
        effective_from,
        effective_to,
        rates: RateSet {
            basis: row.get(5)?,
            tarif_upah: row.get(6)?,
            premi: row.get(7)?,
            tarif_premi1: row.get(8)?,
            tarif_premi2: row.get(9)?,
            tarif_libur: row.get(10)?,
            tarif_lebaran: row.get(11)?,
        },
        notes: row.get(12)?,
        is_active: row.get::<_, i32>(13)? != 0,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

/// A corrupt stored date must surface as an error, not widen the
/// override into an open-ended period
fn parse_date_column(row: &Row, idx: usize) -> SqliteResult<Option<chrono::NaiveDate>> {
    let value: Option<String> = row.get(idx)?;
    value
        .map(|s| {
            chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
        })
        .transpose()
}
