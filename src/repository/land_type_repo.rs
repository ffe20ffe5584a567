// ==========================================
// Plantation Tariff Core - Land Type Repository
// ==========================================
// Responsibility: read access to the land_types catalog, plus the
// insert/deactivate paths the master-data administrators use.
// Red line: no business logic, only data mapping
// ==========================================

use crate::domain::land_type::LandType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct LandTypeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LandTypeRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, land_type: &LandType) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO land_types (land_type_id, company_id, code, name, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                land_type.land_type_id,
                land_type.company_id,
                land_type.code,
                land_type.name,
                land_type.is_active as i32,
                land_type.created_at,
                land_type.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, land_type_id: &str) -> RepositoryResult<Option<LandType>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT land_type_id, company_id, code, name, is_active, created_at, updated_at
            FROM land_types
            WHERE land_type_id = ?1
            "#,
        )?;

        match stmt.query_row(params![land_type_id], map_row) {
            Ok(lt) => Ok(Some(lt)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List a company's land types, ordered by code
    pub fn list_by_company(&self, company_id: &str, active_only: bool) -> RepositoryResult<Vec<LandType>> {
        let conn = self.get_conn()?;
        let sql = if active_only {
            r#"
            SELECT land_type_id, company_id, code, name, is_active, created_at, updated_at
            FROM land_types
            WHERE company_id = ?1 AND is_active = 1
            ORDER BY code ASC
            "#
        } else {
            r#"
            SELECT land_type_id, company_id, code, name, is_active, created_at, updated_at
            FROM land_types
            WHERE company_id = ?1
            ORDER BY code ASC
            "#
        };

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![company_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// Deactivate without deleting; referenced rules keep functioning
    pub fn deactivate(&self, land_type_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE land_types SET is_active = 0, updated_at = datetime('now') WHERE land_type_id = ?1",
            params![land_type_id],
        )?;
        Ok(affected)
    }
}

fn map_row(row: &Row) -> SqliteResult<LandType> {
    Ok(LandType {
        land_type_id: row.get(0)?,
        company_id: row.get(1)?,
        code: row.get(2)?,
        name: row.get(3)?,
        is_active: row.get::<_, i32>(4)? != 0,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
