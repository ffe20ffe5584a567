// ==========================================
// Plantation Tariff Core - Block Repository
// ==========================================
// Responsibility: block rows and their single (land type, rule)
// assignment pair. Identity fields are fed by the external
// hierarchy CRUD; this core mutates only the assignment, and only
// together with its audit event.
// ==========================================

use crate::domain::audit_event::AuditEvent;
use crate::domain::block::Block;
use crate::repository::audit_log_repo::AuditLogRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct BlockRepository {
    conn: Arc<Mutex<Connection>>,
}

const BLOCK_COLUMNS: &str = r#"
    block_id, company_id, division_id, division_name, block_code,
    block_name, land_type_id, tariff_rule_id, updated_at
"#;

impl BlockRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Register a block row (hierarchy sync / test seeding)
    pub fn insert(&self, block: &Block) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO blocks (
                block_id, company_id, division_id, division_name,
                block_code, block_name, land_type_id, tariff_rule_id, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                block.block_id,
                block.company_id,
                block.division_id,
                block.division_name,
                block.block_code,
                block.block_name,
                block.land_type_id,
                block.tariff_rule_id,
                block.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Replace the (land type, rule) pair as one UPDATE and append
    /// the assignment-changed event in the same transaction
    pub fn update_assignment_with_audit(
        &self,
        block_id: &str,
        land_type_id: &str,
        tariff_rule_id: &str,
        event: &AuditEvent,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let affected = tx.execute(
            r#"
            UPDATE blocks
            SET land_type_id = ?2, tariff_rule_id = ?3, updated_at = datetime('now')
            WHERE block_id = ?1
            "#,
            params![block_id, land_type_id, tariff_rule_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Block".to_string(),
                id: block_id.to_string(),
            });
        }
        AuditLogRepository::append_in_tx(&tx, event)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    pub fn find_by_id(&self, block_id: &str) -> RepositoryResult<Option<Block>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {BLOCK_COLUMNS} FROM blocks WHERE block_id = ?1"
        ))?;

        match stmt.query_row(params![block_id], map_row) {
            Ok(block) => Ok(Some(block)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_by_company(&self, company_id: &str) -> RepositoryResult<Vec<Block>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {BLOCK_COLUMNS} FROM blocks
            WHERE company_id = ?1
            ORDER BY block_code ASC
            "#
        ))?;

        let rows = stmt
            .query_map(params![company_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}

fn map_row(row: &Row) -> SqliteResult<Block> {
    Ok(Block {
        block_id: row.get(0)?,
        company_id: row.get(1)?,
        division_id: row.get(2)?,
        division_name: row.get(3)?,
        block_code: row.get(4)?,
        block_name: row.get(5)?,
        land_type_id: row.get(6)?,
        tariff_rule_id: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
