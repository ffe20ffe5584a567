use crate::domain::audit_event::AuditEvent;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// AuditLogRepository - immutable change history
// ==========================================
// Red line: Repository does no business logic, only data mapping
pub struct AuditLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AuditLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // write path
    // ==========================================

    /// Append one event inside an already-open transaction.
    ///
    /// Every audited mutation calls this with its own transaction so
    /// the domain write and the trail commit or roll back together.
    pub fn append_in_tx(conn: &Connection, event: &AuditEvent) -> RepositoryResult<()> {
        let before_json = serde_json::to_string(&event.before)
            .map_err(|e| RepositoryError::InternalError(format!("before snapshot: {e}")))?;
        let after_json = serde_json::to_string(&event.after)
            .map_err(|e| RepositoryError::InternalError(format!("after snapshot: {e}")))?;

        conn.execute(
            r#"
            INSERT INTO tariff_audit_log (
                event_id, event_type, changed_at, company_id, actor_id, actor_name,
                block_id, block_code, block_name, division_name,
                rule_id, rule_code, override_id,
                before_json, after_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                event.event_id,
                event.event_type.as_str(),
                event.changed_at.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
                event.company_id,
                event.actor_id,
                event.actor_name,
                event.block_id,
                event.block_code,
                event.block_name,
                event.division_name,
                event.rule_id,
                event.rule_code,
                event.override_id,
                before_json,
                after_json,
            ],
        )?;
        Ok(())
    }

    /// Append one event in its own transaction. Crate-internal:
    /// callers outside the repository layer go through an audited
    /// mutation, never through a direct append.
    pub(crate) fn insert(&self, event: &AuditEvent) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        Self::append_in_tx(&conn, event)?;
        Ok(event.event_id.clone())
    }
}
