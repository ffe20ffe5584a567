use super::core::AuditLogRepository;
use crate::domain::audit_event::{AuditEvent, AuditPayload};
use crate::domain::types::AuditEventType;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::{params, Result as SqliteResult, Row};

/// Filter for the audit viewer facade.
///
/// `search` matches rule code, block code/name, or division name as a
/// case-insensitive substring; `event_type` narrows to one kind.
#[derive(Debug, Clone, Default)]
pub struct AuditEventFilter {
    pub search: Option<String>,
    pub event_type: Option<AuditEventType>,
}

const EVENT_COLUMNS: &str = r#"
    event_id, event_type, changed_at, company_id, actor_id, actor_name,
    block_id, block_code, block_name, division_name,
    rule_id, rule_code, override_id, before_json, after_json
"#;

const FILTER_CLAUSE: &str = r#"
    company_id = ?1
    AND (?2 IS NULL OR event_type = ?2)
    AND (?3 IS NULL
         OR LOWER(COALESCE(rule_code, '')) LIKE ?3
         OR LOWER(COALESCE(block_code, '')) LIKE ?3
         OR LOWER(COALESCE(block_name, '')) LIKE ?3
         OR LOWER(COALESCE(division_name, '')) LIKE ?3)
"#;

impl AuditLogRepository {
    // ==========================================
    // query operations
    // ==========================================

    pub fn find_by_id(&self, event_id: &str) -> RepositoryResult<Option<AuditEvent>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM tariff_audit_log WHERE event_id = ?1"
        ))?;

        match stmt.query_row(params![event_id], map_row) {
            Ok(event) => Ok(Some(event)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// One page of a company's events, most-recent-first.
    /// event_id is the secondary sort key so paging is stable when
    /// several events share a timestamp.
    pub fn list_paged(
        &self,
        company_id: &str,
        filter: &AuditEventFilter,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<AuditEvent>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM tariff_audit_log
            WHERE {FILTER_CLAUSE}
            ORDER BY changed_at DESC, event_id DESC
            LIMIT ?4 OFFSET ?5
            "#
        ))?;

        let rows = stmt
            .query_map(
                params![
                    company_id,
                    filter.event_type.map(|t| t.as_str()),
                    search_pattern(filter),
                    limit,
                    offset,
                ],
                map_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// Total row count for the same filter (pagination metadata)
    pub fn count(&self, company_id: &str, filter: &AuditEventFilter) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            &format!("SELECT COUNT(*) FROM tariff_audit_log WHERE {FILTER_CLAUSE}"),
            params![
                company_id,
                filter.event_type.map(|t| t.as_str()),
                search_pattern(filter),
            ],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// All of one rule's events, most-recent-first (compliance export)
    pub fn list_by_rule(&self, rule_id: &str) -> RepositoryResult<Vec<AuditEvent>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM tariff_audit_log
            WHERE rule_id = ?1
            ORDER BY changed_at DESC, event_id DESC
            "#
        ))?;

        let rows = stmt
            .query_map(params![rule_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}

fn search_pattern(filter: &AuditEventFilter) -> Option<String> {
    filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.to_lowercase()))
}

fn map_row(row: &Row) -> SqliteResult<AuditEvent> {
    let event_type_str: String = row.get(1)?;
    let event_type = AuditEventType::from_str(&event_type_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            format!("unknown event_type: {event_type_str}").into(),
        )
    })?;

    let changed_at_str: String = row.get(2)?;
    let changed_at = NaiveDateTime::parse_from_str(&changed_at_str, "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

    let before_json: String = row.get(13)?;
    let after_json: String = row.get(14)?;
    let before: AuditPayload = serde_json::from_str(&before_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(13, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let after: AuditPayload = serde_json::from_str(&after_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(14, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(AuditEvent {
        event_id: row.get(0)?,
        event_type,
        changed_at,
        company_id: row.get(3)?,
        actor_id: row.get(4)?,
        actor_name: row.get(5)?,
        block_id: row.get(6)?,
        block_code: row.get(7)?,
        block_name: row.get(8)?,
        division_name: row.get(9)?,
        rule_id: row.get(10)?,
        rule_code: row.get(11)?,
        override_id: row.get(12)?,
        before,
        after,
    })
}
