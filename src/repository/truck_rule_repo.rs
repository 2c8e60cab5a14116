// ==========================================
// 积载计划系统 - 卡车-容器搭载规则仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: save 按 id UPSERT，id<=0 时新增
// ==========================================

use crate::domain::transport_rule::TruckContainerRule;
use crate::repository::container_repo::{assigned_id, u32_from_db};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT id, truck_id, container_id, max_quantity, priority
    FROM truck_container_rule
"#;

struct RuleRow {
    id: i64,
    truck_id: i64,
    container_id: i64,
    max_quantity: Option<i64>,
    priority: i64,
}

impl RuleRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            truck_id: row.get(1)?,
            container_id: row.get(2)?,
            max_quantity: row.get(3)?,
            priority: row.get(4)?,
        })
    }

    fn into_rule(self) -> RepositoryResult<TruckContainerRule> {
        let priority = i32::try_from(self.priority).map_err(|_| RepositoryError::FieldValueError {
            field: "priority".to_string(),
            message: format!("数值超出范围: {}", self.priority),
        })?;

        Ok(TruckContainerRule {
            id: self.id,
            truck_id: self.truck_id,
            container_id: self.container_id,
            max_quantity: self
                .max_quantity
                .map(|q| u32_from_db("max_quantity", q))
                .transpose()?,
            priority,
        })
    }
}

// ==========================================
// TruckContainerRuleRepository
// ==========================================

/// 搭载规则仓储
/// 职责: 管理 truck_container_rule 表的 CRUD 操作
pub struct TruckContainerRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TruckContainerRuleRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部规则（truck_id, priority 升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<TruckContainerRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY truck_id, priority, id", SELECT_COLUMNS))?;

        let rows = stmt
            .query_map([], RuleRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RuleRow::into_rule).collect()
    }

    /// 查询指定卡车的规则（priority 升序）
    pub fn list_for_truck(&self, truck_id: i64) -> RepositoryResult<Vec<TruckContainerRule>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare(&format!("{} WHERE truck_id = ?1 ORDER BY priority, id", SELECT_COLUMNS))?;

        let rows = stmt
            .query_map(params![truck_id], RuleRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RuleRow::into_rule).collect()
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<TruckContainerRule>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                RuleRow::from_row,
            )
            .optional()?;

        row.map(RuleRow::into_rule).transpose()
    }

    /// 保存规则（UPSERT）
    ///
    /// # 返回
    /// - Ok(i64): 规则 id
    /// - Err(ForeignKeyViolation): 卡车或容器未登记
    pub fn save(&self, rule: &TruckContainerRule) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO truck_container_rule (id, truck_id, container_id, max_quantity, priority)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                truck_id = excluded.truck_id,
                container_id = excluded.container_id,
                max_quantity = excluded.max_quantity,
                priority = excluded.priority
            "#,
            params![
                assigned_id(rule.id),
                rule.truck_id,
                rule.container_id,
                rule.max_quantity,
                rule.priority,
            ],
        )?;

        Ok(assigned_id(rule.id).unwrap_or_else(|| conn.last_insert_rowid()))
    }

    /// 更新已有规则（按 id）
    pub fn update(&self, rule: &TruckContainerRule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE truck_container_rule
            SET truck_id = ?2, container_id = ?3, max_quantity = ?4, priority = ?5
            WHERE id = ?1
            "#,
            params![
                rule.id,
                rule.truck_id,
                rule.container_id,
                rule.max_quantity,
                rule.priority,
            ],
        )?;

        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "TruckContainerRule".to_string(),
                id: rule.id.to_string(),
            });
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute("DELETE FROM truck_container_rule WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "TruckContainerRule".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
