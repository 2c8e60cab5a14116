// ==========================================
// 积载计划系统 - 运送制约仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: transport_constraint 为单例，save 在事务内整表替换
// ==========================================

use crate::domain::transport_rule::TransportConstraint;
use crate::repository::container_repo::u32_from_db;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// 当前生效行
const CURRENT_ROW_ID: &str = r#"
    SELECT id FROM transport_constraint
    ORDER BY updated_at DESC, id DESC
    LIMIT 1
"#;

pub struct TransportConstraintRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TransportConstraintRepository {
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

    /// 读取当前运送制约
    ///
    /// # 返回
    /// - Ok(None): 尚未设置
    pub fn get(&self) -> RepositoryResult<Option<TransportConstraint>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT id, product_id, container_id, max_quantity FROM transport_constraint WHERE id = ({})",
                    CURRENT_ROW_ID
                ),
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<i64>>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, product_id, container_id, max_quantity)| -> RepositoryResult<_> {
            Ok(TransportConstraint {
                id,
                product_id,
                container_id,
                max_quantity: max_quantity
                    .map(|q| u32_from_db("max_quantity", q))
                    .transpose()?,
            })
        })
        .transpose()
    }

    /// 保存运送制约（替换已有内容）
    ///
    /// # 返回
    /// - Ok(i64): 新行 id
    pub fn save(&self, constraint: &TransportConstraint) -> RepositoryResult<i64> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM transport_constraint", [])?;
        tx.execute(
            r#"
            INSERT INTO transport_constraint (product_id, container_id, max_quantity)
            VALUES (?1, ?2, ?3)
            "#,
            params![
                constraint.product_id,
                constraint.container_id,
                constraint.max_quantity,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(constraint_id = id, "运送制约已保存");
        Ok(id)
    }

    /// 更新当前运送制约（不存在时 NotFound）
    pub fn update(&self, constraint: &TransportConstraint) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            &format!(
                r#"
                UPDATE transport_constraint
                SET product_id = ?1, container_id = ?2, max_quantity = ?3,
                    updated_at = datetime('now')
                WHERE id = ({})
                "#,
                CURRENT_ROW_ID
            ),
            params![
                constraint.product_id,
                constraint.container_id,
                constraint.max_quantity,
            ],
        )?;

        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "TransportConstraint".to_string(),
                id: "current".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> TransportConstraintRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        TransportConstraintRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn constraint(max_quantity: u32) -> TransportConstraint {
        TransportConstraint {
            id: 0,
            product_id: Some(1001),
            container_id: Some(2),
            max_quantity: Some(max_quantity),
        }
    }

    #[test]
    fn test_empty_then_save() {
        let repo = setup();
        assert!(repo.get().unwrap().is_none());

        let id = repo.save(&constraint(40)).unwrap();
        let current = repo.get().unwrap().unwrap();
        assert_eq!(current.id, id);
        assert_eq!(current.max_quantity, Some(40));
    }

    #[test]
    fn test_save_replaces_previous() {
        let repo = setup();
        repo.save(&constraint(40)).unwrap();
        repo.save(&constraint(25)).unwrap();

        let count: i64 = repo
            .get_conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM transport_constraint", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(repo.get().unwrap().unwrap().max_quantity, Some(25));
    }

    #[test]
    fn test_update_requires_existing_row() {
        let repo = setup();
        assert!(matches!(
            repo.update(&constraint(10)).unwrap_err(),
            RepositoryError::NotFound { .. }
        ));

        let id = repo.save(&constraint(10)).unwrap();
        let mut changed = constraint(12);
        changed.product_id = None;
        repo.update(&changed).unwrap();

        let current = repo.get().unwrap().unwrap();
        assert_eq!(current.id, id);
        assert_eq!(current.product_id, None);
        assert_eq!(current.max_quantity, Some(12));
    }
}
