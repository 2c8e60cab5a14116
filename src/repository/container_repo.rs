// ==========================================
// 积载计划系统 - 容器主数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 尺寸以 mm 整数存储，载重以 kg 浮点存储
// ==========================================

use crate::domain::container::Container;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// 数据库整数转为 u32（负数/溢出视为字段错误）
pub(crate) fn u32_from_db(field: &str, value: i64) -> RepositoryResult<u32> {
    u32::try_from(value).map_err(|_| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("数值超出范围: {}", value),
    })
}

/// 未落库的对象 id<=0，由 SQLite 分配主键
pub(crate) fn assigned_id(id: i64) -> Option<i64> {
    (id > 0).then_some(id)
}

// 行原始值，脱离连接后再做领域校验
struct ContainerRow {
    id: i64,
    name: String,
    width: i64,
    depth: i64,
    height: i64,
    max_weight: Option<f64>,
    can_mix: bool,
}

impl ContainerRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            width: row.get(2)?,
            depth: row.get(3)?,
            height: row.get(4)?,
            max_weight: row.get(5)?,
            can_mix: row.get(6)?,
        })
    }

    fn into_container(self) -> RepositoryResult<Container> {
        Ok(Container::new(
            self.id,
            self.name,
            u32_from_db("width", self.width)?,
            u32_from_db("depth", self.depth)?,
            u32_from_db("height", self.height)?,
            self.max_weight,
        )?
        .with_can_mix(self.can_mix))
    }
}

// ==========================================
// ContainerRepository - 容器仓储
// ==========================================

/// 容器仓储
/// 职责: 管理 container_capacity 表的 CRUD 操作
pub struct ContainerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ContainerRepository {
    /// 创建新的容器仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部容器（按 id 升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Container>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, width, depth, height, max_weight, can_mix
            FROM container_capacity
            ORDER BY id
            "#,
        )?;

        let rows = stmt
            .query_map([], ContainerRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(ContainerRow::into_container).collect()
    }

    /// 按 id 查询容器
    ///
    /// # 返回
    /// - Ok(Some(Container)): 找到
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Container>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                r#"
                SELECT id, name, width, depth, height, max_weight, can_mix
                FROM container_capacity
                WHERE id = ?1
                "#,
                params![id],
                ContainerRow::from_row,
            )
            .optional()?;

        row.map(ContainerRow::into_container).transpose()
    }

    /// 插入容器
    ///
    /// # 返回
    /// - Ok(i64): 落库后的 id（container.id() <= 0 时由数据库分配）
    pub fn insert(&self, container: &Container) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO container_capacity (id, name, width, depth, height, max_weight, can_mix)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                assigned_id(container.id()),
                container.name(),
                container.width_mm(),
                container.depth_mm(),
                container.height_mm(),
                container.max_weight_kg(),
                container.can_mix(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新容器（按 id）
    pub fn update(&self, container: &Container) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE container_capacity
            SET name = ?2, width = ?3, depth = ?4, height = ?5, max_weight = ?6, can_mix = ?7
            WHERE id = ?1
            "#,
            params![
                container.id(),
                container.name(),
                container.width_mm(),
                container.depth_mm(),
                container.height_mm(),
                container.max_weight_kg(),
                container.can_mix(),
            ],
        )?;

        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Container".to_string(),
                id: container.id().to_string(),
            });
        }
        Ok(())
    }

    /// 删除容器（按 id）
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute("DELETE FROM container_capacity WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Container".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> ContainerRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        ContainerRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_insert_and_find() {
        let repo = setup();
        let c = Container::new(0, "カゴ台車", 500, 500, 500, Some(50.0)).unwrap();
        let id = repo.insert(&c).unwrap();
        assert!(id > 0);

        let found = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.name(), "カゴ台車");
        assert_eq!(found.width_mm(), 500);
        assert_eq!(found.max_weight_kg(), Some(50.0));
        assert!(found.can_mix());
        assert!(repo.find_by_id(id + 100).unwrap().is_none());
    }

    #[test]
    fn test_invalid_row_maps_to_field_value_error() {
        let repo = setup();
        {
            let conn = repo.get_conn().unwrap();
            conn.execute(
                "INSERT INTO container_capacity (id, name, width, depth, height) VALUES (5, 'bad', 0, 10, 10)",
                [],
            )
            .unwrap();
        }
        let err = repo.list_all().unwrap_err();
        assert!(matches!(err, RepositoryError::FieldValueError { .. }));
    }

    #[test]
    fn test_can_mix_is_stored() {
        let repo = setup();
        let c = Container::new(0, "専用箱", 400, 300, 200, None)
            .unwrap()
            .with_can_mix(false);
        let id = repo.insert(&c).unwrap();
        assert!(!repo.find_by_id(id).unwrap().unwrap().can_mix());

        let mixed = Container::new(id, "専用箱", 400, 300, 200, None).unwrap();
        repo.update(&mixed).unwrap();
        assert!(repo.find_by_id(id).unwrap().unwrap().can_mix());
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let repo = setup();
        let c = Container::new(42, "X", 1, 1, 1, None).unwrap();
        assert!(matches!(
            repo.update(&c).unwrap_err(),
            RepositoryError::NotFound { .. }
        ));
        assert!(matches!(
            repo.delete(42).unwrap_err(),
            RepositoryError::NotFound { .. }
        ));
    }
}
