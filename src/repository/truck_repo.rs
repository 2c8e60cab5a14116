// ==========================================
// 积载计划系统 - 卡车主数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 发车/到达时刻以 HH:MM:SS 文本存储
// ==========================================

use crate::domain::truck::Truck;
use crate::repository::container_repo::{assigned_id, u32_from_db};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

const TIME_FORMAT: &str = "%H:%M:%S";

fn time_to_db(time: Option<NaiveTime>) -> Option<String> {
    time.map(|t| t.format(TIME_FORMAT).to_string())
}

fn time_from_db(field: &str, value: Option<String>) -> RepositoryResult<Option<NaiveTime>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveTime::parse_from_str(s, TIME_FORMAT)
            .map(Some)
            .map_err(|e| RepositoryError::FieldValueError {
                field: field.to_string(),
                message: format!("时刻格式错误 '{}': {}", s, e),
            }),
    }
}

struct TruckRow {
    id: i64,
    name: String,
    width: i64,
    depth: i64,
    height: i64,
    max_weight: f64,
    departure_time: Option<String>,
    arrival_time: Option<String>,
    arrival_day_offset: i64,
    default_use: bool,
}

impl TruckRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            width: row.get(2)?,
            depth: row.get(3)?,
            height: row.get(4)?,
            max_weight: row.get(5)?,
            departure_time: row.get(6)?,
            arrival_time: row.get(7)?,
            arrival_day_offset: row.get(8)?,
            default_use: row.get(9)?,
        })
    }

    fn into_truck(self) -> RepositoryResult<Truck> {
        let mut truck = Truck::new(
            self.id,
            self.name,
            u32_from_db("width", self.width)?,
            u32_from_db("depth", self.depth)?,
            u32_from_db("height", self.height)?,
            self.max_weight,
        )?
        .with_default_use(self.default_use)
        .with_arrival_parts(
            time_from_db("arrival_time", self.arrival_time)?,
            u32_from_db("arrival_day_offset", self.arrival_day_offset)?,
        )?;

        if let Some(dep) = time_from_db("departure_time", self.departure_time)? {
            truck = truck.with_departure_time(dep);
        }
        Ok(truck)
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, width, depth, height, max_weight,
           departure_time, arrival_time, arrival_day_offset, default_use
    FROM truck_master
"#;

// ==========================================
// TruckRepository - 卡车仓储
// ==========================================

/// 卡车仓储
/// 职责: 管理 truck_master 表的 CRUD 操作
pub struct TruckRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TruckRepository {
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

    /// 查询全部卡车（按 id 升序，排车顺序由引擎决定）
    pub fn list_all(&self) -> RepositoryResult<Vec<Truck>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;

        let rows = stmt
            .query_map([], TruckRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(TruckRow::into_truck).collect()
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Truck>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                TruckRow::from_row,
            )
            .optional()?;

        row.map(TruckRow::into_truck).transpose()
    }

    /// 插入卡车
    ///
    /// # 返回
    /// - Ok(i64): 落库后的 id（truck.id() <= 0 时由数据库分配）
    pub fn insert(&self, truck: &Truck) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO truck_master (
                id, name, width, depth, height, max_weight,
                departure_time, arrival_time, arrival_day_offset, default_use
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                assigned_id(truck.id()),
                truck.name(),
                truck.width_mm(),
                truck.depth_mm(),
                truck.height_mm(),
                truck.max_weight_kg(),
                time_to_db(truck.departure_time()),
                time_to_db(truck.arrival_time()),
                truck.arrival_day_offset(),
                truck.default_use(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, truck: &Truck) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE truck_master
            SET name = ?2, width = ?3, depth = ?4, height = ?5, max_weight = ?6,
                departure_time = ?7, arrival_time = ?8, arrival_day_offset = ?9,
                default_use = ?10
            WHERE id = ?1
            "#,
            params![
                truck.id(),
                truck.name(),
                truck.width_mm(),
                truck.depth_mm(),
                truck.height_mm(),
                truck.max_weight_kg(),
                time_to_db(truck.departure_time()),
                time_to_db(truck.arrival_time()),
                truck.arrival_day_offset(),
                truck.default_use(),
            ],
        )?;

        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Truck".to_string(),
                id: truck.id().to_string(),
            });
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute("DELETE FROM truck_master WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Truck".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
