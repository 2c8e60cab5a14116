// ==========================================
// 积载计划系统 - 计划运行结果仓储
// ==========================================
// 职责: 持久化一次计划运行（汇总 + 装载明细 + 完整快照）
// 红线: 只追加，不修改已保存的运行
// ==========================================

use crate::domain::plan::RunResult;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 计划运行汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRunSummary {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub total_trips: usize,
    pub efficiency: f64,
    pub remaining_count: usize,
    pub unresolved_count: usize,
}

/// 装载明细行（trip_no 从 1 开始，按排车顺序）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRunItem {
    pub trip_no: u32,
    pub seq_no: u32,
    pub truck_id: i64,
    pub product_id: i64,
    pub container_id: i64,
    pub quantity: u32,
    pub unit_weight_kg: f64,
}

// ==========================================
// TransportPlanRepository - 计划运行仓储
// ==========================================
pub struct TransportPlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TransportPlanRepository {
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

    /// 保存一次计划运行（单事务）
    ///
    /// # 返回
    /// - Ok(String): 新生成的 run_id（UUID v4）
    pub fn save_run(&self, run: &RunResult) -> RepositoryResult<String> {
        let run_id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();
        let result_json = serde_json::to_string(run)?;

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            r#"
            INSERT INTO transport_plan_run (
                run_id, created_at, total_trips, efficiency,
                remaining_count, unresolved_count, result_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                run_id,
                created_at,
                run.total_trips as i64,
                run.efficiency,
                run.remaining_items.len() as i64,
                run.unresolved_items.len() as i64,
                result_json,
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO transport_plan_item (
                    run_id, trip_no, seq_no, truck_id, product_id,
                    container_id, quantity, unit_weight_kg
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;

            for (trip_idx, plan) in run.plans.iter().enumerate() {
                for (seq_idx, item) in plan.loaded_items.iter().enumerate() {
                    stmt.execute(params![
                        run_id,
                        (trip_idx + 1) as i64,
                        (seq_idx + 1) as i64,
                        plan.truck_id(),
                        item.product_id(),
                        item.container_id(),
                        item.quantity(),
                        item.unit_weight_kg(),
                    ])?;
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tracing::info!(run_id = %run_id, trips = run.total_trips, "计划运行已保存");
        Ok(run_id)
    }

    /// 查询运行汇总
    pub fn find_run_summary(&self, run_id: &str) -> RepositoryResult<Option<PlanRunSummary>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                r#"
                SELECT run_id, created_at, total_trips, efficiency,
                       remaining_count, unresolved_count
                FROM transport_plan_run
                WHERE run_id = ?1
                "#,
                params![run_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, f64>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((run_id, created_at, trips, efficiency, remaining, unresolved)) = row else {
            return Ok(None);
        };

        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepositoryError::FieldValueError {
                field: "created_at".to_string(),
                message: e.to_string(),
            })?;

        Ok(Some(PlanRunSummary {
            run_id,
            created_at,
            total_trips: count_from_db("total_trips", trips)?,
            efficiency,
            remaining_count: count_from_db("remaining_count", remaining)?,
            unresolved_count: count_from_db("unresolved_count", unresolved)?,
        }))
    }

    /// 查询装载明细（trip_no, seq_no 升序）
    pub fn list_run_items(&self, run_id: &str) -> RepositoryResult<Vec<PlanRunItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT trip_no, seq_no, truck_id, product_id, container_id,
                   quantity, unit_weight_kg
            FROM transport_plan_item
            WHERE run_id = ?1
            ORDER BY trip_no, seq_no
            "#,
        )?;

        let items = stmt
            .query_map(params![run_id], |row| {
                Ok(PlanRunItem {
                    trip_no: row.get(0)?,
                    seq_no: row.get(1)?,
                    truck_id: row.get(2)?,
                    product_id: row.get(3)?,
                    container_id: row.get(4)?,
                    quantity: row.get(5)?,
                    unit_weight_kg: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// 读取完整运行快照
    pub fn load_run_result(&self, run_id: &str) -> RepositoryResult<Option<RunResult>> {
        let conn = self.get_conn()?;
        let json: Option<String> = conn
            .query_row(
                "SELECT result_json FROM transport_plan_run WHERE run_id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?;

        json.map(|s| serde_json::from_str(&s).map_err(RepositoryError::from))
            .transpose()
    }
}

fn count_from_db(field: &str, value: i64) -> RepositoryResult<usize> {
    usize::try_from(value).map_err(|_| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("计数为负: {}", value),
    })
}
