// ==========================================
// 积载计划系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::engine::transport_planner::{PlannerConfig, DEFAULT_CAPACITY_EPSILON};
use crate::engine::truck_order::end_of_day;
use chrono::NaiveTime;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::debug!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式，键升序）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    // ===== 积载计划配置 =====

    /// 无发车时刻卡车的排车用时刻（默认 23:59:59）
    pub fn get_fallback_departure_time(&self) -> Result<NaiveTime, Box<dyn Error>> {
        let Some(value) = self.get_config_value(config_keys::FALLBACK_DEPARTURE_TIME)? else {
            return Ok(end_of_day());
        };

        let trimmed = value.trim();
        let parsed = NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"));

        Ok(parsed.unwrap_or_else(|_| {
            tracing::warn!(
                config_key = config_keys::FALLBACK_DEPARTURE_TIME,
                raw_value = %value,
                "时刻配置格式错误，使用默认 23:59:59"
            );
            end_of_day()
        }))
    }

    /// 容量比较容差（非负有限数，默认 1e-9）
    pub fn get_capacity_epsilon(&self) -> Result<f64, Box<dyn Error>> {
        let Some(value) = self.get_config_value(config_keys::CAPACITY_EPSILON)? else {
            return Ok(DEFAULT_CAPACITY_EPSILON);
        };

        match value.trim().parse::<f64>() {
            Ok(eps) if eps.is_finite() && eps >= 0.0 => Ok(eps),
            _ => {
                tracing::warn!(
                    config_key = config_keys::CAPACITY_EPSILON,
                    raw_value = %value,
                    "容差配置无效，使用默认值"
                );
                Ok(DEFAULT_CAPACITY_EPSILON)
            }
        }
    }

    /// 界面/消息语言（默认 zh-CN）
    pub fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        let value = self
            .get_config_value(config_keys::LOCALE)?
            .map(|v| v.trim().to_string())
            .unwrap_or_default();

        if crate::i18n::SUPPORTED_LOCALES.contains(&value.as_str()) {
            Ok(value)
        } else {
            if !value.is_empty() {
                tracing::warn!(config_key = config_keys::LOCALE, raw_value = %value, "不支持的语言，使用 zh-CN");
            }
            Ok("zh-CN".to_string())
        }
    }

    /// 组装计划引擎配置
    pub fn planner_config(&self) -> Result<PlannerConfig, Box<dyn Error>> {
        Ok(PlannerConfig {
            fallback_departure_time: self.get_fallback_departure_time()?,
            capacity_epsilon: self.get_capacity_epsilon()?,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 积载计划
    pub const FALLBACK_DEPARTURE_TIME: &str = "planner.fallback_departure_time";
    pub const CAPACITY_EPSILON: &str = "planner.capacity_epsilon";

    // 应用
    pub const LOCALE: &str = "app.locale";
}
