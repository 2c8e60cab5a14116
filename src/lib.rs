// ==========================================
// 积载计划系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 出货需求 → 卡车积载计划（人工最终确认）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 值对象与计划结果
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排车/积载/校验
pub mod engine;

// 导入层 - 外部需求文件
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    Container, DomainError, ItemKey, LoadingItem, RunResult, TransportConstraint, Truck,
    TruckContainerRule, TruckPlan, ViolationType,
};

// 引擎
pub use engine::{
    LoadingCheck, LoadingValidator, LoadingViolation, PlanReport, PlannerConfig,
    TransportPlanner, TruckOrdering,
};

// API
pub use api::{ApiError, ApiResult, TransportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "积载计划系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
