// ==========================================
// 积载计划系统 - 引擎层
// ==========================================
// 职责: 实现积载规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 所有违规必须输出 reason
// ==========================================

pub mod loading_validator;
pub mod plan_report;
pub mod transport_planner;
pub mod truck_order;

// 重导出核心引擎
pub use loading_validator::{LoadingCheck, LoadingValidator, LoadingViolation};
pub use plan_report::{PlanReport, TruckPlanRow};
pub use transport_planner::{PlannerConfig, TransportPlanner, DEFAULT_CAPACITY_EPSILON};
pub use truck_order::{end_of_day, TruckOrdering};
