// ==========================================
// 积载计划系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod catalog;
pub mod container_repo;
pub mod error;
pub mod plan_run_repo;
pub mod transport_constraint_repo;
pub mod truck_repo;
pub mod truck_rule_repo;

// 重导出核心仓储
pub use catalog::{SqliteTransportCatalog, TransportCatalog};
pub use container_repo::ContainerRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use plan_run_repo::{PlanRunItem, PlanRunSummary, TransportPlanRepository};
pub use transport_constraint_repo::TransportConstraintRepository;
pub use truck_repo::TruckRepository;
pub use truck_rule_repo::TruckContainerRuleRepository;
