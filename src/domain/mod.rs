// ==========================================
// 积载计划系统 - 领域模型层
// ==========================================
// 职责: 定义值对象、容量模型、计划结果
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod capacity;
pub mod container;
pub mod error;
pub mod item;
pub mod plan;
pub mod transport_rule;
pub mod truck;
pub mod types;

// 重导出核心类型
pub use capacity::{
    item_volume_m3, item_weight_kg, utilization, volume_m3, CapacityConstraint, LoadTally,
};
pub use container::Container;
pub use error::{DomainError, DomainResult};
pub use item::LoadingItem;
pub use plan::{RunResult, TruckPlan};
pub use transport_rule::{TransportConstraint, TruckContainerRule};
pub use truck::Truck;
pub use types::{ItemKey, ViolationType};
