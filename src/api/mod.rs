// ==========================================
// 积载计划系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 CLI/上层调用
// ==========================================

pub mod error;
pub mod transport_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use transport_api::{
    ContainerInput, CsvPlanOutcome, DeliveryItemInput, TransportApi, TruckContainerRuleInput, TruckInput,
};
