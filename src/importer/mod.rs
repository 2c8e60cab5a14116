// ==========================================
// 积载计划系统 - 导入层
// ==========================================
// 职责: 外部出货需求文件 → LoadingItem
// ==========================================

pub mod demand_csv;
pub mod error;

pub use demand_csv::{DemandCsvImporter, DemandImport};
pub use error::{ImportError, ImportResult};
