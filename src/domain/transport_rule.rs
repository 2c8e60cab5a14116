// ==========================================
// 积载计划系统 - 运送规则主数据
// ==========================================
// TruckContainerRule: 卡车可搭载的容器及数量上限、优先级
// TransportConstraint: 全局运送制约（单例，保存即替换）
// 说明: 主数据维护用，积载计划计算不读取
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// TruckContainerRule - 卡车-容器搭载规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruckContainerRule {
    #[serde(default)]
    pub id: i64, // <=0 表示未落库
    pub truck_id: i64,
    pub container_id: i64,
    #[serde(default)]
    pub max_quantity: Option<u32>, // 空 = 不限
    #[serde(default)]
    pub priority: i32, // 同一卡车内升序
}

impl TruckContainerRule {
    pub fn new(truck_id: i64, container_id: i64) -> Self {
        Self {
            id: 0,
            truck_id,
            container_id,
            max_quantity: None,
            priority: 0,
        }
    }

    pub fn with_max_quantity(mut self, max_quantity: u32) -> Self {
        self.max_quantity = Some(max_quantity);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

// ==========================================
// TransportConstraint - 运送制约
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConstraint {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub container_id: Option<i64>,
    #[serde(default)]
    pub max_quantity: Option<u32>,
}
