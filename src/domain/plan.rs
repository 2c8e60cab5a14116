// ==========================================
// 积载计划系统 - 积载计划领域模型
// ==========================================
// TruckPlan: 单车积载结果
// RunResult: 一次计划运行的完整结果
// 红线: 计划结果每次重新计算，本模块不做持久化
// ==========================================

use crate::domain::capacity::utilization;
use crate::domain::item::LoadingItem;
use crate::domain::truck::Truck;
use crate::domain::types::ItemKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// TruckPlan - 单车积载计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckPlan {
    pub truck: Truck,                    // 卡车（只读快照）
    pub loaded_items: Vec<LoadingItem>,  // 装载的需求行（按装载顺序）
    pub total_volume_m3: f64,
    pub total_weight_kg: f64,
    pub volume_utilization: f64,         // total_volume / 车厢容积
    pub weight_utilization: f64,         // total_weight / 载重上限
}

impl TruckPlan {
    /// 由装载结果构造计划（利用率在此计算，容量为 0 时为 0）
    pub fn new(
        truck: Truck,
        loaded_items: Vec<LoadingItem>,
        total_volume_m3: f64,
        total_weight_kg: f64,
    ) -> Self {
        let volume_utilization = utilization(total_volume_m3, truck.volume_m3());
        let weight_utilization = utilization(total_weight_kg, truck.max_weight_kg());
        Self {
            truck,
            loaded_items,
            total_volume_m3,
            total_weight_kg,
            volume_utilization,
            weight_utilization,
        }
    }

    /// 体积/重量利用率均值
    pub fn mean_utilization(&self) -> f64 {
        (self.volume_utilization + self.weight_utilization) / 2.0
    }

    pub fn truck_id(&self) -> i64 {
        self.truck.id()
    }
}

// ==========================================
// RunResult - 计划运行结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub plans: Vec<TruckPlan>,             // 按排车顺序，仅含实际装载的卡车
    pub remaining_items: Vec<LoadingItem>, // 未能装载的需求行（保持输入顺序）
    pub unresolved_items: Vec<LoadingItem>, // remaining 中容器未登记的行
    pub displaced_items: Vec<LoadingItem>, // 因同键批量移除而出池、自身未装载的行
    pub total_trips: usize,
    pub efficiency: f64,                   // 各计划利用率均值的平均
}

impl RunResult {
    /// 计算整体效率：mean((volume_utilization + weight_utilization) / 2)
    pub fn efficiency_of(plans: &[TruckPlan]) -> f64 {
        if plans.is_empty() {
            return 0.0;
        }
        let total: f64 = plans.iter().map(TruckPlan::mean_utilization).sum();
        total / plans.len() as f64
    }

    /// 全部已装载需求行
    pub fn placed_items(&self) -> impl Iterator<Item = &LoadingItem> {
        self.plans.iter().flat_map(|p| p.loaded_items.iter())
    }

    /// 已装载的积载单元标识（去重）
    pub fn placed_keys(&self) -> BTreeSet<ItemKey> {
        self.placed_items().map(LoadingItem::key).collect()
    }

    /// 未装载的积载单元标识（去重）
    pub fn remaining_keys(&self) -> BTreeSet<ItemKey> {
        self.remaining_items.iter().map(LoadingItem::key).collect()
    }

    pub fn is_fully_allocated(&self) -> bool {
        self.remaining_items.is_empty()
    }
}
