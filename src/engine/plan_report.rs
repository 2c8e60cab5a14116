// ==========================================
// 积载计划系统 - 计划汇总
// ==========================================
// 职责: 将 RunResult 汇总为可展示/可序列化的报表
// 红线: 不做百分比/货币/本地化格式化（展示层负责）
// ==========================================

use crate::domain::item::LoadingItem;
use crate::domain::plan::{RunResult, TruckPlan};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

// ==========================================
// TruckPlanRow - 单车汇总行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckPlanRow {
    pub truck_id: i64,
    pub truck_name: String,
    pub departure_time: Option<NaiveTime>,
    pub default_use: bool,
    pub item_count: usize,
    pub total_quantity: u64,
    pub total_volume_m3: f64,
    pub total_weight_kg: f64,
    pub volume_utilization: f64,
    pub weight_utilization: f64,
}

impl From<&TruckPlan> for TruckPlanRow {
    fn from(plan: &TruckPlan) -> Self {
        Self {
            truck_id: plan.truck.id(),
            truck_name: plan.truck.name().to_string(),
            departure_time: plan.truck.departure_time(),
            default_use: plan.truck.default_use(),
            item_count: plan.loaded_items.len(),
            total_quantity: plan
                .loaded_items
                .iter()
                .map(|i| u64::from(i.quantity()))
                .sum(),
            total_volume_m3: plan.total_volume_m3,
            total_weight_kg: plan.total_weight_kg,
            volume_utilization: plan.volume_utilization,
            weight_utilization: plan.weight_utilization,
        }
    }
}

// ==========================================
// PlanReport - 运行汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub total_trips: usize,
    pub efficiency: f64,
    pub fully_allocated: bool,
    pub placed_item_count: usize,
    pub remaining_item_count: usize,
    pub unresolved_item_count: usize,
    pub displaced_item_count: usize,
    pub total_volume_m3: f64,
    pub total_weight_kg: f64,
    pub mean_volume_utilization: f64,
    pub mean_weight_utilization: f64,
    pub trucks: Vec<TruckPlanRow>,
    pub remaining_items: Vec<LoadingItem>,
    pub unresolved_items: Vec<LoadingItem>,
}

impl PlanReport {
    pub fn from_run(run: &RunResult) -> Self {
        let trucks: Vec<TruckPlanRow> = run.plans.iter().map(TruckPlanRow::from).collect();
        let plan_count = run.plans.len();

        let (mean_volume_utilization, mean_weight_utilization) = if plan_count == 0 {
            (0.0, 0.0)
        } else {
            let n = plan_count as f64;
            (
                run.plans.iter().map(|p| p.volume_utilization).sum::<f64>() / n,
                run.plans.iter().map(|p| p.weight_utilization).sum::<f64>() / n,
            )
        };

        Self {
            total_trips: run.total_trips,
            efficiency: run.efficiency,
            fully_allocated: run.is_fully_allocated(),
            placed_item_count: run.placed_items().count(),
            remaining_item_count: run.remaining_items.len(),
            unresolved_item_count: run.unresolved_items.len(),
            displaced_item_count: run.displaced_items.len(),
            total_volume_m3: run.plans.iter().map(|p| p.total_volume_m3).sum(),
            total_weight_kg: run.plans.iter().map(|p| p.total_weight_kg).sum(),
            mean_volume_utilization,
            mean_weight_utilization,
            trucks,
            remaining_items: run.remaining_items.clone(),
            unresolved_items: run.unresolved_items.clone(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
