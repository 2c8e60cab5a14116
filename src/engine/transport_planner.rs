// ==========================================
// 积载计划系统 - 运送计划引擎
// ==========================================
// 职责: 多车贪心分配（first-fit）
// 输入: 需求行 + 容器目录 + 卡车目录
// 输出: RunResult（各车计划 + 未装载需求 + 效率）
// 红线:
// - 需求行整体装入一辆车，不拆分
// - 每辆车每次计划只跑一趟
// - 任何计划不得超过车厢容积/载重上限
// - 不做预排序/回溯：严格按待装池顺序 first-fit
// ==========================================

use crate::domain::capacity::{item_volume_m3, item_weight_kg, CapacityConstraint, LoadTally};
use crate::domain::container::Container;
use crate::domain::item::LoadingItem;
use crate::domain::plan::{RunResult, TruckPlan};
use crate::domain::truck::Truck;
use crate::domain::types::ItemKey;
use crate::engine::truck_order::{end_of_day, TruckOrdering};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::instrument;

/// 容量比较的默认浮点容差
pub const DEFAULT_CAPACITY_EPSILON: f64 = 1e-9;

// ==========================================
// PlannerConfig - 规划参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// 缺失发车时刻时的排序时刻
    pub fallback_departure_time: NaiveTime,
    /// 容量比较容差（m³ / kg）
    pub capacity_epsilon: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            fallback_departure_time: end_of_day(),
            capacity_epsilon: DEFAULT_CAPACITY_EPSILON,
        }
    }
}

/// 单车 first-fit 结果
#[derive(Debug, Clone)]
struct TruckLoading {
    accepted: Vec<usize>, // 被接受的待装池下标（升序）
    tally: LoadTally,
}

// ==========================================
// TransportPlanner - 运送计划引擎
// ==========================================
pub struct TransportPlanner {
    config: PlannerConfig,
}

impl TransportPlanner {
    pub fn new() -> Self {
        Self::with_config(PlannerConfig::default())
    }

    pub fn with_config(config: PlannerConfig) -> Self {
        Self { config }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算积载计划
    ///
    /// 流程:
    /// 1) 排车：常用便优先，发车时刻升序
    /// 2) 逐车对待装池做 first-fit
    /// 3) 有装载则生成计划，并按 (product_id, container_id) 批量移出待装池
    /// 4) 待装池为空时提前结束
    #[instrument(skip_all, fields(
        items_count = items.len(),
        containers_count = containers.len(),
        trucks_count = trucks.len()
    ))]
    pub fn plan(
        &self,
        items: &[LoadingItem],
        containers: &[Container],
        trucks: &[Truck],
    ) -> RunResult {
        let index = container_index(containers);
        let ordering = TruckOrdering::new(self.config.fallback_departure_time);

        let mut pending: Vec<LoadingItem> = items.to_vec();
        let mut plans = Vec::new();
        let mut displaced = Vec::new();

        for truck in ordering.sort(trucks) {
            if pending.is_empty() {
                break;
            }

            if !truck.has_capacity() {
                tracing::debug!(truck_id = truck.id(), "卡车容积或载重为 0，跳过");
                continue;
            }

            let loading = self.plan_truck_loading(&pending, &index, truck);
            if loading.accepted.is_empty() {
                tracing::debug!(truck_id = truck.id(), pending = pending.len(), "无可装载需求");
                continue;
            }

            let loaded_items: Vec<LoadingItem> = loading
                .accepted
                .iter()
                .map(|&idx| pending[idx].clone())
                .collect();

            let plan = TruckPlan::new(
                truck.clone(),
                loaded_items,
                loading.tally.used_volume_m3,
                loading.tally.used_weight_kg,
            );
            tracing::info!(
                truck_id = truck.id(),
                loaded = plan.loaded_items.len(),
                total_volume_m3 = plan.total_volume_m3,
                total_weight_kg = plan.total_weight_kg,
                volume_utilization = plan.volume_utilization,
                weight_utilization = plan.weight_utilization,
                remaining_volume_m3 = loading.tally.remaining_volume_m3(),
                remaining_weight_kg = loading.tally.remaining_weight_kg(),
                "卡车积载完成"
            );

            pending = remove_loaded_items(pending, &loading.accepted, &mut displaced);
            plans.push(plan);
        }

        let unresolved_items: Vec<LoadingItem> = pending
            .iter()
            .filter(|item| !index.contains_key(&item.container_id()))
            .cloned()
            .collect();

        let efficiency = RunResult::efficiency_of(&plans);
        tracing::info!(
            total_trips = plans.len(),
            remaining = pending.len(),
            unresolved = unresolved_items.len(),
            displaced = displaced.len(),
            efficiency,
            "积载计划完成"
        );

        RunResult {
            total_trips: plans.len(),
            plans,
            remaining_items: pending,
            unresolved_items,
            displaced_items: displaced,
            efficiency,
        }
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 单车 first-fit：按待装池顺序接受能装下的需求行
    fn plan_truck_loading(
        &self,
        pending: &[LoadingItem],
        index: &HashMap<i64, &Container>,
        truck: &Truck,
    ) -> TruckLoading {
        let mut tally = LoadTally::for_truck(truck, self.config.capacity_epsilon);
        let mut accepted = Vec::new();

        for (idx, item) in pending.iter().enumerate() {
            let container = match index.get(&item.container_id()) {
                Some(c) => c,
                None => {
                    tracing::debug!(
                        item = %item.key(),
                        container_id = item.container_id(),
                        "容器未登记，保留在待装池"
                    );
                    continue;
                }
            };

            let volume = item_volume_m3(item, container);
            let weight = item_weight_kg(item);
            if tally.can_add(volume, weight) {
                tally.add(volume, weight);
                accepted.push(idx);
            }
        }

        TruckLoading { accepted, tally }
    }
}

impl Default for TransportPlanner {
    fn default() -> Self {
        Self::new()
    }
}

/// 容器索引（同ID取首条）
fn container_index(containers: &[Container]) -> HashMap<i64, &Container> {
    let mut index = HashMap::with_capacity(containers.len());
    for c in containers {
        index.entry(c.id()).or_insert(c);
    }
    index
}

/// 移出已装载需求：与任一已装载行同键的待装行全部出池
///
/// 同键但自身未装载的行记入 displaced
fn remove_loaded_items(
    pending: Vec<LoadingItem>,
    accepted: &[usize],
    displaced: &mut Vec<LoadingItem>,
) -> Vec<LoadingItem> {
    let accepted_idx: HashSet<usize> = accepted.iter().copied().collect();
    let loaded_keys: HashSet<ItemKey> = accepted.iter().map(|&i| pending[i].key()).collect();

    let mut remaining = Vec::with_capacity(pending.len().saturating_sub(accepted.len()));
    for (idx, item) in pending.into_iter().enumerate() {
        if accepted_idx.contains(&idx) {
            continue;
        }
        if loaded_keys.contains(&item.key()) {
            tracing::warn!(item = %item.key(), "同键需求行随已装载行一并移出待装池");
            displaced.push(item);
        } else {
            remaining.push(item);
        }
    }
    remaining
}
