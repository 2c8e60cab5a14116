// ==========================================
// 积载计划系统 - 积载校验器
// ==========================================
// 职责: 校验指定需求行能否装入指定卡车
// 输出: feasible + 全部违规原因（不只第一条）
// 红线: 不修改输入，不感知其他卡车，违规以数据返回而非错误
// ==========================================

use crate::domain::capacity::{item_volume_m3, item_weight_kg, CapacityConstraint, LoadTally};
use crate::domain::container::Container;
use crate::domain::item::LoadingItem;
use crate::domain::truck::Truck;
use crate::domain::types::ViolationType;
use crate::engine::transport_planner::DEFAULT_CAPACITY_EPSILON;
use crate::i18n::{t, t_with_args};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::instrument;

// ==========================================
// LoadingViolation - 违规详情
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingViolation {
    pub violation_type: ViolationType,
    /// 本地化的可读原因
    pub message: String,
    /// 额外信息（可选）
    pub details: Option<serde_json::Value>,
}

// ==========================================
// LoadingCheck - 校验结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingCheck {
    pub feasible: bool,
    pub truck_id: Option<i64>,
    pub total_volume_m3: f64,
    pub total_weight_kg: f64,
    pub volume_capacity_m3: Option<f64>,
    pub weight_capacity_kg: Option<f64>,
    pub violations: Vec<LoadingViolation>,
}

impl LoadingCheck {
    /// 违规原因文本列表
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.message.clone()).collect()
    }

    pub fn has_violation(&self, violation_type: ViolationType) -> bool {
        self.violations
            .iter()
            .any(|v| v.violation_type == violation_type)
    }
}

// ==========================================
// LoadingValidator - 积载校验器
// ==========================================
pub struct LoadingValidator {
    epsilon: f64,
}

impl LoadingValidator {
    pub fn new() -> Self {
        Self::with_epsilon(DEFAULT_CAPACITY_EPSILON)
    }

    pub fn with_epsilon(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// 按 truck_id 在卡车列表中查找后校验
    pub fn validate_for_truck_id(
        &self,
        items: &[LoadingItem],
        containers: &[Container],
        trucks: &[Truck],
        truck_id: i64,
    ) -> LoadingCheck {
        let truck = trucks.iter().find(|t| t.id() == truck_id);
        let mut check = self.validate(items, containers, truck);
        if truck.is_none() {
            check.truck_id = Some(truck_id);
            for v in check.violations.iter_mut() {
                if v.violation_type == ViolationType::TruckNotFound {
                    v.details = Some(serde_json::json!({ "truck_id": truck_id }));
                }
            }
        }
        check
    }

    /// 校验积载可行性
    ///
    /// 违规类型:
    /// - TRUCK_NOT_FOUND: 卡车缺失
    /// - UNKNOWN_CONTAINER: 需求行引用了未登记的容器（每个容器ID报告一次）
    /// - VOLUME_EXCEEDED: 合计体积超过车厢容积
    /// - WEIGHT_EXCEEDED: 合计重量超过载重上限
    #[instrument(skip(self, items, containers, truck), fields(
        truck_id = ?truck.map(|t| t.id()),
        items_count = items.len()
    ))]
    pub fn validate(
        &self,
        items: &[LoadingItem],
        containers: &[Container],
        truck: Option<&Truck>,
    ) -> LoadingCheck {
        let mut violations = Vec::new();

        // 容器索引（同ID取首条）
        let mut index: HashMap<i64, &Container> = HashMap::with_capacity(containers.len());
        for c in containers {
            index.entry(c.id()).or_insert(c);
        }

        // 1. 汇总体积/重量
        let mut total_volume_m3 = 0.0;
        let mut total_weight_kg = 0.0;
        let mut unknown_containers = BTreeSet::new();
        for item in items {
            total_weight_kg += item_weight_kg(item);
            match index.get(&item.container_id()) {
                Some(container) => total_volume_m3 += item_volume_m3(item, container),
                None => {
                    unknown_containers.insert(item.container_id());
                }
            }
        }

        for container_id in unknown_containers {
            violations.push(LoadingViolation {
                violation_type: ViolationType::UnknownContainer,
                message: t_with_args(
                    ViolationType::UnknownContainer.message_key(),
                    &[("container_id", &container_id.to_string())],
                ),
                details: Some(serde_json::json!({ "container_id": container_id })),
            });
        }

        // 2. 卡车缺失
        let truck = match truck {
            Some(truck) => truck,
            None => {
                violations.insert(
                    0,
                    LoadingViolation {
                        violation_type: ViolationType::TruckNotFound,
                        message: t(ViolationType::TruckNotFound.message_key()),
                        details: None,
                    },
                );
                tracing::debug!(violations = violations.len(), "积载校验: 卡车不存在");
                return LoadingCheck {
                    feasible: false,
                    truck_id: None,
                    total_volume_m3,
                    total_weight_kg,
                    volume_capacity_m3: None,
                    weight_capacity_kg: None,
                    violations,
                };
            }
        };

        // 3. 容量约束
        let mut tally = LoadTally::for_truck(truck, self.epsilon);
        tally.add(total_volume_m3, total_weight_kg);

        let volume_excess = tally.volume_excess_m3();
        if volume_excess > 0.0 {
            violations.push(LoadingViolation {
                violation_type: ViolationType::VolumeExceeded,
                message: t_with_args(
                    ViolationType::VolumeExceeded.message_key(),
                    &[
                        ("total", &format!("{:.3}", total_volume_m3)),
                        ("capacity", &format!("{:.3}", tally.volume_capacity_m3)),
                    ],
                ),
                details: Some(serde_json::json!({
                    "total_volume_m3": total_volume_m3,
                    "volume_capacity_m3": tally.volume_capacity_m3,
                    "excess_m3": volume_excess,
                })),
            });
        }

        let weight_excess = tally.weight_excess_kg();
        if weight_excess > 0.0 {
            violations.push(LoadingViolation {
                violation_type: ViolationType::WeightExceeded,
                message: t_with_args(
                    ViolationType::WeightExceeded.message_key(),
                    &[
                        ("total", &format!("{:.1}", total_weight_kg)),
                        ("capacity", &format!("{:.1}", tally.weight_capacity_kg)),
                    ],
                ),
                details: Some(serde_json::json!({
                    "total_weight_kg": total_weight_kg,
                    "weight_capacity_kg": tally.weight_capacity_kg,
                    "excess_kg": weight_excess,
                })),
            });
        }

        let feasible = violations.is_empty();
        tracing::debug!(
            feasible,
            total_volume_m3,
            total_weight_kg,
            violations = violations.len(),
            "积载校验完成"
        );

        LoadingCheck {
            feasible,
            truck_id: Some(truck.id()),
            total_volume_m3,
            total_weight_kg,
            volume_capacity_m3: Some(tally.volume_capacity_m3),
            weight_capacity_kg: Some(tally.weight_capacity_kg),
            violations,
        }
    }
}

impl Default for LoadingValidator {
    fn default() -> Self {
        Self::new()
    }
}
