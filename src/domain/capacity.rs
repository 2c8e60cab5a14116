// ==========================================
// 积载计划系统 - 容量模型
// ==========================================
// 红线: 仅做体积/重量汇总，不做三维摆放
// 单位: 尺寸 mm，体积 m³，重量 kg
// ==========================================

use crate::domain::container::Container;
use crate::domain::item::LoadingItem;
use crate::domain::truck::Truck;
use serde::{Deserialize, Serialize};

/// mm³ → m³ 换算系数
pub const MM3_PER_M3: f64 = 1_000_000_000.0;

/// 由 mm 尺寸计算体积 (m³)
pub fn volume_m3(width_mm: u32, depth_mm: u32, height_mm: u32) -> f64 {
    // f64 相乘，避免 u32 连乘溢出
    (width_mm as f64 * depth_mm as f64 * height_mm as f64) / MM3_PER_M3
}

/// 需求行体积 = 容器体积 × 数量
pub fn item_volume_m3(item: &LoadingItem, container: &Container) -> f64 {
    container.volume_m3() * item.quantity() as f64
}

/// 需求行重量 = 单位重量 × 数量
pub fn item_weight_kg(item: &LoadingItem) -> f64 {
    item.unit_weight_kg() * item.quantity() as f64
}

/// 利用率；容量为 0 时定义为 0
pub fn utilization(used: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        used / capacity
    } else {
        0.0
    }
}

// ==========================================
// LoadTally - 单车积载累计
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadTally {
    pub volume_capacity_m3: f64,
    pub weight_capacity_kg: f64,
    pub used_volume_m3: f64,
    pub used_weight_kg: f64,
    pub epsilon: f64, // 浮点容差
}

impl LoadTally {
    /// 以卡车容量建立空累计
    pub fn for_truck(truck: &Truck, epsilon: f64) -> Self {
        Self {
            volume_capacity_m3: truck.volume_m3(),
            weight_capacity_kg: truck.max_weight_kg(),
            used_volume_m3: 0.0,
            used_weight_kg: 0.0,
            epsilon,
        }
    }

    /// 计入一行积载
    pub fn add(&mut self, volume_m3: f64, weight_kg: f64) {
        self.used_volume_m3 += volume_m3;
        self.used_weight_kg += weight_kg;
    }

    pub fn volume_utilization(&self) -> f64 {
        utilization(self.used_volume_m3, self.volume_capacity_m3)
    }

    pub fn weight_utilization(&self) -> f64 {
        utilization(self.used_weight_kg, self.weight_capacity_kg)
    }
}

// ==========================================
// Trait: CapacityConstraint
// ==========================================
// 用途: 规划器/校验器共用的容量约束检查接口
pub trait CapacityConstraint {
    /// 检查追加后是否仍在容积与载重上限内
    fn can_add(&self, volume_m3: f64, weight_kg: f64) -> bool;

    /// 超出容积 (m³)，未超出为 0
    fn volume_excess_m3(&self) -> f64;

    /// 超出载重 (kg)，未超出为 0
    fn weight_excess_kg(&self) -> f64;

    /// 剩余容积 (m³)
    fn remaining_volume_m3(&self) -> f64;

    /// 剩余载重 (kg)
    fn remaining_weight_kg(&self) -> f64;
}

impl CapacityConstraint for LoadTally {
    fn can_add(&self, volume_m3: f64, weight_kg: f64) -> bool {
        self.used_volume_m3 + volume_m3 <= self.volume_capacity_m3 + self.epsilon
            && self.used_weight_kg + weight_kg <= self.weight_capacity_kg + self.epsilon
    }

    fn volume_excess_m3(&self) -> f64 {
        if self.used_volume_m3 > self.volume_capacity_m3 + self.epsilon {
            self.used_volume_m3 - self.volume_capacity_m3
        } else {
            0.0
        }
    }

    fn weight_excess_kg(&self) -> f64 {
        if self.used_weight_kg > self.weight_capacity_kg + self.epsilon {
            self.used_weight_kg - self.weight_capacity_kg
        } else {
            0.0
        }
    }

    fn remaining_volume_m3(&self) -> f64 {
        (self.volume_capacity_m3 - self.used_volume_m3).max(0.0)
    }

    fn remaining_weight_kg(&self) -> f64 {
        (self.weight_capacity_kg - self.used_weight_kg).max(0.0)
    }
}
