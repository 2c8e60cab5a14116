// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use chrono::NaiveTime;
use freight_loading_planner::domain::{Container, LoadingItem, Truck};

/// 需求行
pub fn item(product_id: i64, container_id: i64, quantity: u32, weight_per_unit: f64) -> LoadingItem {
    LoadingItem::new(product_id, container_id, quantity, weight_per_unit).unwrap()
}

/// 立方体容器（边长 mm）
pub fn cube_container(id: i64, edge_mm: u32) -> Container {
    Container::new(id, format!("C{}", id), edge_mm, edge_mm, edge_mm, None).unwrap()
}

pub fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, s).unwrap()
}

// ==========================================
// Truck 构建器
// ==========================================

pub struct TruckBuilder {
    id: i64,
    name: String,
    width_mm: u32,
    depth_mm: u32,
    height_mm: u32,
    max_weight_kg: f64,
    departure_time: Option<NaiveTime>,
    default_use: bool,
}

impl TruckBuilder {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            name: format!("T{}", id),
            width_mm: 2000,
            depth_mm: 2000,
            height_mm: 2000,
            max_weight_kg: 1000.0,
            departure_time: None,
            default_use: false,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn cube(mut self, edge_mm: u32) -> Self {
        self.width_mm = edge_mm;
        self.depth_mm = edge_mm;
        self.height_mm = edge_mm;
        self
    }

    pub fn dims(mut self, width_mm: u32, depth_mm: u32, height_mm: u32) -> Self {
        self.width_mm = width_mm;
        self.depth_mm = depth_mm;
        self.height_mm = height_mm;
        self
    }

    pub fn max_weight(mut self, kg: f64) -> Self {
        self.max_weight_kg = kg;
        self
    }

    pub fn departs(mut self, time: NaiveTime) -> Self {
        self.departure_time = Some(time);
        self
    }

    pub fn default_use(mut self) -> Self {
        self.default_use = true;
        self
    }

    pub fn build(self) -> Truck {
        let truck = Truck::new(
            self.id,
            self.name,
            self.width_mm,
            self.depth_mm,
            self.height_mm,
            self.max_weight_kg,
        )
        .unwrap()
        .with_default_use(self.default_use);

        match self.departure_time {
            Some(t) => truck.with_departure_time(t),
            None => truck,
        }
    }
}
