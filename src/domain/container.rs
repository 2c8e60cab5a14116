// ==========================================
// 积载计划系统 - 容器领域模型
// ==========================================
// 用途: 规格固定的周转容器（计划期间只读的主数据）
// ==========================================

use crate::domain::capacity::volume_m3;
use crate::domain::error::{ensure_non_negative, ensure_positive_dimension, DomainError, DomainResult};
use serde::{Deserialize, Serialize};

// ==========================================
// Container - 容器
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ContainerRecord")]
pub struct Container {
    id: i64,
    name: String,
    width_mm: u32,
    depth_mm: u32,
    height_mm: u32,
    max_weight_kg: Option<f64>, // 容器载重上限 (kg)，可空
    can_mix: bool,              // 可与其他容器混载
}

fn default_can_mix() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct ContainerRecord {
    id: i64,
    #[serde(default)]
    name: String,
    width_mm: u32,
    depth_mm: u32,
    height_mm: u32,
    #[serde(default)]
    max_weight_kg: Option<f64>,
    #[serde(default = "default_can_mix")]
    can_mix: bool,
}

impl TryFrom<ContainerRecord> for Container {
    type Error = DomainError;

    fn try_from(r: ContainerRecord) -> DomainResult<Self> {
        Ok(Container::new(r.id, r.name, r.width_mm, r.depth_mm, r.height_mm, r.max_weight_kg)?
            .with_can_mix(r.can_mix))
    }
}

impl Container {
    /// 构造容器（默认可混载）
    ///
    /// # 返回
    /// - Err(DomainError::NonPositiveDimension): 任一尺寸为 0
    /// - Err(DomainError::InvalidNumber): max_weight_kg 为负数或非有限数
    pub fn new(
        id: i64,
        name: impl Into<String>,
        width_mm: u32,
        depth_mm: u32,
        height_mm: u32,
        max_weight_kg: Option<f64>,
    ) -> DomainResult<Self> {
        let max_weight_kg = max_weight_kg
            .map(|w| ensure_non_negative("container", "max_weight_kg", w))
            .transpose()?;

        Ok(Self {
            id,
            name: name.into(),
            width_mm: ensure_positive_dimension("container", "width_mm", width_mm)?,
            depth_mm: ensure_positive_dimension("container", "depth_mm", depth_mm)?,
            height_mm: ensure_positive_dimension("container", "height_mm", height_mm)?,
            max_weight_kg,
            can_mix: default_can_mix(),
        })
    }

    pub fn with_can_mix(mut self, can_mix: bool) -> Self {
        self.can_mix = can_mix;
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width_mm(&self) -> u32 {
        self.width_mm
    }

    pub fn depth_mm(&self) -> u32 {
        self.depth_mm
    }

    pub fn height_mm(&self) -> u32 {
        self.height_mm
    }

    pub fn max_weight_kg(&self) -> Option<f64> {
        self.max_weight_kg
    }

    pub fn can_mix(&self) -> bool {
        self.can_mix
    }

    /// 容器体积 (m³)
    pub fn volume_m3(&self) -> f64 {
        volume_m3(self.width_mm, self.depth_mm, self.height_mm)
    }
}
