// ==========================================
// 积载计划系统 - 积载需求行领域模型
// ==========================================
// 用途: 某产品以某种容器计的出货数量
// 红线: 单行需求整体装入一辆卡车，不拆分
// ==========================================

use crate::domain::error::{ensure_non_negative, DomainError, DomainResult};
use crate::domain::types::ItemKey;
use serde::{Deserialize, Serialize};

// ==========================================
// LoadingItem - 积载需求行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LoadingItemRecord")]
pub struct LoadingItem {
    product_id: i64,
    container_id: i64,     // 所用容器
    quantity: u32,         // 容器数
    unit_weight_kg: f64,   // 每容器重量 (kg)
}

/// 反序列化中间结构（经 LoadingItem::new 校验）
#[derive(Debug, Deserialize)]
struct LoadingItemRecord {
    product_id: i64,
    container_id: i64,
    quantity: u32,
    #[serde(alias = "weight_per_unit")]
    unit_weight_kg: f64,
}

impl TryFrom<LoadingItemRecord> for LoadingItem {
    type Error = DomainError;

    fn try_from(record: LoadingItemRecord) -> DomainResult<Self> {
        LoadingItem::new(
            record.product_id,
            record.container_id,
            record.quantity,
            record.unit_weight_kg,
        )
    }
}

impl LoadingItem {
    /// 构造积载需求行
    ///
    /// # 返回
    /// - Err(DomainError::InvalidNumber): unit_weight_kg 为负数或非有限数
    pub fn new(
        product_id: i64,
        container_id: i64,
        quantity: u32,
        unit_weight_kg: f64,
    ) -> DomainResult<Self> {
        let unit_weight_kg = ensure_non_negative("item", "unit_weight_kg", unit_weight_kg)?;
        Ok(Self {
            product_id,
            container_id,
            quantity,
            unit_weight_kg,
        })
    }

    pub fn product_id(&self) -> i64 {
        self.product_id
    }

    pub fn container_id(&self) -> i64 {
        self.container_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_weight_kg(&self) -> f64 {
        self.unit_weight_kg
    }

    /// 积载单元标识 (product_id, container_id)
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.product_id, self.container_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative_weight() {
        assert!(LoadingItem::new(1, 1, 10, -1.0).is_err());
        assert!(LoadingItem::new(1, 1, 10, f64::NAN).is_err());
    }

    #[test]
    fn test_zero_quantity_is_valid() {
        let item = LoadingItem::new(1, 2, 0, 5.0).unwrap();
        assert_eq!(item.quantity(), 0);
        assert_eq!(item.key(), ItemKey::new(1, 2));
    }

    #[test]
    fn test_deserialize_accepts_legacy_field_name() {
        let item: LoadingItem = serde_json::from_str(
            r#"{"product_id":1,"container_id":2,"quantity":10,"weight_per_unit":5.0}"#,
        )
        .unwrap();
        assert_eq!(item.unit_weight_kg(), 5.0);
    }

    #[test]
    fn test_deserialize_runs_validation() {
        let result: Result<LoadingItem, _> = serde_json::from_str(
            r#"{"product_id":1,"container_id":2,"quantity":10,"unit_weight_kg":-5.0}"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unit_weight_kg"));
    }

    #[test]
    fn test_deserialize_rejects_negative_quantity() {
        let result: Result<LoadingItem, _> = serde_json::from_str(
            r#"{"product_id":1,"container_id":2,"quantity":-3,"unit_weight_kg":5.0}"#,
        );
        assert!(result.is_err());
    }
}
