// ==========================================
// 积载计划系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 积载单元标识 (Item Key)
// ==========================================
// 红线: (product_id, container_id) 相同即视为同一积载单元
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub product_id: i64,
    pub container_id: i64,
}

impl ItemKey {
    pub fn new(product_id: i64, container_id: i64) -> Self {
        Self {
            product_id,
            container_id,
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}/C{}", self.product_id, self.container_id)
    }
}

// ==========================================
// 积载违规类型 (Violation Type)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationType {
    TruckNotFound,    // 卡车不存在
    VolumeExceeded,   // 体积超限
    WeightExceeded,   // 重量超限
    UnknownContainer, // 容器未登记
}

impl ViolationType {
    /// i18n 消息键
    pub fn message_key(&self) -> &'static str {
        match self {
            ViolationType::TruckNotFound => "loading.truck_not_found",
            ViolationType::VolumeExceeded => "loading.volume_exceeded",
            ViolationType::WeightExceeded => "loading.weight_exceeded",
            ViolationType::UnknownContainer => "loading.unknown_container",
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationType::TruckNotFound => write!(f, "TRUCK_NOT_FOUND"),
            ViolationType::VolumeExceeded => write!(f, "VOLUME_EXCEEDED"),
            ViolationType::WeightExceeded => write!(f, "WEIGHT_EXCEEDED"),
            ViolationType::UnknownContainer => write!(f, "UNKNOWN_CONTAINER"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_key_display() {
        assert_eq!(ItemKey::new(12, 3).to_string(), "P12/C3");
    }

    #[test]
    fn test_violation_type_serde_matches_display() {
        for vt in [
            ViolationType::TruckNotFound,
            ViolationType::VolumeExceeded,
            ViolationType::WeightExceeded,
            ViolationType::UnknownContainer,
        ] {
            let json = serde_json::to_string(&vt).unwrap();
            assert_eq!(json, format!("\"{}\"", vt));
        }
    }
}
