// ==========================================
// 积载计划系统 - 卡车领域模型
// ==========================================
// 用途: 车厢容积/载重上限 + 单一发车时刻（每次计划一趟）
// ==========================================

use crate::domain::capacity::volume_m3;
use crate::domain::error::{ensure_non_negative, DomainError, DomainResult};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Truck - 卡车
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TruckRecord")]
pub struct Truck {
    id: i64,
    name: String,

    // ===== 车厢尺寸 (mm) =====
    // 允许为 0：零容积卡车不接受任何积载
    width_mm: u32,
    depth_mm: u32,
    height_mm: u32,

    max_weight_kg: f64,

    // ===== 运行时刻 =====
    departure_time: Option<NaiveTime>,
    arrival_time: Option<NaiveTime>,
    arrival_day_offset: u32, // 到达日相对发车日的偏移 (天)

    default_use: bool, // 常用便（优先排车）
}

#[derive(Debug, Deserialize)]
struct TruckRecord {
    id: i64,
    #[serde(default)]
    name: String,
    width_mm: u32,
    depth_mm: u32,
    height_mm: u32,
    max_weight_kg: f64,
    #[serde(default)]
    departure_time: Option<NaiveTime>,
    #[serde(default)]
    arrival_time: Option<NaiveTime>,
    #[serde(default)]
    arrival_day_offset: u32,
    #[serde(default)]
    default_use: bool,
}

impl TryFrom<TruckRecord> for Truck {
    type Error = DomainError;

    fn try_from(r: TruckRecord) -> DomainResult<Self> {
        let mut truck = Truck::new(r.id, r.name, r.width_mm, r.depth_mm, r.height_mm, r.max_weight_kg)?
            .with_default_use(r.default_use)
            .with_arrival_parts(r.arrival_time, r.arrival_day_offset)?;
        truck.departure_time = r.departure_time;
        Ok(truck)
    }
}

impl Truck {
    /// 构造卡车（无发车时刻、非常用便）
    ///
    /// # 返回
    /// - Err(DomainError::InvalidNumber): max_weight_kg 为负数或非有限数
    pub fn new(
        id: i64,
        name: impl Into<String>,
        width_mm: u32,
        depth_mm: u32,
        height_mm: u32,
        max_weight_kg: f64,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: name.into(),
            width_mm,
            depth_mm,
            height_mm,
            max_weight_kg: ensure_non_negative("truck", "max_weight_kg", max_weight_kg)?,
            departure_time: None,
            arrival_time: None,
            arrival_day_offset: 0,
            default_use: false,
        })
    }

    pub fn with_departure_time(mut self, departure_time: NaiveTime) -> Self {
        self.departure_time = Some(departure_time);
        self
    }

    pub fn with_arrival(mut self, arrival_time: NaiveTime, day_offset: u32) -> Self {
        self.arrival_time = Some(arrival_time);
        self.arrival_day_offset = day_offset;
        self
    }

    /// 按可空到达时刻设置到达信息
    ///
    /// # 返回
    /// - Err(DomainError::InconsistentField): 无到达时刻但偏移不为 0
    pub fn with_arrival_parts(
        self,
        arrival_time: Option<NaiveTime>,
        day_offset: u32,
    ) -> DomainResult<Self> {
        match arrival_time {
            Some(arr) => Ok(self.with_arrival(arr, day_offset)),
            None if day_offset == 0 => Ok(self),
            None => Err(DomainError::InconsistentField {
                entity: "truck",
                field: "arrival_day_offset",
                reason: "未设置到达时刻时偏移必须为 0",
            }),
        }
    }

    pub fn with_default_use(mut self, default_use: bool) -> Self {
        self.default_use = default_use;
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

    pub fn max_weight_kg(&self) -> f64 {
        self.max_weight_kg
    }

    pub fn departure_time(&self) -> Option<NaiveTime> {
        self.departure_time
    }

    pub fn arrival_time(&self) -> Option<NaiveTime> {
        self.arrival_time
    }

    pub fn arrival_day_offset(&self) -> u32 {
        self.arrival_day_offset
    }

    pub fn default_use(&self) -> bool {
        self.default_use
    }

    /// 车厢容积 (m³)
    pub fn volume_m3(&self) -> f64 {
        volume_m3(self.width_mm, self.depth_mm, self.height_mm)
    }

    /// 是否具备积载能力（容积与载重均大于 0）
    pub fn has_capacity(&self) -> bool {
        self.volume_m3() > 0.0 && self.max_weight_kg > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truck_volume_and_capacity() {
        let t = Truck::new(1, "4t车", 2000, 2000, 2000, 1000.0).unwrap();
        assert_eq!(t.volume_m3(), 8.0);
        assert!(t.has_capacity());

        let t = Truck::new(2, "空车", 2000, 2000, 2000, 0.0).unwrap();
        assert!(!t.has_capacity());

        let t = Truck::new(3, "零容积", 0, 2000, 2000, 1000.0).unwrap();
        assert_eq!(t.volume_m3(), 0.0);
        assert!(!t.has_capacity());
    }

    #[test]
    fn test_builder_methods() {
        let dep = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let arr = NaiveTime::from_hms_opt(6, 30, 0).unwrap();
        let t = Truck::new(1, "夜行便", 2000, 2000, 2000, 1000.0)
            .unwrap()
            .with_departure_time(dep)
            .with_arrival(arr, 1)
            .with_default_use(true);
        assert_eq!(t.departure_time(), Some(dep));
        assert_eq!(t.arrival_time(), Some(arr));
        assert_eq!(t.arrival_day_offset(), 1);
        assert!(t.default_use());
    }

    #[test]
    fn test_deserialize_time_fields() {
        let t: Truck = serde_json::from_str(
            r#"{"id":7,"name":"A便","width_mm":2000,"depth_mm":6000,"height_mm":2200,
                "max_weight_kg":4000.0,"departure_time":"08:15:00","default_use":true}"#,
        )
        .unwrap();
        assert_eq!(t.departure_time(), NaiveTime::from_hms_opt(8, 15, 0));
        assert!(t.default_use());
        assert_eq!(t.arrival_time(), None);
    }

    #[test]
    fn test_day_offset_requires_arrival_time() {
        let t = Truck::new(1, "片道", 1, 1, 1, 10.0).unwrap();
        assert!(matches!(
            t.clone().with_arrival_parts(None, 1).unwrap_err(),
            DomainError::InconsistentField { field: "arrival_day_offset", .. }
        ));
        assert_eq!(t.clone().with_arrival_parts(None, 0).unwrap(), t);

        let err = serde_json::from_str::<Truck>(
            r#"{"id":1,"width_mm":1,"depth_mm":1,"height_mm":1,"max_weight_kg":1.0,
                "arrival_day_offset":2}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_negative_max_weight_rejected() {
        assert!(Truck::new(1, "坏车", 1, 1, 1, -10.0).is_err());
    }
}
