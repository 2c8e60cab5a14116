// ==========================================
// 积载计划系统 - 排车顺序引擎
// ==========================================
// 职责: 决定卡车参与积载的先后顺序
// 排序键:
// 1) default_use=true 优先
// 2) departure_time 升序（缺失按 23:59:59 处理）
// 3) 输入顺序（稳定排序）
// ==========================================

use crate::domain::truck::Truck;
use chrono::NaiveTime;
use std::cmp::Ordering;
use std::collections::HashSet;

/// 缺失发车时刻时的默认排序时刻 (23:59:59)
pub fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default()
}

// ==========================================
// TruckOrdering - 排车顺序
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct TruckOrdering {
    fallback_departure_time: NaiveTime,
}

impl TruckOrdering {
    pub fn new(fallback_departure_time: NaiveTime) -> Self {
        Self {
            fallback_departure_time,
        }
    }

    /// 参与排序的发车时刻
    pub fn effective_departure(&self, truck: &Truck) -> NaiveTime {
        truck.departure_time().unwrap_or(self.fallback_departure_time)
    }

    /// 比较两辆卡车的排车先后
    pub fn compare(&self, a: &Truck, b: &Truck) -> Ordering {
        // default_use=true 在前
        b.default_use()
            .cmp(&a.default_use())
            .then_with(|| self.effective_departure(a).cmp(&self.effective_departure(b)))
    }

    /// 排序卡车（同一 truck_id 仅保留首次出现）
    ///
    /// # 返回
    /// 排车顺序的卡车引用列表
    pub fn sort<'a>(&self, trucks: &'a [Truck]) -> Vec<&'a Truck> {
        let mut seen = HashSet::new();
        let mut ordered: Vec<&Truck> = Vec::with_capacity(trucks.len());
        for truck in trucks {
            if seen.insert(truck.id()) {
                ordered.push(truck);
            } else {
                tracing::warn!(truck_id = truck.id(), "重复的卡车ID，已忽略后续记录");
            }
        }

        // sort_by 为稳定排序，平局保持输入顺序
        ordered.sort_by(|a, b| self.compare(a, b));
        ordered
    }
}

impl Default for TruckOrdering {
    fn default() -> Self {
        Self::new(end_of_day())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn truck(id: i64, default_use: bool, departure: Option<NaiveTime>) -> Truck {
        let t = Truck::new(id, format!("T{}", id), 2000, 2000, 2000, 1000.0)
            .unwrap()
            .with_default_use(default_use);
        match departure {
            Some(d) => t.with_departure_time(d),
            None => t,
        }
    }

    fn ids(trucks: &[&Truck]) -> Vec<i64> {
        trucks.iter().map(|t| t.id()).collect()
    }

    #[test]
    fn test_default_use_before_earlier_departure() {
        let trucks = vec![
            truck(1, false, Some(hms(8, 0, 0))),
            truck(2, true, Some(hms(9, 0, 0))),
        ];
        let ordered = TruckOrdering::default().sort(&trucks);
        assert_eq!(ids(&ordered), vec![2, 1]);
    }

    #[test]
    fn test_departure_ascending_within_group() {
        let trucks = vec![
            truck(1, false, Some(hms(15, 0, 0))),
            truck(2, false, Some(hms(7, 30, 0))),
            truck(3, true, Some(hms(12, 0, 0))),
            truck(4, true, Some(hms(6, 0, 0))),
        ];
        let ordered = TruckOrdering::default().sort(&trucks);
        assert_eq!(ids(&ordered), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_missing_departure_sorts_last_and_ties_are_stable() {
        let trucks = vec![
            truck(1, false, None),
            truck(2, false, Some(hms(23, 59, 59))),
            truck(3, false, None),
            truck(4, false, Some(hms(10, 0, 0))),
        ];
        let ordered = TruckOrdering::default().sort(&trucks);
        // 1/2/3 时刻相同（23:59:59），保持输入顺序
        assert_eq!(ids(&ordered), vec![4, 1, 2, 3]);
    }

    #[test]
    fn test_custom_fallback_time() {
        let trucks = vec![
            truck(1, false, Some(hms(10, 0, 0))),
            truck(2, false, None),
        ];
        let ordered = TruckOrdering::new(hms(0, 0, 0)).sort(&trucks);
        assert_eq!(ids(&ordered), vec![2, 1]);
    }

    #[test]
    fn test_duplicate_truck_ids_collapsed() {
        let trucks = vec![
            truck(1, false, Some(hms(10, 0, 0))),
            truck(1, true, Some(hms(5, 0, 0))),
            truck(2, false, Some(hms(9, 0, 0))),
        ];
        let ordered = TruckOrdering::default().sort(&trucks);
        assert_eq!(ids(&ordered), vec![2, 1]);
        assert!(!ordered[1].default_use());
    }
}
