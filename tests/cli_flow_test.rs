// ==========================================
// 命令行流程集成测试
// ==========================================
// 测试目标: 需求 CSV → TransportApi::plan_from_csv → 报表 JSON
// ==========================================

mod test_helpers;

use freight_loading_planner::api::{ContainerInput, TransportApi, TruckInput};
use freight_loading_planner::importer::ImportError;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn cube(name: &str, edge_mm: u32) -> ContainerInput {
    ContainerInput {
        name: name.to_string(),
        width: edge_mm,
        depth: edge_mm,
        height: edge_mm,
        max_weight: None,
        can_mix: true,
    }
}

fn setup_api() -> (tempfile::NamedTempFile, TransportApi) {
    let (temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let api = TransportApi::new(&db_path).unwrap();
    api.apply_configured_locale().unwrap();

    // 新库自增 id: 容器 1 / 2，与样例文件中的 container_id 对应
    assert_eq!(api.create_container(cube("小箱", 500)).unwrap(), 1);
    assert_eq!(api.create_container(cube("薄箱", 400)).unwrap(), 2);
    api.create_truck(TruckInput {
        name: "2t便".to_string(),
        width: 2000,
        depth: 2000,
        height: 2000,
        max_weight: 1000.0,
        departure_time: None,
        arrival_time: None,
        arrival_day_offset: 0,
        default_use: true,
    })
    .unwrap();

    (temp_file, api)
}

#[test]
fn test_plan_from_sample_csv() {
    println!("\n=== 测试：样例需求文件生成报表 ===");
    let (_tmp, api) = setup_api();

    let outcome = api
        .plan_from_csv(&fixture("demand_sample.csv"), false)
        .unwrap();
    assert!(outcome.run_id.is_none());
    assert_eq!(outcome.rejected.len(), 2);
    assert!(matches!(
        outcome.rejected[0],
        ImportError::TypeConversionError { row: 4, .. }
    ));

    let report = &outcome.report;
    assert_eq!(report.total_trips, 1);
    assert!(report.fully_allocated);
    assert_eq!(report.placed_item_count, 3);
    // 50 + 40 + 25
    assert_eq!(report.total_weight_kg, 115.0);
    // 10×0.125 + 5×0.064 + 2×0.125
    assert!((report.total_volume_m3 - 1.82).abs() < 1e-9);

    let json: serde_json::Value =
        serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["total_trips"], 1);
    assert_eq!(json["fully_allocated"], true);
    assert_eq!(json["trucks"][0]["truck_name"], "2t便");

    println!("=== 测试通过 ===\n");
}

#[test]
fn test_plan_from_csv_with_save() {
    let (_tmp, api) = setup_api();

    let outcome = api
        .plan_from_csv(&fixture("demand_sample.csv"), true)
        .unwrap();
    let run_id = outcome.run_id.unwrap();

    let (summary, items) = api.get_plan_run(&run_id).unwrap();
    assert_eq!(summary.total_trips, 1);
    let products: Vec<i64> = items.iter().map(|i| i.product_id).collect();
    assert_eq!(products, vec![1001, 1002, 1004]);
}

#[test]
fn test_plan_from_missing_csv_is_import_error() {
    let (_tmp, api) = setup_api();
    let err = api
        .plan_from_csv(&fixture("no_such_demand.csv"), false)
        .unwrap_err();
    assert!(matches!(
        err,
        freight_loading_planner::ApiError::ImportError(_)
    ));
}
