// ==========================================
// 出货需求 CSV 导入集成测试
// ==========================================

use freight_loading_planner::importer::{DemandCsvImporter, ImportError};
use std::io::Write;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_import_fixture_with_rejected_rows() {
    println!("\n=== 测试：导入含坏行的需求文件 ===");

    let result = DemandCsvImporter::new()
        .import_from_path(&fixture("demand_sample.csv"))
        .unwrap();

    let ids: Vec<i64> = result.items.iter().map(|i| i.product_id()).collect();
    assert_eq!(ids, vec![1001, 1002, 1004]);
    assert_eq!(result.items[2].unit_weight_kg(), 12.5);

    assert_eq!(result.rejected_count(), 2);
    assert!(matches!(
        result.rejected[0],
        ImportError::TypeConversionError { row: 4, ref field, .. } if field == "quantity"
    ));
    assert!(matches!(
        result.rejected[1],
        ImportError::FieldMissing { row: 7, ref field } if field == "weight_per_unit"
    ));

    println!("=== 测试通过 ===\n");
}

#[test]
fn test_missing_file() {
    let err = DemandCsvImporter::new()
        .import_from_path(&fixture("does_not_exist.csv"))
        .unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));
}

#[test]
fn test_wrong_extension() {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    writeln!(file, "product_id,container_id,quantity,weight_per_unit").unwrap();

    let err = DemandCsvImporter::new()
        .import_from_path(file.path())
        .unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFormat(ref ext) if ext == "txt"));
}

#[test]
fn test_header_only_file_is_empty_import() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "product_id,container_id,quantity,weight_per_unit").unwrap();
    file.flush().unwrap();

    let result = DemandCsvImporter::new()
        .import_from_path(file.path())
        .unwrap();
    assert!(result.items.is_empty());
    assert!(result.rejected.is_empty());
}
