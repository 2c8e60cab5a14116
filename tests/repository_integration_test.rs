// ==========================================
// 仓储层集成测试
// ==========================================
// 测试目标: 临时 SQLite 文件上的主数据/计划运行存取
// ==========================================

mod test_helpers;

use chrono::NaiveTime;
use freight_loading_planner::domain::{
    Container, LoadingItem, TransportConstraint, Truck, TruckContainerRule,
};
use freight_loading_planner::engine::TransportPlanner;
use freight_loading_planner::repository::{
    ContainerRepository, RepositoryError, SqliteTransportCatalog, TransportCatalog,
    TransportConstraintRepository, TransportPlanRepository, TruckContainerRuleRepository,
    TruckRepository,
};

#[test]
fn test_catalog_reads_what_repositories_wrote() {
    println!("\n=== 测试：主数据目录读取 ===");
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::open_shared_conn(&db_path).unwrap();

    let container_repo = ContainerRepository::from_connection(conn.clone());
    let truck_repo = TruckRepository::from_connection(conn.clone());

    container_repo
        .insert(&Container::new(7, "折りたたみ", 600, 400, 300, Some(25.0)).unwrap())
        .unwrap();
    truck_repo
        .insert(
            &Truck::new(3, "2t車", 1700, 3100, 1800, 2000.0)
                .unwrap()
                .with_departure_time(NaiveTime::from_hms_opt(14, 15, 0).unwrap())
                .with_default_use(true),
        )
        .unwrap();

    let catalog = SqliteTransportCatalog::from_connection(conn);
    let containers = catalog.list_containers().unwrap();
    let trucks = catalog.list_trucks().unwrap();

    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].id(), 7);
    assert_eq!(containers[0].max_weight_kg(), Some(25.0));
    assert_eq!(trucks.len(), 1);
    assert_eq!(trucks[0].id(), 3);
    assert_eq!(trucks[0].departure_time(), NaiveTime::from_hms_opt(14, 15, 0));
    assert!(trucks[0].default_use());
}

#[test]
fn test_repositories_opened_by_path() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();

    let writer = TruckRepository::new(&db_path).unwrap();
    let id = writer
        .insert(&Truck::new(0, "夜便", 2000, 2000, 2000, 800.0).unwrap())
        .unwrap();

    let reader = TruckRepository::new(&db_path).unwrap();
    let truck = reader.find_by_id(id).unwrap().unwrap();
    assert_eq!(truck.name(), "夜便");
    assert_eq!(truck.departure_time(), None);

    let updated = Truck::new(id, "夜便", 2000, 2000, 2000, 900.0)
        .unwrap()
        .with_departure_time(NaiveTime::from_hms_opt(22, 0, 0).unwrap());
    writer.update(&updated).unwrap();
    assert_eq!(reader.find_by_id(id).unwrap().unwrap().max_weight_kg(), 900.0);

    writer.delete(id).unwrap();
    assert!(reader.find_by_id(id).unwrap().is_none());
    assert!(matches!(
        writer.delete(id).unwrap_err(),
        RepositoryError::NotFound { .. }
    ));
}

#[test]
fn test_save_run_round_trip() {
    println!("\n=== 测试：计划运行保存 ===");
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let repo = TransportPlanRepository::new(&db_path).unwrap();

    let containers = vec![Container::new(1, "C1", 1000, 1000, 1000, None).unwrap()];
    let trucks = vec![
        Truck::new(1, "T1", 1000, 1000, 2000, 500.0).unwrap(),
        Truck::new(2, "T2", 1000, 1000, 1000, 500.0).unwrap(),
    ];
    let items = vec![
        LoadingItem::new(1, 1, 1, 10.0).unwrap(),
        LoadingItem::new(2, 1, 1, 20.0).unwrap(),
        LoadingItem::new(3, 1, 1, 30.0).unwrap(),
    ];
    let run = TransportPlanner::new().plan(&items, &containers, &trucks);
    assert_eq!(run.total_trips, 2);

    let run_id = repo.save_run(&run).unwrap();
    assert_eq!(run_id.len(), 36);

    let summary = repo.find_run_summary(&run_id).unwrap().unwrap();
    assert_eq!(summary.total_trips, 2);
    assert_eq!(summary.efficiency, run.efficiency);
    assert_eq!(summary.remaining_count, 0);

    let rows = repo.list_run_items(&run_id).unwrap();
    let layout: Vec<(u32, u32, i64, i64)> = rows
        .iter()
        .map(|r| (r.trip_no, r.seq_no, r.truck_id, r.product_id))
        .collect();
    assert_eq!(layout, vec![(1, 1, 1, 1), (1, 2, 1, 2), (2, 1, 2, 3)]);

    let restored = repo.load_run_result(&run_id).unwrap().unwrap();
    assert_eq!(restored, run);

    assert!(repo.find_run_summary("missing").unwrap().is_none());
    assert!(repo.list_run_items("missing").unwrap().is_empty());
}

#[test]
fn test_save_run_preserves_fractional_values() {
    println!("\n=== 测试：计划运行保存后数值不变 ===");
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let repo = TransportPlanRepository::new(&db_path).unwrap();

    let containers = vec![
        Container::new(1, "C1", 333, 417, 251, Some(12.7)).unwrap(),
        Container::new(2, "C2", 587, 389, 173, None).unwrap(),
    ];
    let trucks = vec![
        Truck::new(1, "T1", 2437, 6123, 2311, 300.5).unwrap(),
        Truck::new(2, "T2", 2437, 6123, 2311, 4321.7).unwrap(),
    ];
    let items: Vec<LoadingItem> = (0..30)
        .map(|i| LoadingItem::new(i, 1 + i % 2, 1 + (i % 3) as u32, 0.1 + i as f64 * 1.37).unwrap())
        .collect();

    let run = TransportPlanner::new().plan(&items, &containers, &trucks);
    assert_eq!(run.total_trips, 2);

    let run_id = repo.save_run(&run).unwrap();
    let restored = repo.load_run_result(&run_id).unwrap().unwrap();
    assert_eq!(restored, run);
    assert_eq!(restored.efficiency.to_bits(), run.efficiency.to_bits());

    let saved_weights: Vec<f64> = repo
        .list_run_items(&run_id)
        .unwrap()
        .iter()
        .map(|r| r.unit_weight_kg)
        .collect();
    let planned_weights: Vec<f64> = run.placed_items().map(|i| i.unit_weight_kg()).collect();
    assert_eq!(saved_weights, planned_weights);
}

#[test]
fn test_each_save_gets_new_run_id() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let repo = TransportPlanRepository::new(&db_path).unwrap();
    let run = TransportPlanner::new().plan(&[], &[], &[]);

    let a = repo.save_run(&run).unwrap();
    let b = repo.save_run(&run).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_truck_container_rules_round_trip() {
    println!("\n=== 测试：搭载规则存取 ===");
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::open_shared_conn(&db_path).unwrap();

    let container_repo = ContainerRepository::from_connection(conn.clone());
    let truck_repo = TruckRepository::from_connection(conn.clone());
    let rule_repo = TruckContainerRuleRepository::from_connection(conn);

    let shared = container_repo
        .insert(&Container::new(0, "通い箱", 600, 400, 300, None).unwrap())
        .unwrap();
    let dedicated = container_repo
        .insert(
            &Container::new(0, "冷蔵箱", 500, 350, 300, Some(20.0))
                .unwrap()
                .with_can_mix(false),
        )
        .unwrap();
    let t1 = truck_repo
        .insert(&Truck::new(0, "朝便", 2000, 4000, 2000, 2000.0).unwrap())
        .unwrap();
    let t2 = truck_repo
        .insert(&Truck::new(0, "夕便", 2000, 4000, 2000, 2000.0).unwrap())
        .unwrap();

    let mut rules = vec![
        TruckContainerRule::new(t2, shared).with_priority(1),
        TruckContainerRule::new(t1, dedicated).with_max_quantity(6).with_priority(2),
        TruckContainerRule::new(t1, shared).with_max_quantity(40),
    ];
    for rule in &mut rules {
        rule.id = rule_repo.save(rule).unwrap();
    }

    // truck_id, priority 升序
    let expected = vec![rules[2].clone(), rules[1].clone(), rules[0].clone()];
    assert_eq!(rule_repo.list_all().unwrap(), expected);

    // 另开连接读取
    let reader = TruckContainerRuleRepository::new(&db_path).unwrap();
    assert_eq!(reader.find_by_id(rules[1].id).unwrap(), Some(rules[1].clone()));
    assert!(!ContainerRepository::new(&db_path)
        .unwrap()
        .find_by_id(dedicated)
        .unwrap()
        .unwrap()
        .can_mix());

    // 卡车删除时规则级联删除
    truck_repo.delete(t1).unwrap();
    assert_eq!(reader.list_all().unwrap(), vec![rules[0].clone()]);
}

#[test]
fn test_transport_constraint_round_trip() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let writer = TransportConstraintRepository::new(&db_path).unwrap();
    let reader = TransportConstraintRepository::new(&db_path).unwrap();

    assert_eq!(reader.get().unwrap(), None);

    let constraint = TransportConstraint {
        id: 0,
        product_id: Some(1002),
        container_id: Some(2),
        max_quantity: Some(18),
    };
    let id = writer.save(&constraint).unwrap();
    assert_eq!(
        reader.get().unwrap(),
        Some(TransportConstraint { id, ..constraint.clone() })
    );

    let replacement = TransportConstraint {
        max_quantity: None,
        ..constraint
    };
    let new_id = writer.save(&replacement).unwrap();
    assert_ne!(new_id, id);
    assert_eq!(reader.get().unwrap().unwrap().max_quantity, None);
}
