// ==========================================
// 积载计划系统 - 运送 API
// ==========================================
// 职责: 主数据维护、积载计划计算、积载校验、运行结果保存
// 说明: 容量超限/卡车缺失以 LoadingCheck 返回，不走错误通道
// ==========================================

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::NaiveTime;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::domain::container::Container;
use crate::domain::item::LoadingItem;
use crate::domain::plan::RunResult;
use crate::domain::transport_rule::{TransportConstraint, TruckContainerRule};
use crate::domain::truck::Truck;
use crate::engine::loading_validator::{LoadingCheck, LoadingValidator};
use crate::engine::plan_report::PlanReport;
use crate::engine::transport_planner::{PlannerConfig, TransportPlanner};
use crate::importer::{DemandCsvImporter, ImportError};
use crate::repository::catalog::{SqliteTransportCatalog, TransportCatalog};
use crate::repository::container_repo::ContainerRepository;
use crate::repository::plan_run_repo::{PlanRunItem, PlanRunSummary, TransportPlanRepository};
use crate::repository::transport_constraint_repo::TransportConstraintRepository;
use crate::repository::truck_repo::TruckRepository;
use crate::repository::truck_rule_repo::TruckContainerRuleRepository;

// ==========================================
// 输入 DTO
// ==========================================

/// 出货需求输入行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryItemInput {
    pub product_id: i64,
    pub container_id: i64,
    pub quantity: u32,
    pub weight_per_unit: f64,
}

impl TryFrom<DeliveryItemInput> for LoadingItem {
    type Error = ApiError;

    fn try_from(input: DeliveryItemInput) -> ApiResult<Self> {
        Ok(LoadingItem::new(
            input.product_id,
            input.container_id,
            input.quantity,
            input.weight_per_unit,
        )?)
    }
}

/// 容器主数据输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerInput {
    pub name: String,
    pub width: u32,
    pub depth: u32,
    pub height: u32,
    pub max_weight: Option<f64>,
    #[serde(default = "default_can_mix")]
    pub can_mix: bool,
}

fn default_can_mix() -> bool {
    true
}

impl ContainerInput {
    fn into_container(self, id: i64) -> ApiResult<Container> {
        if self.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("容器名称不能为空".to_string()));
        }
        Ok(Container::new(
            id,
            self.name,
            self.width,
            self.depth,
            self.height,
            self.max_weight,
        )?
        .with_can_mix(self.can_mix))
    }
}

/// 卡车主数据输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckInput {
    pub name: String,
    pub width: u32,
    pub depth: u32,
    pub height: u32,
    pub max_weight: f64,
    #[serde(default)]
    pub departure_time: Option<NaiveTime>,
    #[serde(default)]
    pub arrival_time: Option<NaiveTime>,
    #[serde(default)]
    pub arrival_day_offset: u32,
    #[serde(default)]
    pub default_use: bool,
}

impl TruckInput {
    fn into_truck(self, id: i64) -> ApiResult<Truck> {
        if self.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("卡车名称不能为空".to_string()));
        }
        let mut truck = Truck::new(
            id,
            self.name,
            self.width,
            self.depth,
            self.height,
            self.max_weight,
        )?
        .with_default_use(self.default_use)
        .with_arrival_parts(self.arrival_time, self.arrival_day_offset)?;

        if let Some(dep) = self.departure_time {
            truck = truck.with_departure_time(dep);
        }
        Ok(truck)
    }
}

/// 搭载规则输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckContainerRuleInput {
    pub truck_id: i64,
    pub container_id: i64,
    #[serde(default)]
    pub max_quantity: Option<u32>,
    #[serde(default)]
    pub priority: i32,
}

impl TruckContainerRuleInput {
    fn into_rule(self, id: i64) -> TruckContainerRule {
        TruckContainerRule {
            id,
            truck_id: self.truck_id,
            container_id: self.container_id,
            max_quantity: self.max_quantity,
            priority: self.priority,
        }
    }
}

/// CSV 计划结果
#[derive(Debug)]
pub struct CsvPlanOutcome {
    pub report: PlanReport,
    pub rejected: Vec<ImportError>, // 被跳过的需求行
    pub run_id: Option<String>,     // save=true 时的运行 id
}

fn to_loading_items(inputs: Vec<DeliveryItemInput>) -> ApiResult<Vec<LoadingItem>> {
    inputs.into_iter().map(LoadingItem::try_from).collect()
}

// ==========================================
// TransportApi - 运送 API
// ==========================================
pub struct TransportApi {
    container_repo: ContainerRepository,
    truck_repo: TruckRepository,
    rule_repo: TruckContainerRuleRepository,
    constraint_repo: TransportConstraintRepository,
    plan_repo: TransportPlanRepository,
    catalog: Box<dyn TransportCatalog + Send + Sync>,
    config_manager: ConfigManager,
}

impl TransportApi {
    /// 打开数据库并建表（幂等）
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从共享连接创建（建表幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", e)))?;
            crate::db::ensure_schema(&guard).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        }

        let config_manager = ConfigManager::from_connection(conn.clone())
            .map_err(|e| ApiError::InternalError(format!("配置管理器初始化失败: {}", e)))?;

        Ok(Self {
            container_repo: ContainerRepository::from_connection(conn.clone()),
            truck_repo: TruckRepository::from_connection(conn.clone()),
            rule_repo: TruckContainerRuleRepository::from_connection(conn.clone()),
            constraint_repo: TransportConstraintRepository::from_connection(conn.clone()),
            plan_repo: TransportPlanRepository::from_connection(conn.clone()),
            catalog: Box::new(SqliteTransportCatalog::from_connection(conn)),
            config_manager,
        })
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    /// 读取配置中的语言并应用
    pub fn apply_configured_locale(&self) -> ApiResult<()> {
        let locale = self
            .config_manager
            .get_locale()
            .map_err(|e| ApiError::InternalError(format!("读取语言配置失败: {}", e)))?;
        crate::i18n::set_locale(&locale);
        Ok(())
    }

    fn planner_config(&self) -> ApiResult<PlannerConfig> {
        self.config_manager
            .planner_config()
            .map_err(|e| ApiError::InternalError(format!("读取计划配置失败: {}", e)))
    }

    // ==========================================
    // 容器主数据
    // ==========================================

    pub fn list_containers(&self) -> ApiResult<Vec<Container>> {
        Ok(self.container_repo.list_all()?)
    }

    /// 新建容器，返回分配的 id
    pub fn create_container(&self, input: ContainerInput) -> ApiResult<i64> {
        let container = input.into_container(0)?;
        let id = self.container_repo.insert(&container)?;
        info!(container_id = id, "容器已创建");
        Ok(id)
    }

    pub fn update_container(&self, id: i64, input: ContainerInput) -> ApiResult<()> {
        let container = input.into_container(id)?;
        self.container_repo.update(&container)?;
        Ok(())
    }

    pub fn delete_container(&self, id: i64) -> ApiResult<()> {
        self.container_repo.delete(id)?;
        Ok(())
    }

    // ==========================================
    // 卡车主数据
    // ==========================================

    pub fn list_trucks(&self) -> ApiResult<Vec<Truck>> {
        Ok(self.truck_repo.list_all()?)
    }

    pub fn create_truck(&self, input: TruckInput) -> ApiResult<i64> {
        let truck = input.into_truck(0)?;
        let id = self.truck_repo.insert(&truck)?;
        info!(truck_id = id, "卡车已创建");
        Ok(id)
    }

    pub fn update_truck(&self, id: i64, input: TruckInput) -> ApiResult<()> {
        let truck = input.into_truck(id)?;
        self.truck_repo.update(&truck)?;
        Ok(())
    }

    pub fn delete_truck(&self, id: i64) -> ApiResult<()> {
        self.truck_repo.delete(id)?;
        Ok(())
    }

    // ==========================================
    // 卡车-容器搭载规则
    // ==========================================

    pub fn list_truck_container_rules(&self) -> ApiResult<Vec<TruckContainerRule>> {
        Ok(self.rule_repo.list_all()?)
    }

    pub fn list_rules_for_truck(&self, truck_id: i64) -> ApiResult<Vec<TruckContainerRule>> {
        Ok(self.rule_repo.list_for_truck(truck_id)?)
    }

    pub fn get_truck_container_rule(&self, id: i64) -> ApiResult<TruckContainerRule> {
        self.rule_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("搭载规则(id={})不存在", id)))
    }

    /// 新建规则，返回分配的 id
    ///
    /// 卡车或容器未登记时返回 BusinessRuleViolation
    pub fn create_truck_container_rule(&self, input: TruckContainerRuleInput) -> ApiResult<i64> {
        let id = self.rule_repo.save(&input.into_rule(0))?;
        info!(rule_id = id, "搭载规则已创建");
        Ok(id)
    }

    pub fn update_truck_container_rule(
        &self,
        id: i64,
        input: TruckContainerRuleInput,
    ) -> ApiResult<()> {
        self.rule_repo.update(&input.into_rule(id))?;
        Ok(())
    }

    pub fn delete_truck_container_rule(&self, id: i64) -> ApiResult<()> {
        self.rule_repo.delete(id)?;
        Ok(())
    }

    // ==========================================
    // 运送制约（单例）
    // ==========================================

    pub fn get_transport_constraint(&self) -> ApiResult<Option<TransportConstraint>> {
        Ok(self.constraint_repo.get()?)
    }

    /// 保存运送制约（替换已有设置），返回新 id
    pub fn save_transport_constraint(&self, constraint: &TransportConstraint) -> ApiResult<i64> {
        Ok(self.constraint_repo.save(constraint)?)
    }

    pub fn update_transport_constraint(&self, constraint: &TransportConstraint) -> ApiResult<()> {
        self.constraint_repo.update(constraint)?;
        Ok(())
    }

    // ==========================================
    // 计划 / 校验
    // ==========================================

    /// 计算积载计划（基于当前登记的容器与卡车）
    #[instrument(skip(self, inputs), fields(items_count = inputs.len()))]
    pub fn calculate_delivery_plan(&self, inputs: Vec<DeliveryItemInput>) -> ApiResult<RunResult> {
        let items = to_loading_items(inputs)?;
        self.calculate_for_items(&items)
    }

    /// 计算积载计划（已校验的需求行）
    pub fn calculate_for_items(&self, items: &[LoadingItem]) -> ApiResult<RunResult> {
        let containers = self.catalog.list_containers()?;
        let trucks = self.catalog.list_trucks()?;
        let planner = TransportPlanner::with_config(self.planner_config()?);

        let run = planner.plan(items, &containers, &trucks);
        debug!(
            trips = run.total_trips,
            remaining = run.remaining_items.len(),
            "积载计划计算完成"
        );
        Ok(run)
    }

    /// 校验需求能否装入指定卡车
    ///
    /// 卡车不存在时返回 feasible=false + TRUCK_NOT_FOUND
    #[instrument(skip(self, inputs), fields(items_count = inputs.len()))]
    pub fn validate_loading(
        &self,
        inputs: Vec<DeliveryItemInput>,
        truck_id: i64,
    ) -> ApiResult<LoadingCheck> {
        let items = to_loading_items(inputs)?;
        let containers = self.catalog.list_containers()?;
        let trucks = self.catalog.list_trucks()?;
        let validator = LoadingValidator::with_epsilon(self.planner_config()?.capacity_epsilon);

        Ok(validator.validate_for_truck_id(&items, &containers, &trucks, truck_id))
    }

    // ==========================================
    // 结果
    // ==========================================

    pub fn save_plan_run(&self, run: &RunResult) -> ApiResult<String> {
        Ok(self.plan_repo.save_run(run)?)
    }

    /// 查询已保存运行（汇总 + 明细）
    pub fn get_plan_run(&self, run_id: &str) -> ApiResult<(PlanRunSummary, Vec<PlanRunItem>)> {
        let summary = self
            .plan_repo
            .find_run_summary(run_id)?
            .ok_or_else(|| ApiError::NotFound(format!("计划运行(run_id={})不存在", run_id)))?;
        let items = self.plan_repo.list_run_items(run_id)?;
        Ok((summary, items))
    }

    pub fn build_report(&self, run: &RunResult) -> PlanReport {
        PlanReport::from_run(run)
    }

    /// 导入需求 CSV → 计算 →（可选）保存 → 报表
    ///
    /// 坏行不中断计算，随结果返回
    #[instrument(skip_all, fields(path = %path.display(), save))]
    pub fn plan_from_csv(&self, path: &Path, save: bool) -> ApiResult<CsvPlanOutcome> {
        let demand = DemandCsvImporter::new().import_from_path(path)?;
        let run = self.calculate_for_items(&demand.items)?;

        let run_id = if save {
            let run_id = self.save_plan_run(&run)?;
            info!(run_id = %run_id, "计划运行已保存");
            Some(run_id)
        } else {
            None
        };

        Ok(CsvPlanOutcome {
            report: self.build_report(&run),
            rejected: demand.rejected,
            run_id,
        })
    }
}
