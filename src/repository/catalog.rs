// ==========================================
// 积载计划系统 - 主数据目录
// ==========================================
// 职责: 为计划/校验提供容器与卡车的只读视图
// ==========================================

use crate::domain::container::Container;
use crate::domain::truck::Truck;
use crate::repository::container_repo::ContainerRepository;
use crate::repository::error::RepositoryResult;
use crate::repository::truck_repo::TruckRepository;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 主数据读取接口
pub trait TransportCatalog {
    fn list_containers(&self) -> RepositoryResult<Vec<Container>>;

    fn list_trucks(&self) -> RepositoryResult<Vec<Truck>>;
}

/// 基于 SQLite 的主数据目录
pub struct SqliteTransportCatalog {
    container_repo: ContainerRepository,
    truck_repo: TruckRepository,
}

impl SqliteTransportCatalog {
    pub fn new(container_repo: ContainerRepository, truck_repo: TruckRepository) -> Self {
        Self {
            container_repo,
            truck_repo,
        }
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self::new(
            ContainerRepository::from_connection(conn.clone()),
            TruckRepository::from_connection(conn),
        )
    }
}

impl TransportCatalog for SqliteTransportCatalog {
    fn list_containers(&self) -> RepositoryResult<Vec<Container>> {
        self.container_repo.list_all()
    }

    fn list_trucks(&self) -> RepositoryResult<Vec<Truck>> {
        self.truck_repo.list_all()
    }
}
