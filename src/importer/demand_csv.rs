// ==========================================
// 积载计划系统 - 出货需求 CSV 导入
// ==========================================
// 列: product_id, container_id, quantity, weight_per_unit
// 规则: 坏行收集到 rejected，不中断整个文件
// ==========================================

use crate::domain::item::LoadingItem;
use crate::importer::error::{ImportError, ImportResult};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

const COL_PRODUCT_ID: &str = "product_id";
const COL_CONTAINER_ID: &str = "container_id";
const COL_QUANTITY: &str = "quantity";
const COL_WEIGHT_PER_UNIT: &str = "weight_per_unit";

/// 导入结果
#[derive(Debug, Default)]
pub struct DemandImport {
    pub items: Vec<LoadingItem>,     // 合法需求行（保持文件顺序）
    pub rejected: Vec<ImportError>,  // 行级错误
}

impl DemandImport {
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

// 必需列在表头中的位置
struct ColumnIndex {
    product_id: usize,
    container_id: usize,
    quantity: usize,
    weight_per_unit: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> ImportResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}') == name)
                .ok_or_else(|| ImportError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            product_id: find(COL_PRODUCT_ID)?,
            container_id: find(COL_CONTAINER_ID)?,
            quantity: find(COL_QUANTITY)?,
            weight_per_unit: find(COL_WEIGHT_PER_UNIT)?,
        })
    }
}

// ==========================================
// DemandCsvImporter
// ==========================================
pub struct DemandCsvImporter;

impl DemandCsvImporter {
    pub fn new() -> Self {
        Self
    }

    /// 从文件导入
    ///
    /// # 返回
    /// - Err(FileNotFound / UnsupportedFormat): 文件层面错误
    /// - Ok(DemandImport): 行级错误在 rejected 中
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn import_from_path(&self, path: &Path) -> ImportResult<DemandImport> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(path)?;
        self.import_from_reader(file)
    }

    /// 从任意 Reader 导入
    pub fn import_from_reader<R: Read>(&self, reader: R) -> ImportResult<DemandImport> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致，缺列按行报错
            .from_reader(reader);

        let columns = ColumnIndex::from_headers(reader.headers()?)?;

        let mut result = DemandImport::default();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let row = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);

            // 跳过完全空白的行
            if record.iter().all(|v| v.trim().is_empty()) {
                continue;
            }

            match parse_row(&record, &columns, row) {
                Ok(item) => result.items.push(item),
                Err(err) => {
                    tracing::warn!(row, error = %err, "需求行被拒绝");
                    result.rejected.push(err);
                }
            }
        }

        tracing::info!(
            accepted = result.items.len(),
            rejected = result.rejected.len(),
            "需求导入完成"
        );
        Ok(result)
    }
}

impl Default for DemandCsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_row(record: &StringRecord, columns: &ColumnIndex, row: usize) -> ImportResult<LoadingItem> {
    let product_id: i64 = parse_field(record, columns.product_id, COL_PRODUCT_ID, row)?;
    let container_id: i64 = parse_field(record, columns.container_id, COL_CONTAINER_ID, row)?;
    let quantity: u32 = parse_field(record, columns.quantity, COL_QUANTITY, row)?;
    let weight: f64 = parse_field(record, columns.weight_per_unit, COL_WEIGHT_PER_UNIT, row)?;

    LoadingItem::new(product_id, container_id, quantity, weight).map_err(|e| {
        ImportError::InvalidValue {
            row,
            message: e.to_string(),
        }
    })
}

fn parse_field<T>(record: &StringRecord, col: usize, field: &str, row: usize) -> ImportResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = record.get(col).map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Err(ImportError::FieldMissing {
            row,
            field: field.to_string(),
        });
    }

    raw.parse::<T>().map_err(|e| ImportError::TypeConversionError {
        row,
        field: field.to_string(),
        message: format!("'{}': {}", raw, e),
    })
}
