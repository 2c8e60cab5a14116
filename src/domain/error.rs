// ==========================================
// 积载计划系统 - 领域层错误类型
// ==========================================
// 职责: 值对象构造期校验失败
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 领域值校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("尺寸无效 ({entity}.{field}={value}): 必须大于 0")]
    NonPositiveDimension {
        entity: &'static str,
        field: &'static str,
        value: u32,
    },

    #[error("数值无效 ({entity}.{field}={value}): 必须为非负有限数")]
    InvalidNumber {
        entity: &'static str,
        field: &'static str,
        value: f64,
    },

    #[error("字段组合无效 ({entity}.{field}): {reason}")]
    InconsistentField {
        entity: &'static str,
        field: &'static str,
        reason: &'static str,
    },
}

/// Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

/// 校验非负有限数
pub(crate) fn ensure_non_negative(
    entity: &'static str,
    field: &'static str,
    value: f64,
) -> DomainResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DomainError::InvalidNumber {
            entity,
            field,
            value,
        })
    }
}

/// 校验正尺寸（mm）
pub(crate) fn ensure_positive_dimension(
    entity: &'static str,
    field: &'static str,
    value: u32,
) -> DomainResult<u32> {
    if value > 0 {
        Ok(value)
    } else {
        Err(DomainError::NonPositiveDimension {
            entity,
            field,
            value,
        })
    }
}
