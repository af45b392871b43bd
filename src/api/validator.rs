// ==========================================
// 粮食接收系统 - 输入校验器
// ==========================================
// 职责: 把表单原始输入解析为类型化字段
// 红线: 任何解析失败都以 ValidationError 返回,不落库
// ==========================================

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::operation::normalize_plate;

/// 车牌最短长度 (含空格)
pub const MIN_PLATE_LEN: usize = 6;

// 允许的车牌形态: A=字母 9=数字,组间最多一个空格
const PLATE_SHAPES: [&str; 6] = [
    "AAA999", "AAA 999", "AA999AA", "AA 999AA", "AA999 AA", "AA 999 AA",
];

/// 必填文本字段
pub fn require_non_empty(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::ValidationError(format!("{}不能为空", field)));
    }
    Ok(trimmed.to_string())
}

/// 校验并规范化车牌
///
/// # 参数
/// - raw: 原始输入
/// - enforce_format: 是否校验车牌形态 (关闭时只做非空与长度检查)
///
/// # 返回
/// - Ok(String): 大写、去首尾空白后的车牌
pub fn validate_plate(raw: &str, enforce_format: bool) -> ApiResult<String> {
    let plate = normalize_plate(&require_non_empty("车牌", raw)?);

    if plate.chars().count() < MIN_PLATE_LEN {
        return Err(ApiError::ValidationError(format!(
            "车牌长度不足: {} (至少{}个字符)",
            plate, MIN_PLATE_LEN
        )));
    }

    if enforce_format && !PLATE_SHAPES.contains(&plate_shape(&plate).as_str()) {
        return Err(ApiError::ValidationError(format!(
            "车牌格式无效: {} (应为 AAA999 或 AA999AA)",
            plate
        )));
    }

    Ok(plate)
}

fn plate_shape(plate: &str) -> String {
    plate
        .chars()
        .map(|c| match c {
            'A'..='Z' => 'A',
            '0'..='9' => '9',
            ' ' => ' ',
            _ => '?',
        })
        .collect()
}

/// 解析 ISO 日期 (YYYY-MM-DD)
pub fn parse_iso_date(field: &str, raw: &str) -> ApiResult<NaiveDate> {
    let value = require_non_empty(field, raw)?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|e| {
        ApiError::ValidationError(format!("{}日期格式无效: {} ({})", field, value, e))
    })
}

/// 解析整数公斤数
///
/// 范围校验由称重规则完成,这里只保证是整数
pub fn parse_weight(field: &str, raw: &str) -> ApiResult<i64> {
    let value = require_non_empty(field, raw)?;
    value
        .parse::<i64>()
        .map_err(|_| ApiError::ValidationError(format!("{}必须是整数公斤数: {}", field, value)))
}

/// 解析质检测量值
///
/// # 返回
/// - Ok(HashMap): 参数代码 → 测量值
/// - Err: 存在空值或非数值
pub fn parse_measurements(raw: &HashMap<String, String>) -> ApiResult<HashMap<String, f64>> {
    let mut parsed = HashMap::with_capacity(raw.len());
    for (code, value) in raw {
        let text = require_non_empty(&format!("测量值[{}]", code), value)?;
        let number = text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                ApiError::ValidationError(format!("测量值[{}]不是有效数值: {}", code, text))
            })?;
        parsed.insert(code.trim().to_string(), number);
    }
    Ok(parsed)
}

/// 阈值区间校验 (min ≤ max,均为有限数)
pub fn validate_threshold_range(min: f64, max: f64) -> ApiResult<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(ApiError::ValidationError("阈值必须是有效数值".to_string()));
    }
    if min > max {
        return Err(ApiError::ValidationError(format!(
            "阈值下限不能大于上限: min={}, max={}",
            min, max
        )));
    }
    Ok(())
}

/// 筒仓库存校验 (0 ≤ current_stock ≤ capacity)
pub fn validate_silo_stock(current_stock: i64, capacity: i64) -> ApiResult<()> {
    if current_stock < 0 {
        return Err(ApiError::ValidationError(format!(
            "库存不能为负: {}kg",
            current_stock
        )));
    }
    if capacity < current_stock {
        return Err(ApiError::ValidationError(format!(
            "容量不能小于当前库存: capacity={}kg, stock={}kg",
            capacity, current_stock
        )));
    }
    Ok(())
}
