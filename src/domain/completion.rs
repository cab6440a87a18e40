// ==========================================
// 设备预防性维护周排程引擎 - 完成记录领域模型
// ==========================================
// 对齐: db.rs pm_completion 表
// 红线: 不可变历史事实,只追加,引擎只读
// ==========================================

use crate::domain::types::PmCategory;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// CompletionRecord - PM 完成记录
// ==========================================
// "上次何时做过"的唯一真相来源
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub id: Option<i64>,           // 数据库自增主键(未持久化时为 None)
    pub equipment_no: String,      // 设备编号
    pub pm_category: PmCategory,   // PM 类别
    pub technician: String,        // 完成技师
    pub completion_date: NaiveDate, // 完成日期
    pub labor_minutes: i64,        // 工时(分钟)
    pub notes: Option<String>,     // 备注
    pub created_at: DateTime<Utc>,
}

impl CompletionRecord {
    /// 构造一条待持久化的完成记录
    pub fn new(
        equipment_no: impl Into<String>,
        pm_category: PmCategory,
        technician: impl Into<String>,
        completion_date: NaiveDate,
        labor_minutes: i64,
    ) -> Self {
        Self {
            id: None,
            equipment_no: equipment_no.into(),
            pm_category,
            technician: technician.into(),
            completion_date,
            labor_minutes,
            notes: None,
            created_at: Utc::now(),
        }
    }
}
