// ==========================================
// 设备预防性维护周排程引擎 - 周排程领域模型
// ==========================================
// 对齐: db.rs weekly_pm_schedule 表
// 不变式: 同一周同一(设备,类别)至多一条 Scheduled 条目
// ==========================================

use crate::domain::types::{IneligibilityReason, PmCategory, ScheduleStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ==========================================
// ScheduleEntry - 周排程条目
// ==========================================
// 引擎的输出单元;再生成只替换 Scheduled,永不触碰 Completed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: Option<i64>,              // 数据库自增主键(未持久化时为 None)
    pub week_start: NaiveDate,        // 目标周的周一
    pub equipment_no: String,         // 设备编号
    pub pm_category: PmCategory,      // PM 类别
    pub assigned_technician: String,  // 分配技师
    pub scheduled_date: NaiveDate,    // 周内工作日(周一至周五)
    pub status: ScheduleStatus,       // 条目状态
    pub run_id: Option<String>,       // 生成本条目的运行ID(可追溯)
    pub created_at: DateTime<Utc>,
}

// ==========================================
// WeeklyScheduleRequest - 单次生成请求
// ==========================================
// 技师排除与优先级清单为请求作用域输入,引擎不持久化
#[derive(Debug, Clone)]
pub struct WeeklyScheduleRequest {
    pub week_start: NaiveDate,              // 目标周标识(必须为周一)
    pub technicians: Vec<String>,           // 技师名册(有序)
    pub excluded_technicians: Vec<String>,  // 本次排除的技师(如休假)
    pub priority_tiers: HashMap<String, u32>, // 设备编号 -> 优先级档(1 最高);缺失走默认档
    pub weekly_target: Option<usize>,       // 本周新建条目上限;None 时取配置默认值
}

impl WeeklyScheduleRequest {
    pub fn new(week_start: NaiveDate, technicians: Vec<String>) -> Self {
        Self {
            week_start,
            technicians,
            excluded_technicians: Vec::new(),
            priority_tiers: HashMap::new(),
            weekly_target: None,
        }
    }

    /// 排除后的可用技师(保持名册顺序)
    pub fn available_technicians(&self) -> Vec<String> {
        self.technicians
            .iter()
            .filter(|t| !self.excluded_technicians.contains(t))
            .cloned()
            .collect()
    }
}

// ==========================================
// CapacityExhausted - 容量耗尽未排项
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityExhausted {
    pub equipment_no: String,
    pub pm_category: PmCategory,
    pub days_overdue: i64,
}

// ==========================================
// RunSummary - 运行摘要
// ==========================================
// 供外部 UI/报表层展示;跳过原因按原因码聚合
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,                     // 本次运行的 UUID
    pub week_start: NaiveDate,              // 目标周
    pub created_total: usize,               // 新建条目总数
    pub created_by_technician: BTreeMap<String, usize>, // 每技师新建数
    pub skipped_by_reason: BTreeMap<IneligibilityReason, usize>, // 每原因码跳过数
    pub capacity_exhausted: Vec<CapacityExhausted>, // 已到期但容量耗尽未排的设备
    pub entries: Vec<ScheduleEntry>,        // 本次新建条目
}
