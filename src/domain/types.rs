// ==========================================
// 设备预防性维护周排程引擎 - 领域类型定义
// ==========================================
// 红线: PM 类别为封闭枚举,周期常量不可配置
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// PM 类别 (PM Category)
// ==========================================
// 每个类别携带固定的名义周期与最小重复间隔
// 最小重复间隔刻意短于名义周期,容忍提前完成而不误报重复
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PmCategory {
    Monthly,  // 月度保养
    SixMonth, // 半年保养
    Annual,   // 年度保养
}

impl PmCategory {
    /// 全部类别,按排程评估顺序排列
    ///
    /// 年度在前: 本周已有年度任务会压制同设备的月度/半年任务(单向规则)
    pub const ALL: [PmCategory; 3] = [PmCategory::Annual, PmCategory::SixMonth, PmCategory::Monthly];

    /// 名义周期(天)
    pub fn nominal_interval_days(self) -> i64 {
        match self {
            PmCategory::Monthly => 30,
            PmCategory::SixMonth => 180,
            PmCategory::Annual => 365,
        }
    }

    /// 最小重复间隔(天),用于重复完成检测
    pub fn min_recurrence_days(self) -> i64 {
        match self {
            PmCategory::Monthly => 25,
            PmCategory::SixMonth => 150,
            PmCategory::Annual => 300,
        }
    }

    /// 数据库存储格式
    pub fn as_str(self) -> &'static str {
        match self {
            PmCategory::Monthly => "MONTHLY",
            PmCategory::SixMonth => "SIX_MONTH",
            PmCategory::Annual => "ANNUAL",
        }
    }
}

impl fmt::Display for PmCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PmCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MONTHLY" => Ok(PmCategory::Monthly),
            "SIX_MONTH" => Ok(PmCategory::SixMonth),
            "ANNUAL" => Ok(PmCategory::Annual),
            other => Err(format!("未知 PM 类别: {}", other)),
        }
    }
}

// ==========================================
// 设备状态 (Equipment Status)
// ==========================================
// 非 ACTIVE 状态的设备一律不参与排程
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    Active,       // 在用
    Missing,      // 失踪
    RunToFailure, // 运行至故障(不做预防性维护)
    CannotFind,   // 无法定位
    Inactive,     // 停用
}

impl EquipmentStatus {
    /// 是否允许进入排程
    pub fn is_schedulable(self) -> bool {
        matches!(self, EquipmentStatus::Active)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EquipmentStatus::Active => "ACTIVE",
            EquipmentStatus::Missing => "MISSING",
            EquipmentStatus::RunToFailure => "RUN_TO_FAILURE",
            EquipmentStatus::CannotFind => "CANNOT_FIND",
            EquipmentStatus::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(EquipmentStatus::Active),
            "MISSING" => Ok(EquipmentStatus::Missing),
            "RUN_TO_FAILURE" => Ok(EquipmentStatus::RunToFailure),
            "CANNOT_FIND" => Ok(EquipmentStatus::CannotFind),
            "INACTIVE" => Ok(EquipmentStatus::Inactive),
            other => Err(format!("未知设备状态: {}", other)),
        }
    }
}

// ==========================================
// 排程条目状态 (Schedule Status)
// ==========================================
// 红线: Completed 记录永不被再生成覆盖
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Scheduled, // 已排程,待执行
    Completed, // 已完成
}

impl ScheduleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "SCHEDULED",
            ScheduleStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScheduleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" => Ok(ScheduleStatus::Scheduled),
            "COMPLETED" => Ok(ScheduleStatus::Completed),
            other => Err(format!("未知排程状态: {}", other)),
        }
    }
}

// ==========================================
// 不合格原因 (Ineligibility Reason)
// ==========================================
// 不合格是高频的正常结果,不是错误;原因码聚合进运行摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IneligibilityReason {
    NotApplicable,         // 设备不适用该 PM 类别
    ExcludedStatus,        // 设备状态被排除(失踪/运行至故障/无法定位/停用)
    RecentlyCompleted,     // 最小重复间隔内已完成
    AlreadyPending,        // 已有未完成的排程条目
    CrossCategoryConflict, // 本周年度任务压制月度/半年任务
    NotYetDue,             // 未到期(超出前瞻窗口)
}

impl IneligibilityReason {
    pub fn as_str(self) -> &'static str {
        match self {
            IneligibilityReason::NotApplicable => "NOT_APPLICABLE",
            IneligibilityReason::ExcludedStatus => "EXCLUDED_STATUS",
            IneligibilityReason::RecentlyCompleted => "RECENTLY_COMPLETED",
            IneligibilityReason::AlreadyPending => "ALREADY_PENDING",
            IneligibilityReason::CrossCategoryConflict => "CROSS_CATEGORY_CONFLICT",
            IneligibilityReason::NotYetDue => "NOT_YET_DUE",
        }
    }
}

impl fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_intervals() {
        assert_eq!(PmCategory::Monthly.nominal_interval_days(), 30);
        assert_eq!(PmCategory::SixMonth.nominal_interval_days(), 180);
        assert_eq!(PmCategory::Annual.nominal_interval_days(), 365);

        // 最小重复间隔必须短于名义周期
        for cat in PmCategory::ALL {
            assert!(cat.min_recurrence_days() < cat.nominal_interval_days());
        }
    }

    #[test]
    fn test_category_roundtrip() {
        for cat in PmCategory::ALL {
            assert_eq!(cat.as_str().parse::<PmCategory>().unwrap(), cat);
        }
    }

    #[test]
    fn test_schedulable_status() {
        assert!(EquipmentStatus::Active.is_schedulable());
        assert!(!EquipmentStatus::Missing.is_schedulable());
        assert!(!EquipmentStatus::RunToFailure.is_schedulable());
        assert!(!EquipmentStatus::CannotFind.is_schedulable());
    }
}
