// ==========================================
// 设备预防性维护周排程引擎 - 设备领域模型
// ==========================================
// 对齐: db.rs equipment 表
// 用途: 设备管理 CRUD 写入(外部协作方),引擎层只读
// 红线: 引擎不直接改设备记录,日期滚动仅经由完成服务
// ==========================================

use crate::domain::types::{EquipmentStatus, PmCategory};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// EquipmentRecord - 设备主数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentRecord {
    // ===== 主键 =====
    pub equipment_no: String, // 设备唯一编号

    // ===== 基础信息 =====
    pub description: String,        // 设备描述
    pub location: Option<String>,   // 安装位置
    pub status: EquipmentStatus,    // 设备状态

    // ===== PM 类别适用标志 =====
    pub monthly_pm: bool,   // 适用月度保养
    pub six_month_pm: bool, // 适用半年保养
    pub annual_pm: bool,    // 适用年度保养

    // ===== PM 日期 =====
    pub last_monthly_pm: Option<NaiveDate>,   // 上次月度完成日期
    pub last_six_month_pm: Option<NaiveDate>, // 上次半年完成日期
    pub last_annual_pm: Option<NaiveDate>,    // 上次年度完成日期
    pub next_monthly_pm: Option<NaiveDate>,   // 下次月度到期日期
    pub next_six_month_pm: Option<NaiveDate>, // 下次半年到期日期
    pub next_annual_pm: Option<NaiveDate>,    // 下次年度到期日期

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EquipmentRecord {
    /// 该 PM 类别是否适用于本设备
    pub fn applies(&self, category: PmCategory) -> bool {
        match category {
            PmCategory::Monthly => self.monthly_pm,
            PmCategory::SixMonth => self.six_month_pm,
            PmCategory::Annual => self.annual_pm,
        }
    }

    /// 设备表记载的上次完成日期(完成历史缺失时的回退口径)
    pub fn last_completed(&self, category: PmCategory) -> Option<NaiveDate> {
        match category {
            PmCategory::Monthly => self.last_monthly_pm,
            PmCategory::SixMonth => self.last_six_month_pm,
            PmCategory::Annual => self.last_annual_pm,
        }
    }

    /// 设备表记载的下次到期日期
    pub fn next_due(&self, category: PmCategory) -> Option<NaiveDate> {
        match category {
            PmCategory::Monthly => self.next_monthly_pm,
            PmCategory::SixMonth => self.next_six_month_pm,
            PmCategory::Annual => self.next_annual_pm,
        }
    }
}
