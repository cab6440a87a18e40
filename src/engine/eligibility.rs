// ==========================================
// 设备预防性维护周排程引擎 - 合格性判定引擎
// ==========================================
// 职责: 按固定顺序走查排程准入规则,首个失败即返回
// 输入: 设备记录 + PM 类别 + 参考日期 + 候选池索引
// 输出: Eligibility(合格携带逾期度;不合格携带原因码与说明)
// 红线: 不直接读库,只查索引;不合格是正常结果,不抛错
// ==========================================

use crate::config::scheduler_config_trait::SchedulerParams;
use crate::domain::equipment::EquipmentRecord;
use crate::domain::types::{IneligibilityReason, PmCategory};
use crate::engine::candidate_pool::CandidateIndex;
use crate::engine::eligibility_core::EligibilityCore;
use chrono::NaiveDate;
use std::collections::HashSet;

// ==========================================
// Eligibility - 判定结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// 可排程,携带逾期天数(排序键)
    Eligible { days_overdue: i64 },
    /// 不可排程,携带原因码与可读说明
    Ineligible {
        reason: IneligibilityReason,
        detail: String,
    },
}

// ==========================================
// EligibilityEngine - 合格性判定引擎
// ==========================================
pub struct EligibilityEngine {
    look_ahead_days: i64,
    pending_grace_days: i64,
}

impl EligibilityEngine {
    /// 从配置快照创建引擎
    pub fn new(params: &SchedulerParams) -> Self {
        Self {
            look_ahead_days: params.look_ahead_days,
            pending_grace_days: params.pending_grace_days,
        }
    }

    /// 判定单个 (设备, 类别) 对本周是否可排程
    ///
    /// 规则按序评估,首个失败即返回:
    /// 1. 类别适用标志 + 设备状态
    /// 2. 最小重复间隔内已完成
    /// 3. 已有未完成排程条目(跨周宽限窗口) / 目标周已 Completed
    /// 4. 本周年度任务压制月度/半年(单向,反向不限制)
    /// 5. 未到期(有效到期日期超出前瞻窗口)
    ///
    /// # 参数
    /// - annual_selected: 本次运行中已被选为年度候选的设备集合
    pub fn evaluate(
        &self,
        equipment: &EquipmentRecord,
        category: PmCategory,
        reference_date: NaiveDate,
        index: &CandidateIndex,
        annual_selected: &HashSet<String>,
    ) -> Eligibility {
        // === 规则 1: 适用性与设备状态 ===
        if !equipment.applies(category) {
            return Eligibility::Ineligible {
                reason: IneligibilityReason::NotApplicable,
                detail: format!("{} not flagged for {}", equipment.equipment_no, category),
            };
        }
        if !equipment.status.is_schedulable() {
            return Eligibility::Ineligible {
                reason: IneligibilityReason::ExcludedStatus,
                detail: format!("status={}", equipment.status),
            };
        }

        // === 规则 2: 最小重复间隔 ===
        // 完成历史优先;设备表日期为历史缺失时的回退口径
        let latest_completion = index
            .latest_completion(&equipment.equipment_no, category)
            .or_else(|| equipment.last_completed(category));

        if let Some(days_since) = EligibilityCore::recent_completion_within_interval(
            latest_completion,
            category,
            reference_date,
        ) {
            return Eligibility::Ineligible {
                reason: IneligibilityReason::RecentlyCompleted,
                detail: format!(
                    "completed {} days ago (min interval {})",
                    days_since,
                    category.min_recurrence_days()
                ),
            };
        }

        // === 规则 3: 已有未完成/已完成条目 ===
        if let Some(pending_date) = index.pending_prior(&equipment.equipment_no, category) {
            if EligibilityCore::pending_blocks(pending_date, reference_date, self.pending_grace_days)
            {
                return Eligibility::Ineligible {
                    reason: IneligibilityReason::AlreadyPending,
                    detail: format!("uncompleted entry scheduled {}", pending_date),
                };
            }
        }
        if index.week_completed(&equipment.equipment_no, category) {
            return Eligibility::Ineligible {
                reason: IneligibilityReason::AlreadyPending,
                detail: "already completed in target week".to_string(),
            };
        }

        // === 规则 4: 跨类别冲突(单向) ===
        // 年度压制月度/半年;低频任务不反向阻塞年度
        if category != PmCategory::Annual
            && (annual_selected.contains(&equipment.equipment_no)
                || index.week_has_completed_annual(&equipment.equipment_no))
        {
            return Eligibility::Ineligible {
                reason: IneligibilityReason::CrossCategoryConflict,
                detail: "annual PM occupies this week".to_string(),
            };
        }

        // === 规则 5: 到期窗口 ===
        let effective_due = EligibilityCore::effective_next_due(
            equipment.next_due(category),
            latest_completion,
            category,
        );

        if EligibilityCore::not_yet_due(effective_due, reference_date, self.look_ahead_days) {
            return Eligibility::Ineligible {
                reason: IneligibilityReason::NotYetDue,
                detail: match effective_due {
                    Some(due) => format!("next due {}", due),
                    None => "next due unknown".to_string(),
                },
            };
        }

        Eligibility::Eligible {
            days_overdue: EligibilityCore::days_overdue(effective_due, reference_date),
        }
    }
}
