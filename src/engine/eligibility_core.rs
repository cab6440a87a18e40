// ==========================================
// 设备预防性维护周排程引擎 - Eligibility Core 纯函数库
// ==========================================
// 职责: 提供重复完成判定、到期判定、逾期度计算的纯逻辑
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use crate::domain::types::PmCategory;
use chrono::{Duration, NaiveDate};

/// 从未完成过的设备按此逾期天数参与排序(恒排在同档最前)
pub const NEVER_COMPLETED_OVERDUE_DAYS: i64 = 3650;

// ==========================================
// EligibilityCore - 纯函数工具类
// ==========================================
pub struct EligibilityCore;

impl EligibilityCore {
    /// 判定最近一次完成是否落在最小重复间隔内
    ///
    /// # 规则
    /// - (reference_date - completion_date) < 类别最小重复间隔 → 视为重复
    ///
    /// # 返回
    /// - `Some(days_since)`: 在间隔内(含完成日期晚于参考日期的负值情况)
    /// - `None`: 无完成记录或已超出间隔
    pub fn recent_completion_within_interval(
        latest_completion: Option<NaiveDate>,
        category: PmCategory,
        reference_date: NaiveDate,
    ) -> Option<i64> {
        let completion = latest_completion?;
        let days_since = reference_date.signed_duration_since(completion).num_days();
        if days_since < category.min_recurrence_days() {
            Some(days_since)
        } else {
            None
        }
    }

    /// 有效下次到期日期
    ///
    /// # 规则
    /// - 设备表有 next_due → 直接使用
    /// - 否则有上次完成日期 → 上次完成 + 名义周期
    /// - 两者皆无(从未完成) → None
    pub fn effective_next_due(
        next_due: Option<NaiveDate>,
        last_completed: Option<NaiveDate>,
        category: PmCategory,
    ) -> Option<NaiveDate> {
        next_due.or_else(|| {
            last_completed.map(|d| d + Duration::days(category.nominal_interval_days()))
        })
    }

    /// 判定是否尚未到期(超出前瞻窗口)
    ///
    /// # 规则
    /// - effective_next_due > reference_date + look_ahead_days → 未到期
    /// - 从未完成(无有效到期日期) → 视为到期
    pub fn not_yet_due(
        effective_next_due: Option<NaiveDate>,
        reference_date: NaiveDate,
        look_ahead_days: i64,
    ) -> bool {
        match effective_next_due {
            Some(due) => due > reference_date + Duration::days(look_ahead_days),
            None => false,
        }
    }

    /// 计算逾期天数(排序键)
    ///
    /// # 规则
    /// - 有有效到期日期 → reference_date - due(未到期为负)
    /// - 从未完成 → NEVER_COMPLETED_OVERDUE_DAYS(最高逾期)
    pub fn days_overdue(
        effective_next_due: Option<NaiveDate>,
        reference_date: NaiveDate,
    ) -> i64 {
        match effective_next_due {
            Some(due) => reference_date.signed_duration_since(due).num_days(),
            None => NEVER_COMPLETED_OVERDUE_DAYS,
        }
    }

    /// 判定未完成排程条目是否仍阻塞重排
    ///
    /// # 规则
    /// - scheduled_date >= reference_date - pending_grace_days → 仍阻塞
    /// - 更早的 Scheduled 条目视为已放弃
    pub fn pending_blocks(
        scheduled_date: NaiveDate,
        reference_date: NaiveDate,
        pending_grace_days: i64,
    ) -> bool {
        scheduled_date >= reference_date - Duration::days(pending_grace_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_recent_completion_within_interval() {
        let reference = d(2025, 6, 2);

        // 月度: 10 天前完成,间隔 25 天内 → 重复
        assert_eq!(
            EligibilityCore::recent_completion_within_interval(
                Some(d(2025, 5, 23)),
                PmCategory::Monthly,
                reference,
            ),
            Some(10)
        );

        // 月度: 40 天前完成 → 不重复
        assert_eq!(
            EligibilityCore::recent_completion_within_interval(
                Some(d(2025, 4, 23)),
                PmCategory::Monthly,
                reference,
            ),
            None
        );

        // 恰好等于最小间隔 → 不重复(间隔已满)
        assert_eq!(
            EligibilityCore::recent_completion_within_interval(
                Some(reference - Duration::days(25)),
                PmCategory::Monthly,
                reference,
            ),
            None
        );

        // 无完成记录
        assert_eq!(
            EligibilityCore::recent_completion_within_interval(
                None,
                PmCategory::Annual,
                reference,
            ),
            None
        );
    }

    #[test]
    fn test_effective_next_due() {
        // 显式 next_due 优先
        assert_eq!(
            EligibilityCore::effective_next_due(
                Some(d(2025, 7, 1)),
                Some(d(2025, 1, 1)),
                PmCategory::Monthly,
            ),
            Some(d(2025, 7, 1))
        );

        // 回退: 上次完成 + 名义周期
        assert_eq!(
            EligibilityCore::effective_next_due(None, Some(d(2025, 1, 1)), PmCategory::Monthly),
            Some(d(2025, 1, 31))
        );

        // 从未完成
        assert_eq!(
            EligibilityCore::effective_next_due(None, None, PmCategory::Annual),
            None
        );
    }

    #[test]
    fn test_not_yet_due() {
        let reference = d(2025, 6, 2);

        // 到期日在前瞻窗口外 → 未到期
        assert!(EligibilityCore::not_yet_due(Some(d(2025, 6, 20)), reference, 7));

        // 到期日在前瞻窗口内 → 到期
        assert!(!EligibilityCore::not_yet_due(Some(d(2025, 6, 8)), reference, 7));

        // 已逾期 → 到期
        assert!(!EligibilityCore::not_yet_due(Some(d(2025, 5, 1)), reference, 7));

        // 从未完成 → 到期
        assert!(!EligibilityCore::not_yet_due(None, reference, 7));
    }

    #[test]
    fn test_days_overdue() {
        let reference = d(2025, 6, 2);

        assert_eq!(EligibilityCore::days_overdue(Some(d(2025, 5, 23)), reference), 10);
        assert_eq!(EligibilityCore::days_overdue(Some(d(2025, 6, 12)), reference), -10);
        assert_eq!(
            EligibilityCore::days_overdue(None, reference),
            NEVER_COMPLETED_OVERDUE_DAYS
        );
    }

    #[test]
    fn test_pending_blocks() {
        let reference = d(2025, 6, 2);

        // 宽限窗口内的未完成条目仍阻塞
        assert!(EligibilityCore::pending_blocks(d(2025, 5, 26), reference, 14));

        // 窗口外的陈旧条目不再阻塞
        assert!(!EligibilityCore::pending_blocks(d(2025, 5, 1), reference, 14));
    }
}
