// ==========================================
// 设备预防性维护周排程引擎 - 优先级排序引擎
// ==========================================
// 排序键:
// 1) 优先级档升序(档号小者先;不在清单走默认档)
// 2) 档内逾期天数降序(越逾期越先)
// 3) equipment_no 升序(稳定决定性平局裁定)
// 4) 类别按评估顺序(年度 > 半年 > 月度)
// 红线: 相同输入必须产出逐字节一致的顺序
// ==========================================

use crate::domain::types::PmCategory;
use std::cmp::Ordering;

/// 不在任何优先级清单中的设备所走的默认档(低于一切显式档)
pub const DEFAULT_TIER: u32 = 99;

// ==========================================
// Candidate - 合格候选项
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub equipment_no: String,
    pub pm_category: PmCategory,
    pub tier: u32,
    pub days_overdue: i64,
}

// ==========================================
// PriorityRanker - 优先级排序引擎
// ==========================================
pub struct PriorityRanker {
    // 无状态引擎,不需要注入依赖
}

impl PriorityRanker {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 排序候选列表(按优先级从高到低)
    pub fn rank(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.sort_by(|a, b| self.compare(a, b));
        candidates
    }

    /// 比较两个候选项的优先级
    ///
    /// # 返回
    /// Ordering::Less 表示 a 优先于 b
    fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        // 1. 优先级档升序
        match a.tier.cmp(&b.tier) {
            Ordering::Equal => {}
            other => return other,
        }

        // 2. 逾期天数降序
        match b.days_overdue.cmp(&a.days_overdue) {
            Ordering::Equal => {}
            other => return other,
        }

        // 3. equipment_no 升序
        match a.equipment_no.cmp(&b.equipment_no) {
            Ordering::Equal => {}
            other => return other,
        }

        // 4. 类别按评估顺序
        Self::category_rank(a.pm_category).cmp(&Self::category_rank(b.pm_category))
    }

    /// 类别在评估顺序中的位置
    fn category_rank(category: PmCategory) -> usize {
        PmCategory::ALL
            .iter()
            .position(|c| *c == category)
            .unwrap_or(PmCategory::ALL.len())
    }

    /// 生成排序原因 (可解释性)
    ///
    /// # 返回
    /// JSON 格式的排序原因字符串
    pub fn sort_reason(&self, candidate: &Candidate) -> String {
        let primary_factor = if candidate.tier < DEFAULT_TIER {
            "PRIORITY_TIER"
        } else if candidate.days_overdue > 0 {
            "OVERDUE"
        } else {
            "DUE_WINDOW"
        };

        format!(
            r#"{{"sort_keys":{{"tier":{},"days_overdue":{},"equipment_no":"{}","pm_category":"{}"}},"primary_factor":"{}"}}"#,
            candidate.tier,
            candidate.days_overdue,
            candidate.equipment_no,
            candidate.pm_category,
            primary_factor
        )
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for PriorityRanker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(no: &str, category: PmCategory, tier: u32, overdue: i64) -> Candidate {
        Candidate {
            equipment_no: no.to_string(),
            pm_category: category,
            tier,
            days_overdue: overdue,
        }
    }

    #[test]
    fn test_tier_beats_overdue() {
        let ranker = PriorityRanker::new();

        // P1 设备即使逾期更少也排在默认档之前
        let ranked = ranker.rank(vec![
            candidate("EQ-200", PmCategory::Monthly, DEFAULT_TIER, 120),
            candidate("EQ-100", PmCategory::Monthly, 1, 3),
        ]);

        assert_eq!(ranked[0].equipment_no, "EQ-100");
        assert_eq!(ranked[1].equipment_no, "EQ-200");
    }

    #[test]
    fn test_overdue_within_tier() {
        let ranker = PriorityRanker::new();

        let ranked = ranker.rank(vec![
            candidate("EQ-001", PmCategory::Monthly, 2, 5),
            candidate("EQ-002", PmCategory::Monthly, 2, 40),
        ]);

        assert_eq!(ranked[0].equipment_no, "EQ-002");
    }

    #[test]
    fn test_equipment_no_tiebreak_is_stable() {
        let ranker = PriorityRanker::new();

        let input = vec![
            candidate("EQ-B", PmCategory::Monthly, 2, 10),
            candidate("EQ-A", PmCategory::Monthly, 2, 10),
        ];

        let ranked1 = ranker.rank(input.clone());
        let ranked2 = ranker.rank({
            let mut reversed = input;
            reversed.reverse();
            reversed
        });

        // 输入顺序不同,输出必须一致
        assert_eq!(ranked1, ranked2);
        assert_eq!(ranked1[0].equipment_no, "EQ-A");
    }

    #[test]
    fn test_category_order_same_equipment() {
        let ranker = PriorityRanker::new();

        let ranked = ranker.rank(vec![
            candidate("EQ-001", PmCategory::Monthly, 2, 10),
            candidate("EQ-001", PmCategory::Annual, 2, 10),
        ]);

        // 同设备同档同逾期: 年度先于月度
        assert_eq!(ranked[0].pm_category, PmCategory::Annual);
    }
}
