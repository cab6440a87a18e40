// ==========================================
// 设备预防性维护周排程引擎 - 负载均衡分派引擎
// ==========================================
// 算法: 贪心轮转 —— 每个候选项取计数最低的技师与工作日
// 取舍: 不做全局最优;设备量级(数千)下快速且可解释
// 红线: 平局裁定固定(技师按名册顺序,工作日按周一至周五),
//       保证相同输入产出相同分派
// ==========================================

use crate::domain::schedule::ScheduleEntry;
use crate::domain::types::ScheduleStatus;
use crate::engine::priority::Candidate;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use tracing::debug;

/// 每周工作日数(周一至周五)
const WORK_DAYS: usize = 5;

// ==========================================
// AssignmentOutcome - 分派结果
// ==========================================
#[derive(Debug)]
pub struct AssignmentOutcome {
    /// 新建条目(状态 Scheduled)
    pub entries: Vec<ScheduleEntry>,
    /// 到期但容量耗尽未排的候选项
    pub capacity_exhausted: Vec<Candidate>,
}

// ==========================================
// LoadBalancer - 负载均衡分派引擎
// ==========================================
pub struct LoadBalancer {
    // 无状态引擎,不需要注入依赖
}

impl LoadBalancer {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 分派已排序候选列表
    ///
    /// # 参数
    /// - ranked: 优先级降序的候选列表
    /// - technicians: 排除后的可用技师(名册顺序,非空由编排器保证)
    /// - existing_entries: 目标周既有条目
    /// - week_start: 目标周周一
    /// - weekly_target: 本次新建条目上限
    /// - run_id: 本次运行ID
    ///
    /// # 计数种子
    /// 仅用既有 Completed 条目初始化技师/工作日计数:
    /// Scheduled 条目会被本次再生成整体替换,计入会破坏同周重跑的幂等性
    pub fn assign(
        &self,
        ranked: Vec<Candidate>,
        technicians: &[String],
        existing_entries: &[ScheduleEntry],
        week_start: NaiveDate,
        weekly_target: usize,
        run_id: &str,
    ) -> AssignmentOutcome {
        let mut tech_counts = vec![0usize; technicians.len()];
        let mut day_counts = [0usize; WORK_DAYS];

        for entry in existing_entries {
            if entry.status != ScheduleStatus::Completed {
                continue;
            }
            if let Some(idx) = technicians.iter().position(|t| *t == entry.assigned_technician) {
                tech_counts[idx] += 1;
            }
            let day_offset = entry
                .scheduled_date
                .signed_duration_since(week_start)
                .num_days();
            if (0..WORK_DAYS as i64).contains(&day_offset) {
                day_counts[day_offset as usize] += 1;
            }
        }

        let mut entries = Vec::new();
        let mut capacity_exhausted = Vec::new();
        let created_at = Utc::now();

        for candidate in ranked {
            if entries.len() >= weekly_target {
                capacity_exhausted.push(candidate);
                continue;
            }

            let tech_idx = Self::min_index(&tech_counts);
            let day_idx = Self::min_index(&day_counts);

            let scheduled_date = week_start + Duration::days(day_idx as i64);
            debug_assert!(scheduled_date.weekday().num_days_from_monday() < WORK_DAYS as u32);

            debug!(
                equipment_no = %candidate.equipment_no,
                pm_category = %candidate.pm_category,
                technician = %technicians[tech_idx],
                scheduled_date = %scheduled_date,
                "候选项已分派"
            );

            entries.push(ScheduleEntry {
                id: None,
                week_start,
                equipment_no: candidate.equipment_no,
                pm_category: candidate.pm_category,
                assigned_technician: technicians[tech_idx].clone(),
                scheduled_date,
                status: ScheduleStatus::Scheduled,
                run_id: Some(run_id.to_string()),
                created_at,
            });

            tech_counts[tech_idx] += 1;
            day_counts[day_idx] += 1;
        }

        AssignmentOutcome {
            entries,
            capacity_exhausted,
        }
    }

    /// 首个最小值下标(平局取靠前者)
    fn min_index(counts: &[usize]) -> usize {
        let mut best = 0;
        for (idx, count) in counts.iter().enumerate() {
            if *count < counts[best] {
                best = idx;
            }
        }
        best
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for LoadBalancer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::PmCategory;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn candidates(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate {
                equipment_no: format!("EQ-{:04}", i),
                pm_category: PmCategory::Monthly,
                tier: 99,
                days_overdue: 10,
            })
            .collect()
    }

    fn roster() -> Vec<String> {
        vec!["Alice".to_string(), "Bob".to_string(), "Carol".to_string()]
    }

    #[test]
    fn test_even_distribution() {
        let balancer = LoadBalancer::new();
        let outcome = balancer.assign(candidates(10), &roster(), &[], monday(), 100, "run-1");

        assert_eq!(outcome.entries.len(), 10);
        assert!(outcome.capacity_exhausted.is_empty());

        // 每技师计数差不超过 1
        let mut per_tech = std::collections::HashMap::new();
        for entry in &outcome.entries {
            *per_tech.entry(entry.assigned_technician.clone()).or_insert(0usize) += 1;
        }
        let max = per_tech.values().max().unwrap();
        let min = per_tech.values().min().unwrap();
        assert!(max - min <= 1, "per_tech={:?}", per_tech);
    }

    #[test]
    fn test_roster_order_tiebreak() {
        let balancer = LoadBalancer::new();
        let outcome = balancer.assign(candidates(1), &roster(), &[], monday(), 100, "run-1");

        // 全员计数相同时取名册首位
        assert_eq!(outcome.entries[0].assigned_technician, "Alice");
        // 工作日同理: 周一
        assert_eq!(outcome.entries[0].scheduled_date, monday());
    }

    #[test]
    fn test_weekly_target_cap() {
        let balancer = LoadBalancer::new();
        let outcome = balancer.assign(candidates(10), &roster(), &[], monday(), 4, "run-1");

        assert_eq!(outcome.entries.len(), 4);
        assert_eq!(outcome.capacity_exhausted.len(), 6);
        // 被截断的是排序靠后的候选项
        assert_eq!(outcome.capacity_exhausted[0].equipment_no, "EQ-0004");
    }

    #[test]
    fn test_completed_entries_seed_counts() {
        let balancer = LoadBalancer::new();

        // Alice 本周已有一条 Completed → 首个新分派给 Bob
        let existing = vec![ScheduleEntry {
            id: Some(1),
            week_start: monday(),
            equipment_no: "EQ-DONE".to_string(),
            pm_category: PmCategory::Monthly,
            assigned_technician: "Alice".to_string(),
            scheduled_date: monday(),
            status: ScheduleStatus::Completed,
            run_id: None,
            created_at: Utc::now(),
        }];

        let outcome = balancer.assign(candidates(1), &roster(), &existing, monday(), 100, "run-1");
        assert_eq!(outcome.entries[0].assigned_technician, "Bob");
        // 周一被占用 → 排到周二
        assert_eq!(
            outcome.entries[0].scheduled_date,
            monday() + Duration::days(1)
        );
    }

    #[test]
    fn test_scheduled_entries_do_not_seed_counts() {
        let balancer = LoadBalancer::new();

        // Scheduled 条目将被整体替换,不得影响计数
        let existing = vec![ScheduleEntry {
            id: Some(1),
            week_start: monday(),
            equipment_no: "EQ-OLD".to_string(),
            pm_category: PmCategory::Monthly,
            assigned_technician: "Alice".to_string(),
            scheduled_date: monday(),
            status: ScheduleStatus::Scheduled,
            run_id: None,
            created_at: Utc::now(),
        }];

        let outcome = balancer.assign(candidates(1), &roster(), &existing, monday(), 100, "run-1");
        assert_eq!(outcome.entries[0].assigned_technician, "Alice");
    }
}
