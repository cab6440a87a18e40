// ==========================================
// 设备预防性维护周排程引擎 - 候选池构建器
// ==========================================
// 职责: 固定次数的批量读取 + 构建按设备索引的内存查找表
// 红线: 合格性判定阶段零查询 —— 逐设备 O(1) 查找
// ==========================================
// 批量读取共 4 次:
// 1. 设备目录(全量,含被排除状态)
// 2. 完成历史(回看窗口内)
// 3. 未完成排程条目(宽限窗口内,跨周)
// 4. 目标周既有条目
// ==========================================

use crate::config::scheduler_config_trait::SchedulerParams;
use crate::domain::equipment::EquipmentRecord;
use crate::domain::schedule::ScheduleEntry;
use crate::domain::types::{PmCategory, ScheduleStatus};
use crate::repository::completion_repo::CompletionRepository;
use crate::repository::equipment_repo::EquipmentRepository;
use crate::repository::error::RepositoryResult;
use crate::repository::schedule_repo::ScheduleRepository;
use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::info;

// ==========================================
// CandidateIndex - 候选池索引
// ==========================================
// 一次运行的不可变输入快照;引擎间以值传递,无隐式全局状态
#[derive(Debug)]
pub struct CandidateIndex {
    /// 快照参考日期(目标周周一)
    pub as_of: NaiveDate,
    /// 设备目录,按 equipment_no 升序
    pub equipment: Vec<EquipmentRecord>,
    /// (设备, 类别) -> 最近完成日期
    latest_completions: HashMap<(String, PmCategory), NaiveDate>,
    /// (设备, 类别) -> 目标周之前、宽限窗口内仍未完成的排定日期
    pending_prior: HashMap<(String, PmCategory), NaiveDate>,
    /// 目标周内已 Completed 的 (设备, 类别) 对
    week_completed_pairs: HashSet<(String, PmCategory)>,
    /// 目标周内已 Completed 年度条目的设备
    week_completed_annual: HashSet<String>,
    /// 目标周全部既有条目(负载均衡种子用)
    week_entries: Vec<ScheduleEntry>,
}

impl CandidateIndex {
    /// 最近一次完成日期(类别内)
    pub fn latest_completion(&self, equipment_no: &str, category: PmCategory) -> Option<NaiveDate> {
        self.latest_completions
            .get(&(equipment_no.to_string(), category))
            .copied()
    }

    /// 目标周之前仍阻塞的未完成排定日期
    pub fn pending_prior(&self, equipment_no: &str, category: PmCategory) -> Option<NaiveDate> {
        self.pending_prior
            .get(&(equipment_no.to_string(), category))
            .copied()
    }

    /// 目标周内该 (设备, 类别) 是否已有 Completed 条目
    pub fn week_completed(&self, equipment_no: &str, category: PmCategory) -> bool {
        self.week_completed_pairs
            .contains(&(equipment_no.to_string(), category))
    }

    /// 目标周内该设备是否已完成年度条目
    pub fn week_has_completed_annual(&self, equipment_no: &str) -> bool {
        self.week_completed_annual.contains(equipment_no)
    }

    /// 目标周全部既有条目
    pub fn week_entries(&self) -> &[ScheduleEntry] {
        &self.week_entries
    }
}

// ==========================================
// CandidatePoolBuilder - 候选池构建器
// ==========================================
pub struct CandidatePoolBuilder {
    equipment_repo: EquipmentRepository,
    completion_repo: CompletionRepository,
    schedule_repo: ScheduleRepository,
}

impl CandidatePoolBuilder {
    /// 从共享连接创建构建器
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            equipment_repo: EquipmentRepository::from_connection(conn.clone()),
            completion_repo: CompletionRepository::from_connection(conn.clone()),
            schedule_repo: ScheduleRepository::from_connection(conn),
        }
    }

    /// 构建一次运行的候选池索引
    ///
    /// # 参数
    /// - as_of: 参考日期(目标周周一)
    /// - params: 本次运行的配置快照
    pub fn build(
        &self,
        as_of: NaiveDate,
        params: &SchedulerParams,
    ) -> RepositoryResult<CandidateIndex> {
        // 读取 1: 设备目录
        let equipment = self.equipment_repo.list_all()?;

        // 读取 2: 完成历史
        let lookback_start = as_of - Duration::days(params.completion_lookback_days);
        let completions = self.completion_repo.list_since(lookback_start)?;

        // 最近完成: list_since 按 completion_date 降序,首见即最新
        let mut latest_completions = HashMap::new();
        for record in &completions {
            latest_completions
                .entry((record.equipment_no.clone(), record.pm_category))
                .or_insert(record.completion_date);
        }

        // 读取 3: 宽限窗口内仍未完成的排程条目(跨周)
        let grace_cutoff = as_of - Duration::days(params.pending_grace_days);
        let pending = self.schedule_repo.find_pending_on_or_after(grace_cutoff)?;

        // 目标周自身的 Scheduled 条目会被本次再生成整体替换,不计入阻塞
        let mut pending_prior = HashMap::new();
        for entry in pending {
            if entry.week_start == as_of {
                continue;
            }
            pending_prior
                .entry((entry.equipment_no.clone(), entry.pm_category))
                .and_modify(|d: &mut NaiveDate| *d = (*d).max(entry.scheduled_date))
                .or_insert(entry.scheduled_date);
        }

        // 读取 4: 目标周既有条目
        let week_entries = self.schedule_repo.find_by_week(as_of)?;

        let mut week_completed_pairs = HashSet::new();
        let mut week_completed_annual = HashSet::new();
        for entry in &week_entries {
            if entry.status == ScheduleStatus::Completed {
                week_completed_pairs.insert((entry.equipment_no.clone(), entry.pm_category));
                if entry.pm_category == PmCategory::Annual {
                    week_completed_annual.insert(entry.equipment_no.clone());
                }
            }
        }

        info!(
            as_of = %as_of,
            equipment_count = equipment.len(),
            completion_count = latest_completions.len(),
            pending_prior_count = pending_prior.len(),
            week_entry_count = week_entries.len(),
            "候选池索引构建完成"
        );

        Ok(CandidateIndex {
            as_of,
            equipment,
            latest_completions,
            pending_prior,
            week_completed_pairs,
            week_completed_annual,
            week_entries,
        })
    }
}
