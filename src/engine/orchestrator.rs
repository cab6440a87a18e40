// ==========================================
// 设备预防性维护周排程引擎 - 引擎编排器
// ==========================================
// 用途: 协调候选池 → 合格性 → 优先级 → 分派 → 落库 的执行顺序
// 语义: 单次同步批处理;同周再生成幂等(只替换 Scheduled)
// ==========================================

use crate::config::scheduler_config_trait::{SchedulerConfigReader, SchedulerParams};
use crate::domain::schedule::{CapacityExhausted, RunSummary, WeeklyScheduleRequest};
use crate::domain::types::PmCategory;
use crate::engine::assigner::LoadBalancer;
use crate::engine::candidate_pool::CandidatePoolBuilder;
use crate::engine::eligibility::{Eligibility, EligibilityEngine};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::priority::{Candidate, PriorityRanker, DEFAULT_TIER};
use crate::repository::schedule_repo::ScheduleRepository;
use chrono::{Datelike, Weekday};
use rusqlite::Connection;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

// ==========================================
// ScheduleOrchestrator - 引擎编排器
// ==========================================
pub struct ScheduleOrchestrator<C>
where
    C: SchedulerConfigReader,
{
    config: Arc<C>,
    pool_builder: CandidatePoolBuilder,
    ranker: PriorityRanker,
    balancer: LoadBalancer,
    schedule_repo: ScheduleRepository,
}

impl<C> ScheduleOrchestrator<C>
where
    C: SchedulerConfigReader,
{
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - conn: 共享数据库连接(同周写入经由它串行化)
    /// - config: 配置读取器
    pub fn new(conn: Arc<Mutex<Connection>>, config: Arc<C>) -> Self {
        Self {
            config,
            pool_builder: CandidatePoolBuilder::from_connection(conn.clone()),
            ranker: PriorityRanker::new(),
            balancer: LoadBalancer::new(),
            schedule_repo: ScheduleRepository::from_connection(conn),
        }
    }

    /// 为目标周生成排程
    ///
    /// # 流程
    /// 1. 输入校验(周一 / 可用技师)
    /// 2. 配置快照 + 候选池索引(固定次数批量读取)
    /// 3. 合格性走查(逐设备逐类别,年度先行)
    /// 4. 优先级排序
    /// 5. 负载均衡分派
    /// 6. 事务落库(替换该周 Scheduled,保留 Completed)
    ///
    /// # 返回
    /// 运行摘要(新建条目、每技师计数、每原因码跳过数、容量耗尽清单)
    pub async fn generate_weekly_schedule(
        &self,
        request: &WeeklyScheduleRequest,
    ) -> EngineResult<RunSummary> {
        let week_start = request.week_start;

        // ==========================================
        // 步骤1: 输入校验
        // ==========================================
        if week_start.weekday() != Weekday::Mon {
            return Err(EngineError::InvalidWeekStart(week_start));
        }

        let available = request.available_technicians();
        if available.is_empty() {
            return Err(EngineError::NoAvailableTechnicians);
        }

        let run_id = Uuid::new_v4().to_string();
        info!(
            run_id = %run_id,
            week_start = %week_start,
            technicians = available.len(),
            excluded = request.excluded_technicians.len(),
            "开始生成周排程"
        );

        // ==========================================
        // 步骤2: 配置快照 + 候选池索引
        // ==========================================
        let params = SchedulerParams::load(self.config.as_ref())
            .await
            .map_err(|e| EngineError::ConfigError(e.to_string()))?;
        let weekly_target = request.weekly_target.unwrap_or(params.weekly_pm_target);

        let index = self.pool_builder.build(week_start, &params)?;

        // ==========================================
        // 步骤3: 合格性走查
        // ==========================================
        debug!("步骤3: 执行合格性走查");

        let engine = EligibilityEngine::new(&params);
        let mut annual_selected: HashSet<String> = HashSet::new();
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut skipped_by_reason = BTreeMap::new();

        for equipment in &index.equipment {
            // 年度先评估: 年度候选压制同设备的月度/半年(单向规则)
            for category in PmCategory::ALL {
                match engine.evaluate(equipment, category, week_start, &index, &annual_selected) {
                    Eligibility::Eligible { days_overdue } => {
                        if category == PmCategory::Annual {
                            annual_selected.insert(equipment.equipment_no.clone());
                        }
                        let tier = request
                            .priority_tiers
                            .get(&equipment.equipment_no)
                            .copied()
                            .unwrap_or(DEFAULT_TIER);
                        candidates.push(Candidate {
                            equipment_no: equipment.equipment_no.clone(),
                            pm_category: category,
                            tier,
                            days_overdue,
                        });
                    }
                    Eligibility::Ineligible { reason, detail } => {
                        *skipped_by_reason.entry(reason).or_insert(0) += 1;
                        debug!(
                            equipment_no = %equipment.equipment_no,
                            pm_category = %category,
                            reason = %reason,
                            detail = %detail,
                            "候选项被跳过"
                        );
                    }
                }
            }
        }

        info!(
            eligible_count = candidates.len(),
            skipped_count = skipped_by_reason.values().sum::<usize>(),
            "合格性走查完成"
        );

        // ==========================================
        // 步骤4: 优先级排序
        // ==========================================
        debug!("步骤4: 执行优先级排序");
        let ranked = self.ranker.rank(candidates);

        // ==========================================
        // 步骤5: 负载均衡分派
        // ==========================================
        debug!("步骤5: 执行负载均衡分派");
        let outcome = self.balancer.assign(
            ranked,
            &available,
            index.week_entries(),
            week_start,
            weekly_target,
            &run_id,
        );

        info!(
            assigned_count = outcome.entries.len(),
            capacity_exhausted_count = outcome.capacity_exhausted.len(),
            weekly_target = weekly_target,
            "负载均衡分派完成"
        );

        // ==========================================
        // 步骤6: 事务落库
        // ==========================================
        let created_total = self.schedule_repo.replace_week(week_start, &outcome.entries)?;

        let mut created_by_technician = BTreeMap::new();
        for entry in &outcome.entries {
            *created_by_technician
                .entry(entry.assigned_technician.clone())
                .or_insert(0) += 1;
        }

        let capacity_exhausted = outcome
            .capacity_exhausted
            .into_iter()
            .map(|c| CapacityExhausted {
                equipment_no: c.equipment_no,
                pm_category: c.pm_category,
                days_overdue: c.days_overdue,
            })
            .collect();

        info!(
            run_id = %run_id,
            created_total = created_total,
            "周排程已提交"
        );

        Ok(RunSummary {
            run_id,
            week_start,
            created_total,
            created_by_technician,
            skipped_by_reason,
            capacity_exhausted,
            entries: outcome.entries,
        })
    }
}
