// ==========================================
// 设备预防性维护周排程引擎 - 完成登记服务
// ==========================================
// 职责: 一次 PM 完成的业务落库 ——
//       计算滚动后的下次到期日期,交仓储事务执行
//       (插入完成记录 + 滚动设备日期 + 关闭匹配的排程条目)
// 红线: 日期推导在引擎层;仓储只执行写入计划
// ==========================================

use crate::domain::completion::CompletionRecord;
use crate::domain::types::PmCategory;
use crate::engine::annual_spread::AnnualSpreader;
use crate::engine::error::EngineResult;
use crate::repository::completion_repo::{CompletionPersistPlan, CompletionRepository};
use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::info;

// ==========================================
// CompletionOutcome - 完成登记结果
// ==========================================
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub completion_id: i64,
    /// 是否关闭了一条匹配的 Scheduled 周排程条目
    pub closed_schedule_entry: bool,
    /// 滚动后的下次到期日期
    pub next_due: NaiveDate,
}

// ==========================================
// CompletionService - 完成登记服务
// ==========================================
pub struct CompletionService {
    completion_repo: CompletionRepository,
}

impl CompletionService {
    /// 从共享连接创建服务
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            completion_repo: CompletionRepository::from_connection(conn),
        }
    }

    /// 登记一次 PM 完成
    ///
    /// # 参数
    /// - record: 完成记录(待持久化)
    /// - next_due_override: 人工指定的下次到期日期;None 时自动推导
    ///
    /// # 下次到期推导
    /// - 年度: 分散器(完成日期 + 365 + 设备固定偏移)
    /// - 月度/半年: 完成日期 + 名义周期
    pub fn record(
        &self,
        record: CompletionRecord,
        next_due_override: Option<NaiveDate>,
    ) -> EngineResult<CompletionOutcome> {
        let next_due = next_due_override.unwrap_or_else(|| match record.pm_category {
            PmCategory::Annual => {
                AnnualSpreader::next_annual_due(&record.equipment_no, record.completion_date)
            }
            category => {
                record.completion_date + Duration::days(category.nominal_interval_days())
            }
        });

        let plan = CompletionPersistPlan { record, next_due };
        let (completion_id, closed) = self.completion_repo.apply(&plan)?;

        info!(
            equipment_no = %plan.record.equipment_no,
            pm_category = %plan.record.pm_category,
            completion_date = %plan.record.completion_date,
            next_due = %next_due,
            closed_schedule_entry = closed,
            "PM 完成已登记"
        );

        Ok(CompletionOutcome {
            completion_id,
            closed_schedule_entry: closed,
            next_due,
        })
    }
}
