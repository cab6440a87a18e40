// ==========================================
// 设备预防性维护周排程引擎 - 排程配置读取 Trait
// ==========================================
// 职责: 定义排程引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// SchedulerConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait SchedulerConfigReader: Send + Sync {
    /// 获取每周新建排程条目上限
    ///
    /// # 默认值
    /// - 130
    async fn get_weekly_pm_target(&self) -> Result<usize, Box<dyn Error>>;

    /// 获取到期前瞻窗口（天）
    ///
    /// # 默认值
    /// - 7
    ///
    /// # 用途
    /// - next_due 超出 reference_date + 前瞻窗口的设备判为 NOT_YET_DUE
    async fn get_look_ahead_days(&self) -> Result<i64, Box<dyn Error>>;

    /// 获取未完成排程宽限窗口（天）
    ///
    /// # 默认值
    /// - 14
    ///
    /// # 用途
    /// - 排定日期早于 reference_date - 宽限窗口的 Scheduled 条目
    ///   视为已放弃,不再触发 ALREADY_PENDING
    async fn get_pending_grace_days(&self) -> Result<i64, Box<dyn Error>>;

    /// 获取完成历史回看窗口（天）
    ///
    /// # 默认值
    /// - 400（覆盖年度类别的最小重复间隔并留余量）
    async fn get_completion_lookback_days(&self) -> Result<i64, Box<dyn Error>>;
}

// ==========================================
// SchedulerParams - 单次运行的配置快照
// ==========================================
// 运行开始时读取一次,此后引擎只用纯值,
// 避免逐候选项的配置查询
#[derive(Debug, Clone, Copy)]
pub struct SchedulerParams {
    pub weekly_pm_target: usize,
    pub look_ahead_days: i64,
    pub pending_grace_days: i64,
    pub completion_lookback_days: i64,
}

impl SchedulerParams {
    /// 从配置读取器加载快照
    pub async fn load<C>(reader: &C) -> Result<Self, Box<dyn Error>>
    where
        C: SchedulerConfigReader,
    {
        Ok(Self {
            weekly_pm_target: reader.get_weekly_pm_target().await?,
            look_ahead_days: reader.get_look_ahead_days().await?,
            pending_grace_days: reader.get_pending_grace_days().await?,
            completion_lookback_days: reader.get_completion_lookback_days().await?,
        })
    }
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            weekly_pm_target: 130,
            look_ahead_days: 7,
            pending_grace_days: 14,
            completion_lookback_days: 400,
        }
    }
}
