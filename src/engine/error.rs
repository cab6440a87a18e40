// ==========================================
// 设备预防性维护周排程引擎 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 不合格(Ineligibility)不是错误,由原因码承载;
//       这里只定义会中止整次运行的结构化失败
// ==========================================

use crate::repository::error::RepositoryError;
use chrono::NaiveDate;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 输入错误 =====
    #[error("目标周起始日期不是周一: {0}")]
    InvalidWeekStart(NaiveDate),

    #[error("无可用技师(名册为空或全部被排除)")]
    NoAvailableTechnicians,

    // ===== 配置错误 =====
    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ===== 持久化错误(整体回滚后上抛) =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
