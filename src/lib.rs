// ==========================================
// 设备预防性维护周排程引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 排程决策支持系统 (人工最终控制权)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排程规则
pub mod engine;

// 导入层 - 外部优先级清单
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    EquipmentStatus, IneligibilityReason, PmCategory, ScheduleStatus,
};

// 领域实体
pub use domain::{
    CompletionRecord, EquipmentRecord, RunSummary, ScheduleEntry, WeeklyScheduleRequest,
};

// 引擎
pub use engine::{
    AnnualSpreader, CandidateIndex, CandidatePoolBuilder, CompletionService,
    EligibilityEngine, EngineError, LoadBalancer, PriorityRanker, ScheduleOrchestrator,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "设备预防性维护周排程引擎";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
