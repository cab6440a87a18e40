// ==========================================
// 设备预防性维护周排程引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod completion;
pub mod equipment;
pub mod schedule;
pub mod types;

// 重导出核心类型
pub use completion::CompletionRecord;
pub use equipment::EquipmentRecord;
pub use schedule::{CapacityExhausted, RunSummary, ScheduleEntry, WeeklyScheduleRequest};
pub use types::{EquipmentStatus, IneligibilityReason, PmCategory, ScheduleStatus};
