// ==========================================
// 设备预防性维护周排程引擎 - 导入层
// ==========================================
// 职责: 解析外部优先级清单文件
// 红线: 不含排程逻辑;清单为请求作用域输入,不持久化
// ==========================================

pub mod error;
pub mod priority_list;

// 重导出
pub use error::ImportError;
pub use priority_list::{load_priority_tiers, parse_tier_csv};
