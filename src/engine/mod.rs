// ==========================================
// 设备预防性维护周排程引擎 - 引擎层
// ==========================================
// 职责: 实现排程规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 所有跳过必须输出原因码
// ==========================================

pub mod annual_spread;
pub mod assigner;
pub mod candidate_pool;
pub mod completion;
pub mod eligibility;
pub mod eligibility_core;
pub mod error;
pub mod orchestrator;
pub mod priority;

// 重导出核心引擎
pub use annual_spread::AnnualSpreader;
pub use assigner::{AssignmentOutcome, LoadBalancer};
pub use candidate_pool::{CandidateIndex, CandidatePoolBuilder};
pub use completion::{CompletionOutcome, CompletionService};
pub use eligibility::{Eligibility, EligibilityEngine};
pub use eligibility_core::EligibilityCore;
pub use error::{EngineError, EngineResult};
pub use orchestrator::ScheduleOrchestrator;
pub use priority::{Candidate, PriorityRanker, DEFAULT_TIER};
