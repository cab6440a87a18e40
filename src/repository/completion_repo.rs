// ==========================================
// 设备预防性维护周排程引擎 - PM 完成记录仓储
// ==========================================
// 红线: pm_completion 只追加,永不更新/删除
// 红线: Repository 不含业务逻辑;完成落库事务只执行
//       引擎层算好的写入计划,不自行推导日期
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::completion::CompletionRecord;
use crate::domain::types::PmCategory;
use crate::repository::equipment_repo::EquipmentRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// CompletionPersistPlan - 完成落库计划
// ==========================================
// 引擎层(完成服务)计算好的一次完成写入:
// 新 next_due 由年度分散器/名义周期得出,仓储只执行
#[derive(Debug, Clone)]
pub struct CompletionPersistPlan {
    pub record: CompletionRecord,
    pub next_due: NaiveDate, // 滚动后的下次到期日期
}

// ==========================================
// CompletionRepository - PM 完成记录仓储
// ==========================================
pub struct CompletionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CompletionRepository {
    /// 创建新的 CompletionRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加一条完成记录(测试种子/导入使用,不滚动设备日期)
    pub fn insert(&self, record: &CompletionRecord) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO pm_completion (
                equipment_no, pm_category, technician, completion_date,
                labor_minutes, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &record.equipment_no,
                record.pm_category.as_str(),
                &record.technician,
                record.completion_date.format("%Y-%m-%d").to_string(),
                record.labor_minutes,
                &record.notes,
                record.created_at.to_rfc3339(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// 批量读取某日期之后的全部完成记录
    ///
    /// 候选池构建的唯一完成历史读取口径:
    /// 一次整表扫描代替逐设备查询
    ///
    /// # 返回
    /// - `Ok(Vec<CompletionRecord>)`: 按 equipment_no 升序、completion_date 降序
    pub fn list_since(&self, since: NaiveDate) -> RepositoryResult<Vec<CompletionRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT id, equipment_no, pm_category, technician, completion_date,
                      labor_minutes, notes, created_at
               FROM pm_completion
               WHERE completion_date >= ?
               ORDER BY equipment_no, completion_date DESC"#,
        )?;

        let records = stmt
            .query_map(
                params![since.format("%Y-%m-%d").to_string()],
                Self::map_row,
            )?
            .collect::<Result<Vec<CompletionRecord>, _>>()?;

        Ok(records)
    }

    /// 执行一次完成落库事务
    ///
    /// 事务内三步,任一失败整体回滚:
    /// 1. 追加 pm_completion 记录
    /// 2. 滚动 equipment 的 last/next 日期
    /// 3. 将最早一条匹配的 Scheduled 周排程条目翻转为 Completed(若存在)
    ///
    /// # 返回
    /// - `Ok((completion_id, closed_entry))`: 完成记录ID 与 是否关闭了排程条目
    pub fn apply(&self, plan: &CompletionPersistPlan) -> RepositoryResult<(i64, bool)> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let record = &plan.record;

        tx.execute(
            r#"INSERT INTO pm_completion (
                equipment_no, pm_category, technician, completion_date,
                labor_minutes, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &record.equipment_no,
                record.pm_category.as_str(),
                &record.technician,
                record.completion_date.format("%Y-%m-%d").to_string(),
                record.labor_minutes,
                &record.notes,
                record.created_at.to_rfc3339(),
            ],
        )?;
        let completion_id = tx.last_insert_rowid();

        EquipmentRepository::roll_forward_dates_tx(
            &tx,
            &record.equipment_no,
            record.pm_category,
            record.completion_date,
            plan.next_due,
        )?;

        let closed = tx.execute(
            r#"UPDATE weekly_pm_schedule
               SET status = 'COMPLETED'
               WHERE id = (
                   SELECT id FROM weekly_pm_schedule
                   WHERE equipment_no = ? AND pm_category = ? AND status = 'SCHEDULED'
                   ORDER BY scheduled_date
                   LIMIT 1
               )"#,
            params![&record.equipment_no, record.pm_category.as_str()],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok((completion_id, closed > 0))
    }

    /// 映射数据库行到 CompletionRecord 对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<CompletionRecord> {
        Ok(CompletionRecord {
            id: Some(row.get(0)?),
            equipment_no: row.get(1)?,
            pm_category: PmCategory::from_str(&row.get::<_, String>(2)?).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    e.into(),
                )
            })?,
            technician: row.get(3)?,
            completion_date: NaiveDate::parse_from_str(&row.get::<_, String>(4)?, "%Y-%m-%d")
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        4,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
            labor_minutes: row.get(5)?,
            notes: row.get(6)?,
            created_at: row
                .get::<_, String>(7)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        7,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
        })
    }
}
