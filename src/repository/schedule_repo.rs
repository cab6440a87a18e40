// ==========================================
// 设备预防性维护周排程引擎 - 周排程条目仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: replace_week 必须在事务中完成,失败整体回滚;
//       只删除 Scheduled,永不触碰 Completed
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::schedule::ScheduleEntry;
use crate::domain::types::{PmCategory, ScheduleStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ScheduleRepository - 周排程条目仓储
// ==========================================
pub struct ScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRepository {
    /// 创建新的 ScheduleRepository 实例
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

    /// 查询目标周的全部条目(含 Completed)
    pub fn find_by_week(&self, week_start: NaiveDate) -> RepositoryResult<Vec<ScheduleEntry>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT id, week_start, equipment_no, pm_category, assigned_technician,
                      scheduled_date, status, run_id, created_at
               FROM weekly_pm_schedule
               WHERE week_start = ?
               ORDER BY equipment_no, pm_category"#,
        )?;

        let entries = stmt
            .query_map(
                params![week_start.format("%Y-%m-%d").to_string()],
                Self::map_row,
            )?
            .collect::<Result<Vec<ScheduleEntry>, _>>()?;

        Ok(entries)
    }

    /// 查询排定日期在 cutoff 当日及之后、仍为 Scheduled 的条目(跨周)
    ///
    /// 用途: "已有未完成排程"判定 —— cutoff 之前的陈旧 Scheduled
    /// 条目视为已放弃,不再阻塞重新排程
    pub fn find_pending_on_or_after(
        &self,
        cutoff: NaiveDate,
    ) -> RepositoryResult<Vec<ScheduleEntry>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT id, week_start, equipment_no, pm_category, assigned_technician,
                      scheduled_date, status, run_id, created_at
               FROM weekly_pm_schedule
               WHERE status = 'SCHEDULED' AND scheduled_date >= ?
               ORDER BY equipment_no, pm_category, scheduled_date"#,
        )?;

        let entries = stmt
            .query_map(
                params![cutoff.format("%Y-%m-%d").to_string()],
                Self::map_row,
            )?
            .collect::<Result<Vec<ScheduleEntry>, _>>()?;

        Ok(entries)
    }

    /// 以新条目集整体替换目标周的排程
    ///
    /// 事务语义:
    /// 1. 删除该周仍为 Scheduled 的既有条目(Completed 保留)
    /// 2. 插入新条目
    /// 任一步失败整体回滚 —— 不可见部分写入,使同周再生成幂等
    ///
    /// # 返回
    /// - `Ok(created)`: 新插入的条目数
    pub fn replace_week(
        &self,
        week_start: NaiveDate,
        entries: &[ScheduleEntry],
    ) -> RepositoryResult<usize> {
        // 守卫: 条目必须都属于目标周
        for entry in entries {
            if entry.week_start != week_start {
                return Err(RepositoryError::ValidationError(format!(
                    "条目周起始 {} 与目标周 {} 不一致 (equipment_no={})",
                    entry.week_start, week_start, entry.equipment_no
                )));
            }
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            "DELETE FROM weekly_pm_schedule WHERE week_start = ? AND status = 'SCHEDULED'",
            params![week_start.format("%Y-%m-%d").to_string()],
        )?;

        for entry in entries {
            tx.execute(
                r#"INSERT INTO weekly_pm_schedule (
                    week_start, equipment_no, pm_category, assigned_technician,
                    scheduled_date, status, run_id, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
                params![
                    entry.week_start.format("%Y-%m-%d").to_string(),
                    &entry.equipment_no,
                    entry.pm_category.as_str(),
                    &entry.assigned_technician,
                    entry.scheduled_date.format("%Y-%m-%d").to_string(),
                    entry.status.as_str(),
                    &entry.run_id,
                    entry.created_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(entries.len())
    }

    /// 映射数据库行到 ScheduleEntry 对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ScheduleEntry> {
        let parse_date = |idx: usize, s: String| -> rusqlite::Result<NaiveDate> {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
        };

        Ok(ScheduleEntry {
            id: Some(row.get(0)?),
            week_start: parse_date(1, row.get(1)?)?,
            equipment_no: row.get(2)?,
            pm_category: PmCategory::from_str(&row.get::<_, String>(3)?).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    e.into(),
                )
            })?,
            assigned_technician: row.get(4)?,
            scheduled_date: parse_date(5, row.get(5)?)?,
            status: ScheduleStatus::from_str(&row.get::<_, String>(6)?).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    6,
                    rusqlite::types::Type::Text,
                    e.into(),
                )
            })?,
            run_id: row.get(7)?,
            created_at: row
                .get::<_, String>(8)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        8,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
        })
    }
}
