// ==========================================
// 设备预防性维护周排程引擎 - 设备数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::equipment::EquipmentRecord;
use crate::domain::types::PmCategory;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// EquipmentRepository - 设备主数据仓储
// ==========================================
pub struct EquipmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EquipmentRepository {
    /// 创建新的 EquipmentRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    /// 查询全部设备(含非 ACTIVE 状态)
    ///
    /// 说明:
    /// - 候选池需要完整目录,被排除状态由合格性引擎给出原因码,
    ///   而不是在查询层静默过滤
    ///
    /// # 返回
    /// - `Ok(Vec<EquipmentRecord>)`: 按 equipment_no 升序
    pub fn list_all(&self) -> RepositoryResult<Vec<EquipmentRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT equipment_no, description, location, status,
                      monthly_pm, six_month_pm, annual_pm,
                      last_monthly_pm, last_six_month_pm, last_annual_pm,
                      next_monthly_pm, next_six_month_pm, next_annual_pm,
                      created_at, updated_at
               FROM equipment
               ORDER BY equipment_no"#,
        )?;

        let records = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<EquipmentRecord>, _>>()?;

        Ok(records)
    }

    /// 按设备编号查询
    pub fn find_by_no(&self, equipment_no: &str) -> RepositoryResult<Option<EquipmentRecord>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT equipment_no, description, location, status,
                      monthly_pm, six_month_pm, annual_pm,
                      last_monthly_pm, last_six_month_pm, last_annual_pm,
                      next_monthly_pm, next_six_month_pm, next_annual_pm,
                      created_at, updated_at
               FROM equipment
               WHERE equipment_no = ?"#,
            params![equipment_no],
            Self::map_row,
        ) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 插入设备记录(设备管理 CRUD 协作方/测试种子使用)
    pub fn insert(&self, record: &EquipmentRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO equipment (
                equipment_no, description, location, status,
                monthly_pm, six_month_pm, annual_pm,
                last_monthly_pm, last_six_month_pm, last_annual_pm,
                next_monthly_pm, next_six_month_pm, next_annual_pm,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &record.equipment_no,
                &record.description,
                &record.location,
                record.status.as_str(),
                record.monthly_pm as i32,
                record.six_month_pm as i32,
                record.annual_pm as i32,
                record.last_monthly_pm.map(|d| d.format("%Y-%m-%d").to_string()),
                record.last_six_month_pm.map(|d| d.format("%Y-%m-%d").to_string()),
                record.last_annual_pm.map(|d| d.format("%Y-%m-%d").to_string()),
                record.next_monthly_pm.map(|d| d.format("%Y-%m-%d").to_string()),
                record.next_six_month_pm.map(|d| d.format("%Y-%m-%d").to_string()),
                record.next_annual_pm.map(|d| d.format("%Y-%m-%d").to_string()),
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// 该类别的 last/next 日期列名
    ///
    /// 列名映射属存储细节,留在仓储层
    fn date_columns(category: PmCategory) -> (&'static str, &'static str) {
        match category {
            PmCategory::Monthly => ("last_monthly_pm", "next_monthly_pm"),
            PmCategory::SixMonth => ("last_six_month_pm", "next_six_month_pm"),
            PmCategory::Annual => ("last_annual_pm", "next_annual_pm"),
        }
    }

    /// 在既有事务内滚动设备的 last/next 日期(完成服务专用)
    pub(crate) fn roll_forward_dates_tx(
        tx: &rusqlite::Transaction,
        equipment_no: &str,
        category: PmCategory,
        completion_date: NaiveDate,
        next_due: NaiveDate,
    ) -> RepositoryResult<()> {
        let (last_col, next_col) = Self::date_columns(category);

        let affected = tx.execute(
            &format!(
                "UPDATE equipment SET {last_col} = ?, {next_col} = ?, updated_at = datetime('now') WHERE equipment_no = ?"
            ),
            params![
                completion_date.format("%Y-%m-%d").to_string(),
                next_due.format("%Y-%m-%d").to_string(),
                equipment_no,
            ],
        )?;

        if affected != 1 {
            return Err(RepositoryError::NotFound {
                entity: "Equipment".to_string(),
                id: equipment_no.to_string(),
            });
        }

        Ok(())
    }

    /// 映射数据库行到 EquipmentRecord 对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<EquipmentRecord> {
        let parse_date = |idx: usize, value: Option<String>| -> rusqlite::Result<Option<NaiveDate>> {
            match value {
                Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map(Some)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            idx,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    }),
                None => Ok(None),
            }
        };

        Ok(EquipmentRecord {
            equipment_no: row.get(0)?,
            description: row.get(1)?,
            location: row.get(2)?,
            status: crate::domain::types::EquipmentStatus::from_str(&row.get::<_, String>(3)?)
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        e.into(),
                    )
                })?,
            monthly_pm: row.get::<_, i32>(4)? == 1,
            six_month_pm: row.get::<_, i32>(5)? == 1,
            annual_pm: row.get::<_, i32>(6)? == 1,
            last_monthly_pm: parse_date(7, row.get(7)?)?,
            last_six_month_pm: parse_date(8, row.get(8)?)?,
            last_annual_pm: parse_date(9, row.get(9)?)?,
            next_monthly_pm: parse_date(10, row.get(10)?)?,
            next_six_month_pm: parse_date(11, row.get(11)?)?,
            next_annual_pm: parse_date(12, row.get(12)?)?,
            created_at: row
                .get::<_, String>(13)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        13,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
            updated_at: row
                .get::<_, String>(14)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        14,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
        })
    }
}
