// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

use chrono::{NaiveDate, Utc};
use pm_weekly_aps::db::{init_schema, open_sqlite_connection};
use pm_weekly_aps::domain::types::{EquipmentStatus, PmCategory};
use pm_weekly_aps::domain::{CompletionRecord, EquipmentRecord};
use pm_weekly_aps::repository::{CompletionRepository, EquipmentRepository};
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = Connection::open(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享测试连接(统一 PRAGMA)
pub fn open_shared_connection(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    let conn = open_sqlite_connection(db_path)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 构造一台测试设备(ACTIVE,三类 PM 全关,日期全空)
pub fn make_equipment(equipment_no: &str) -> EquipmentRecord {
    EquipmentRecord {
        equipment_no: equipment_no.to_string(),
        description: format!("测试设备 {}", equipment_no),
        location: Some("车间A".to_string()),
        status: EquipmentStatus::Active,
        monthly_pm: false,
        six_month_pm: false,
        annual_pm: false,
        last_monthly_pm: None,
        last_six_month_pm: None,
        last_annual_pm: None,
        next_monthly_pm: None,
        next_six_month_pm: None,
        next_annual_pm: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// 插入设备记录
pub fn insert_equipment(
    conn: Arc<Mutex<Connection>>,
    record: &EquipmentRecord,
) -> Result<(), Box<dyn Error>> {
    let repo = EquipmentRepository::from_connection(conn);
    repo.insert(record)?;
    Ok(())
}

/// 插入完成记录
pub fn insert_completion(
    conn: Arc<Mutex<Connection>>,
    equipment_no: &str,
    category: PmCategory,
    technician: &str,
    completion_date: NaiveDate,
) -> Result<(), Box<dyn Error>> {
    let repo = CompletionRepository::from_connection(conn);
    repo.insert(&CompletionRecord::new(
        equipment_no,
        category,
        technician,
        completion_date,
        60,
    ))?;
    Ok(())
}

/// 目标测试周(2025-06-02 为周一)
pub fn test_monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

/// 构造一条排程条目
pub fn make_entry(
    week_start: NaiveDate,
    equipment_no: &str,
    category: PmCategory,
    technician: &str,
    scheduled_date: NaiveDate,
    status: pm_weekly_aps::domain::types::ScheduleStatus,
) -> pm_weekly_aps::domain::ScheduleEntry {
    pm_weekly_aps::domain::ScheduleEntry {
        id: None,
        week_start,
        equipment_no: equipment_no.to_string(),
        pm_category: category,
        assigned_technician: technician.to_string(),
        scheduled_date,
        status,
        run_id: None,
        created_at: Utc::now(),
    }
}
