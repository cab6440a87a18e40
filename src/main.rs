// ==========================================
// 设备预防性维护周排程引擎 - CLI 入口
// ==========================================
// 用法:
//   pm-weekly-aps <technicians_csv> [db_path] [week_start] [excluded_csv]
//
// 示例:
//   pm-weekly-aps "张伟,李娜,王强" pm_weekly_aps.db 2025-06-02 "李娜"
//
// 周起始缺省为下一个周一;数据库缺省为用户数据目录
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Duration, Local, NaiveDate};
use pm_weekly_aps::config::ConfigManager;
use pm_weekly_aps::db::{init_schema, open_sqlite_connection};
use pm_weekly_aps::domain::WeeklyScheduleRequest;
use pm_weekly_aps::engine::ScheduleOrchestrator;
use pm_weekly_aps::importer::load_priority_tiers;
use pm_weekly_aps::logging;
use std::sync::{Arc, Mutex};

/// 缺省数据库路径(用户数据目录)
fn default_db_path() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("pm_weekly_aps").join("pm_weekly_aps.db"))
        .and_then(|p| p.to_str().map(|s| s.to_string()))
        .unwrap_or_else(|| "pm_weekly_aps.db".to_string())
}

/// 下一个周一(今天是周一则取今天)
fn next_monday(today: NaiveDate) -> NaiveDate {
    let offset = (7 - today.weekday().num_days_from_monday()) % 7;
    today + Duration::days(offset as i64)
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", pm_weekly_aps::APP_NAME);
    tracing::info!("系统版本: {}", pm_weekly_aps::VERSION);
    tracing::info!("==================================================");

    let mut args = std::env::args().skip(1);

    let technicians: Vec<String> = args
        .next()
        .map(|s| {
            s.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();
    if technicians.is_empty() {
        bail!("用法: pm-weekly-aps <technicians_csv> [db_path] [week_start] [excluded_csv]");
    }

    let db_path = args.next().unwrap_or_else(default_db_path);

    let week_start = match args.next() {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .with_context(|| format!("周起始日期格式非法: {}", raw))?,
        None => next_monday(Local::now().date_naive()),
    };

    let excluded: Vec<String> = args
        .next()
        .map(|s| {
            s.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    tracing::info!("使用数据库: {}", db_path);

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    init_schema(&conn).context("schema 初始化失败")?;
    let conn = Arc::new(Mutex::new(conn));

    let config = Arc::new(
        ConfigManager::from_connection(conn.clone())
            .map_err(|e| anyhow::anyhow!("配置管理器初始化失败: {}", e))?,
    );
    let orchestrator = ScheduleOrchestrator::new(conn, config);

    let mut request = WeeklyScheduleRequest::new(week_start, technicians);
    request.excluded_technicians = excluded;

    // 工作目录下的分档清单文件(可选): pm_list_1.csv / pm_list_2.csv / pm_list_3.csv
    request.priority_tiers = load_priority_tiers(&[
        ("pm_list_1.csv", 1),
        ("pm_list_2.csv", 2),
        ("pm_list_3.csv", 3),
    ])
    .map_err(|e| anyhow::anyhow!("优先级清单加载失败: {}", e))?;

    let summary = orchestrator.generate_weekly_schedule(&request).await?;

    // 机器可读输出,供外部 UI/报表层消费
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
