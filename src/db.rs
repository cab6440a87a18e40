// ==========================================
// 设备预防性维护周排程引擎 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供 schema 引导（首次运行建表）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化数据库 schema（幂等）
///
/// 约束：
/// - weekly_pm_schedule 上的部分唯一索引保证
///   同一周 + 同一设备 + 同一 PM 类别 至多一条 Scheduled 记录
/// - Completed 记录不受该索引约束（历史完成可多条）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key),
            FOREIGN KEY (scope_id) REFERENCES config_scope(scope_id)
        );

        CREATE TABLE IF NOT EXISTS equipment (
            equipment_no TEXT PRIMARY KEY,
            description TEXT NOT NULL DEFAULT '',
            location TEXT,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            monthly_pm INTEGER NOT NULL DEFAULT 0,
            six_month_pm INTEGER NOT NULL DEFAULT 0,
            annual_pm INTEGER NOT NULL DEFAULT 0,
            last_monthly_pm TEXT,
            last_six_month_pm TEXT,
            last_annual_pm TEXT,
            next_monthly_pm TEXT,
            next_six_month_pm TEXT,
            next_annual_pm TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS pm_completion (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            equipment_no TEXT NOT NULL,
            pm_category TEXT NOT NULL,
            technician TEXT NOT NULL,
            completion_date TEXT NOT NULL,
            labor_minutes INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (equipment_no) REFERENCES equipment(equipment_no)
        );

        CREATE INDEX IF NOT EXISTS idx_pm_completion_equipment
            ON pm_completion(equipment_no, pm_category, completion_date);

        CREATE TABLE IF NOT EXISTS weekly_pm_schedule (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            week_start TEXT NOT NULL,
            equipment_no TEXT NOT NULL,
            pm_category TEXT NOT NULL,
            assigned_technician TEXT NOT NULL,
            scheduled_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'SCHEDULED',
            run_id TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (equipment_no) REFERENCES equipment(equipment_no)
        );

        CREATE UNIQUE INDEX IF NOT EXISTS uniq_schedule_pending_pair
            ON weekly_pm_schedule(week_start, equipment_no, pm_category)
            WHERE status = 'SCHEDULED';

        CREATE INDEX IF NOT EXISTS idx_schedule_week
            ON weekly_pm_schedule(week_start, status);

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(1));
    }
}
