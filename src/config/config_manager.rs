// ==========================================
// 设备预防性维护周排程引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::scheduler_config_trait::SchedulerConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    /// 每周新建排程条目上限
    pub const WEEKLY_PM_TARGET: &str = "weekly_pm_target";
    /// 到期前瞻窗口(天)
    pub const LOOK_AHEAD_DAYS: &str = "look_ahead_days";
    /// 未完成排程宽限窗口(天)
    pub const PENDING_GRACE_DAYS: &str = "pending_grace_days";
    /// 完成历史回看窗口(天)
    pub const COMPLETION_LOOKBACK_DAYS: &str = "completion_lookback_days";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值（scope_id='global'，UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value, updated_at)
               VALUES ('global', ?1, ?2, datetime('now'))
               ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')"#,
            params![key, value],
        )?;

        Ok(())
    }

    /// 读取整数配置,缺失时用默认值
    fn get_i64_or_default(&self, key: &str, default: i64) -> Result<i64, Box<dyn Error>> {
        match self.get_config_value(key)? {
            Some(raw) => {
                let parsed = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| format!("配置 {} 值非法 ({}): {}", key, raw, e))?;
                Ok(parsed)
            }
            None => Ok(default),
        }
    }
}

// ==========================================
// SchedulerConfigReader 实现
// ==========================================
#[async_trait]
impl SchedulerConfigReader for ConfigManager {
    async fn get_weekly_pm_target(&self) -> Result<usize, Box<dyn Error>> {
        let v = self.get_i64_or_default(config_keys::WEEKLY_PM_TARGET, 130)?;
        if v < 0 {
            return Err(format!("weekly_pm_target 不可为负: {}", v).into());
        }
        Ok(v as usize)
    }

    async fn get_look_ahead_days(&self) -> Result<i64, Box<dyn Error>> {
        self.get_i64_or_default(config_keys::LOOK_AHEAD_DAYS, 7)
    }

    async fn get_pending_grace_days(&self) -> Result<i64, Box<dyn Error>> {
        self.get_i64_or_default(config_keys::PENDING_GRACE_DAYS, 14)
    }

    async fn get_completion_lookback_days(&self) -> Result<i64, Box<dyn Error>> {
        self.get_i64_or_default(config_keys::COMPLETION_LOOKBACK_DAYS, 400)
    }
}
