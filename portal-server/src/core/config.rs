use std::path::PathBuf;

use chrono_tz::Tz;

/// 服务器配置 - 预约门户的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | DATABASE_PATH | {WORK_DIR}/portal.db | SQLite 数据库文件 |
/// | TIMEZONE | UTC | 业务时区 (营业时间、周期预约、统计) |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_DIR | - | 设置后按天滚动写入日志文件 |
/// | NOTIFY_BUFFER | 256 | 通知通道容量 |
/// | MAX_OCCURRENCES | 1000 | 周期预约默认最大生成数 |
/// | RECURRENCE_HORIZON_YEARS | 10 | 周期预约默认结束年限 |
/// | DATE_RANGE_LIMIT_DAYS | 31 | 非管理员日期范围查询上限 |
///
/// # 示例
///
/// ```ignore
/// TIMEZONE=Europe/Madrid DATABASE_PATH=/tmp/portal.db cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// SQLite 数据库路径
    pub database_path: String,
    /// 业务时区
    pub timezone: Tz,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 日志级别
    pub log_level: String,
    /// 日志目录 (None = 仅控制台)
    pub log_dir: Option<String>,
    /// 通知通道容量
    pub notify_buffer: usize,
    /// 周期预约默认最大生成数
    pub max_occurrences: u32,
    /// 周期预约未设置结束日期时的年限
    pub recurrence_horizon_years: u32,
    /// 非管理员日期范围查询上限 (天)
    pub date_range_limit_days: i64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| {
            PathBuf::from(&work_dir)
                .join("portal.db")
                .to_string_lossy()
                .into_owned()
        });

        Self {
            database_path,
            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|tz| {
                    tz.parse::<Tz>()
                        .inspect_err(|e| tracing::warn!("Invalid TIMEZONE '{}': {}", tz, e))
                        .ok()
                })
                .unwrap_or(Tz::UTC),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            notify_buffer: std::env::var("NOTIFY_BUFFER")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(256),
            max_occurrences: std::env::var("MAX_OCCURRENCES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1000),
            recurrence_horizon_years: std::env::var("RECURRENCE_HORIZON_YEARS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10),
            date_range_limit_days: std::env::var("DATE_RANGE_LIMIT_DAYS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(31),
            work_dir,
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(database_path: impl Into<String>, timezone: Tz) -> Self {
        let mut config = Self::from_env();
        config.database_path = database_path.into();
        config.timezone = timezone;
        config
    }

    /// 确保工作目录存在
    pub fn ensure_work_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        if let Some(parent) = PathBuf::from(&self.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_overrides() {
        let config = Config::with_overrides("/tmp/x.db", chrono_tz::Europe::Madrid);
        assert_eq!(config.database_path, "/tmp/x.db");
        assert_eq!(config.timezone, chrono_tz::Europe::Madrid);
        assert!(config.max_occurrences > 0);
    }
}
