//! Scheduling Portal Server - 供应商送货预约门户核心
//!
//! # 架构概述
//!
//! - **调度引擎** (`scheduling`): 营业时间校验、冲突检测、状态机、周期展开、排班槽位
//! - **服务层** (`services`): 预约编排、周期模板、排班、通知信号
//! - **数据库** (`db`): SQLite (sqlx) 存储与迁移，触发器保证同一资源无重叠
//!
//! # 模块结构
//!
//! ```text
//! portal-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── scheduling/    # 纯业务规则
//! ├── services/      # 编排服务
//! ├── db/            # 连接池与仓储
//! └── utils/         # 日志、时间、校验
//! ```

pub mod core;
pub mod db;
pub mod scheduling;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use scheduling::{SchedulingError, SchedulingResult};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger};

/// 按配置初始化日志
pub fn setup_environment(config: &Config) -> anyhow::Result<()> {
    init_logger(
        &config.log_level,
        config.is_production(),
        config.log_dir.as_deref(),
    )
}

pub fn print_banner() {
    println!(
        r#"
    ____             __        __
   / __ \____  _____/ /_____ _/ /
  / /_/ / __ \/ ___/ __/ __ `/ /
 / ____/ /_/ / /  / /_/ /_/ / /
/_/    \____/_/   \__/\__,_/_/
    "#
    );
}
