use std::sync::Arc;

use tokio::sync::mpsc;

use crate::core::Config;
use crate::core::error::Result;
use crate::db::DbService;
use crate::db::repository::SqliteStore;
use crate::scheduling::ExpansionLimits;
use crate::services::{
    AppointmentEvent, AppointmentService, AvailabilityService, ChannelNotifier, RecurringService,
};

/// 服务器状态 - 持有所有服务的单例引用
///
/// 使用 Arc 实现浅拷贝，克隆成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | store | SqliteStore | 存储实现 (目录、预约、模板、槽位) |
/// | appointments | Arc<AppointmentService> | 预约编排 |
/// | recurring | Arc<RecurringService> | 周期模板 |
/// | availability | Arc<AvailabilityService> | 排班槽位 |
/// | notifier | ChannelNotifier | 通知信号发送端 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub store: SqliteStore,
    pub appointments: Arc<AppointmentService>,
    pub recurring: Arc<RecurringService>,
    pub availability: Arc<AvailabilityService>,
    pub notifier: ChannelNotifier,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("database_path", &self.config.database_path)
            .field("timezone", &self.config.timezone)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 创建工作目录、打开数据库并执行迁移，然后装配服务。
    /// 返回的 Receiver 交给 `NotificationWorker` 消费。
    pub async fn initialize(
        config: &Config,
    ) -> Result<(Self, mpsc::Receiver<AppointmentEvent>)> {
        config.ensure_work_dir()?;
        let db = DbService::new(&config.database_path).await?;
        Ok(Self::with_db(config, db))
    }

    /// 使用已打开的数据库装配服务（测试使用内存库）
    pub fn with_db(config: &Config, db: DbService) -> (Self, mpsc::Receiver<AppointmentEvent>) {
        let store = SqliteStore::new(db.pool.clone());
        let shared_store = Arc::new(store.clone());
        let (notifier, rx) = ChannelNotifier::new(config.notify_buffer);
        let shared_notifier = Arc::new(notifier.clone());

        let appointments = Arc::new(AppointmentService::new(
            shared_store.clone(),
            shared_store.clone(),
            shared_store.clone(),
            shared_notifier.clone(),
            config.timezone,
            config.date_range_limit_days,
        ));
        let recurring = Arc::new(RecurringService::new(
            shared_store.clone(),
            shared_store.clone(),
            shared_store.clone(),
            shared_notifier,
            config.timezone,
            ExpansionLimits {
                max_occurrences: config.max_occurrences,
                horizon_years: config.recurrence_horizon_years,
            },
        ));
        let availability = Arc::new(AvailabilityService::new(
            shared_store.clone(),
            shared_store,
        ));

        let state = Self {
            config: config.clone(),
            db,
            store,
            appointments,
            recurring,
            availability,
            notifier,
        };
        (state, rx)
    }
}
