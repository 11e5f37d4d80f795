use thiserror::Error;

/// 启动与运行期错误（请求级错误见 `SchedulingError`）
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("工作目录创建失败: {0}")]
    WorkDir(#[from] std::io::Error),

    #[error("数据库初始化失败: {0}")]
    Database(String),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<shared::error::AppError> for ServerError {
    fn from(err: shared::error::AppError) -> Self {
        ServerError::Database(err.message)
    }
}

/// 启动流程的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
