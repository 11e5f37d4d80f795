use portal_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 加载 .env 与配置
    dotenv::dotenv().ok();
    let config = Config::from_env();

    // 2. 日志
    setup_environment(&config)?;
    print_banner();
    tracing::info!("🦀 Scheduling portal starting...");

    // 3. 初始化服务器状态 (数据库 + 迁移 + 服务)
    let (state, events) = ServerState::initialize(&config).await?;

    // 4. 运行直到 Ctrl-C
    let server = Server::with_state(config, state, events);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
