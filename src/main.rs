use anyhow::Result;
use wardrobe_tryon::orchestrator::App;
use wardrobe_tryon::utils::logging;
use wardrobe_tryon::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
