use std::sync::Arc;

use wardrobe_tryon::clients::{StudioClient, WardrobeClient};
use wardrobe_tryon::models::Asset;
use wardrobe_tryon::services::{AssetResolver, PersistencePipeline};
use wardrobe_tryon::utils::logging;
use wardrobe_tryon::workflow::{SelectionSession, TryOnWorkflow, WorkflowState};
use wardrobe_tryon::Config;

#[tokio::test]
#[ignore] // 默认忽略，需要本地后端运行：cargo test -- --ignored
async fn test_extract_single_item_live() {
    // 初始化日志
    logging::init(true);

    // 加载配置
    let config = Config::from_env();

    // 注意：请根据实际情况修改照片路径
    let photo_path = "test_assets/single_shirt.png";
    let bytes = tokio::fs::read(photo_path).await.expect("读取测试照片失败");
    let photo = Asset::local(0, "single_shirt.png", bytes, "image/png");

    let studio = StudioClient::new(&config).expect("创建客户端失败");
    let wardrobe = Arc::new(WardrobeClient::new(&config).expect("创建客户端失败"));
    let mut flow = TryOnWorkflow::new(studio, PersistencePipeline::new(wardrobe));

    let outcome = flow.run_extract_single(&photo).await.expect("单件抠图失败");
    assert_eq!(outcome.total_count, 1);
    assert_eq!(flow.state(), WorkflowState::Done);

    // 等后台落库收尾
    let persisted = flow.await_persistence().await;
    println!("落库结果: {:?}", persisted);
}

#[tokio::test]
#[ignore]
async fn test_fetch_categorized_wardrobe_live() {
    // 初始化日志
    logging::init(true);

    // 加载配置
    let config = Config::from_env();

    let wardrobe = WardrobeClient::new(&config).expect("创建客户端失败");
    let listing = wardrobe.fetch_categorized().await.expect("读取衣橱目录失败");

    assert!(listing.success, "衣橱目录接口应该返回成功");
    let total: usize = listing.categories.values().map(|v| v.len()).sum();
    println!("衣橱中共 {} 件单品，分布在 {} 个类别", total, listing.categories.len());
}

#[tokio::test]
#[ignore]
async fn test_try_on_from_wardrobe_session_live() {
    // 初始化日志
    logging::init(true);

    // 加载配置
    let config = Config::from_env();

    // 注意：请根据实际情况修改照片路径
    let photo_path = "test_assets/person.png";
    let bytes = tokio::fs::read(photo_path).await.expect("读取人像照片失败");
    let subject = Asset::local(0, "person.png", bytes, "image/png");

    let studio = StudioClient::new(&config).expect("创建客户端失败");
    let wardrobe = Arc::new(WardrobeClient::new(&config).expect("创建客户端失败"));

    // 从衣橱目录里挑衣物，数量由配置的上限约束
    let listing = wardrobe.fetch_categorized().await.expect("读取衣橱目录失败");
    let mut session = SelectionSession::from_config(&config);
    let resolver = AssetResolver::new();
    for item in listing.categories.values().flatten() {
        if session.resolved_len() >= config.max_clothing_items {
            break;
        }
        session.select_remote(&resolver, &wardrobe, item).await;
    }
    assert!(
        session.resolved_len() > 0,
        "衣橱里应该至少有一件可解析的衣物"
    );

    // 整套试穿：人像在前，衣物按选择顺序跟在后面
    let mut flow = TryOnWorkflow::new(studio, PersistencePipeline::new(wardrobe));
    let outcome = flow.run_try_on(&subject, &session).await.expect("试穿失败");

    assert_eq!(flow.state(), WorkflowState::Done);
    assert_eq!(outcome.total_count, session.resolved_len());
    println!(
        "试穿完成: {}/{} 次迭代成功",
        outcome.success_count, outcome.total_count
    );
}

#[tokio::test]
#[ignore]
async fn test_check_clothing_quality_live() {
    // 初始化日志
    logging::init(true);

    // 加载配置
    let config = Config::from_env();

    let photo_path = "test_assets/single_shirt.png";
    let bytes = tokio::fs::read(photo_path).await.expect("读取测试照片失败");
    let photo = Asset::local(0, "single_shirt.png", bytes, "image/png");

    let studio = StudioClient::new(&config).expect("创建客户端失败");
    let wardrobe = Arc::new(WardrobeClient::new(&config).expect("创建客户端失败"));
    let flow = TryOnWorkflow::new(studio, PersistencePipeline::new(wardrobe));

    let quality = flow.classify(&photo).await.expect("质量检查失败");
    assert!(quality.success, "质量检查接口应该返回成功");
}

#[tokio::test]
#[ignore]
async fn test_add_fit_to_wardrobe_live() {
    // 初始化日志
    logging::init(true);

    // 加载配置
    let config = Config::from_env();

    let photo_path = "test_assets/full_outfit.png";
    let bytes = tokio::fs::read(photo_path).await.expect("读取测试照片失败");
    let photo = Asset::local(0, "full_outfit.png", bytes, "image/png");

    let studio = StudioClient::new(&config).expect("创建客户端失败");
    let wardrobe = Arc::new(WardrobeClient::new(&config).expect("创建客户端失败"));
    let flow = TryOnWorkflow::new(studio, PersistencePipeline::new(wardrobe));

    let ingest = flow.wardrobe_ingest(&photo).await.expect("整套入橱失败");
    println!(
        "识别 {} 件，入橱 {} 件",
        ingest.total_items_found, ingest.items_saved
    );
    assert!(ingest.success, "整套入橱接口应该返回成功");
}

#[tokio::test]
#[ignore]
async fn test_itemize_then_batch_extract_live() {
    // 初始化日志
    logging::init(true);

    // 加载配置
    let config = Config::from_env();

    let photo_path = "test_assets/full_outfit.png";
    let bytes = tokio::fs::read(photo_path).await.expect("读取测试照片失败");
    let photo = Asset::local(0, "full_outfit.png", bytes, "image/png");

    let studio = StudioClient::new(&config).expect("创建客户端失败");
    let wardrobe = Arc::new(WardrobeClient::new(&config).expect("创建客户端失败"));
    let flow = TryOnWorkflow::new(studio, PersistencePipeline::new(wardrobe));

    let itemized = flow.itemize(&photo).await.expect("拆解失败");
    assert!(itemized.success, "拆解接口应该返回成功");

    let labels: Vec<String> = itemized
        .clothing_items
        .iter()
        .chain(itemized.accessories.iter())
        .map(|e| e.name().to_string())
        .collect();
    println!("拆解出 {} 件单品: {:?}", labels.len(), labels);
    assert!(!labels.is_empty(), "整套穿搭照片里应该能拆出单品");
}
