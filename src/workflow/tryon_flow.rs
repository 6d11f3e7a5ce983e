//! 试穿提交流程 - 流程编排层
//!
//! 职责：
//! 1. 按固定状态机推进一次提交：组包 → 发送 → 归一化 → 完成
//! 2. 归一化一拿到结果就进入 Done，落库在后台任务里跑，
//!    落库的快慢和成败都不影响流程结论
//! 3. 中止的流程恰好记录一条失败原因

use std::collections::HashMap;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::clients::StudioClient;
use crate::error::{AppError, AppResult};
use crate::models::asset::Asset;
use crate::models::outcome::{BatchOutcome, PersistenceResult};
use crate::models::Category;
use crate::services::persistence::{ArtifactStore, EntryHints, PersistencePipeline};
use crate::services::reconciler::Reconciler;
use crate::services::request_builder::{OutboundRequest, RequestBuilder};
use crate::workflow::session::SelectionSession;

/// 流程状态
///
/// Done 在 BatchOutcome 归一化完成时到达；Persisting 只表示
/// 后台还有落库任务没收尾，不是 Done 的前置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Building,
    Submitted,
    Reconciling,
    Done,
    Failed,
}

/// 试穿提交流程
pub struct TryOnWorkflow<S: ArtifactStore> {
    studio: StudioClient,
    builder: RequestBuilder,
    reconciler: Reconciler,
    pipeline: PersistencePipeline<S>,
    state: WorkflowState,
    failure_reason: Option<String>,
    persistence_handle: Option<JoinHandle<Vec<PersistenceResult>>>,
}

impl<S: ArtifactStore> TryOnWorkflow<S> {
    /// 创建新流程
    pub fn new(studio: StudioClient, pipeline: PersistencePipeline<S>) -> Self {
        Self {
            studio,
            builder: RequestBuilder::new(),
            reconciler: Reconciler::new(),
            pipeline,
            state: WorkflowState::Idle,
            failure_reason: None,
            persistence_handle: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    // ========== 三条归一化提交路径 ==========

    /// 单件抠图：一张图 → 单结果形状 → 后台落库
    pub async fn run_extract_single(&mut self, photo: &Asset) -> AppResult<BatchOutcome> {
        let request = self.begin(|builder| {
            builder.build("image", std::slice::from_ref(photo), &[])
        })?;

        let raw = self.submit(request, |studio, form| async move {
            studio.extract_single_item(form).await
        }).await?;

        let outcome = self.reconcile(&raw)?;
        self.spawn_persistence(&outcome, Category::Extracted, HashMap::new());
        self.finish(&outcome);
        Ok(outcome)
    }

    /// 整套试穿一个选择会话
    ///
    /// 标准试穿路径：会话里选好的衣物取快照（选择顺序在快照中
    /// 已经定死），跟在人像后面提交。会话的容量上限在选中时
    /// 已经挡过，这里不再数
    pub async fn run_try_on(
        &mut self,
        subject: &Asset,
        session: &SelectionSession,
    ) -> AppResult<BatchOutcome> {
        self.run_composite_apply(subject, &session.snapshot()).await
    }

    /// 整套试穿：人像在前、衣物按选择顺序 → 顺序迭代形状
    ///
    /// 试穿结果是合成图，不落库
    pub async fn run_composite_apply(
        &mut self,
        subject: &Asset,
        items: &[Asset],
    ) -> AppResult<BatchOutcome> {
        let request = self.begin(|builder| builder.build_composite(subject, items))?;

        let raw = self.submit(request, |studio, form| async move {
            studio.composite_apply(form).await
        }).await?;

        let outcome = self.reconcile(&raw)?;
        self.finish(&outcome);
        Ok(outcome)
    }

    /// 批量抠图：一张图 + 标签列表 → 并发批量形状 → 后台落库
    ///
    /// # 参数
    /// * `labels` - 要抠出的单品名称（通常来自 itemize）
    /// * `default_category` - hints 没覆盖到的单品落库时用的类目
    /// * `hints` - 按标签补充落库用的类目/颜色
    pub async fn run_batch_extract(
        &mut self,
        photo: &Asset,
        labels: &[String],
        default_category: Category,
        hints: HashMap<String, EntryHints>,
    ) -> AppResult<BatchOutcome> {
        let labels_json = serde_json::to_string(labels)
            .map_err(|e| AppError::Other(format!("标签列表序列化失败: {}", e)))?;
        let params = [("clothing_items".to_string(), labels_json)];

        let request = self.begin(|builder| {
            builder.build("image", std::slice::from_ref(photo), &params)
        })?;

        let raw = self.submit(request, |studio, form| async move {
            studio.batch_extract_items(form).await
        }).await?;

        let outcome = self.reconcile(&raw)?;
        self.spawn_persistence(&outcome, default_category, hints);
        self.finish(&outcome);
        Ok(outcome)
    }

    // ========== 状态机步骤 ==========

    /// Idle → Building，失败则终止于 Failed(EmptyPayload)
    fn begin<F>(&mut self, build: F) -> AppResult<OutboundRequest>
    where
        F: FnOnce(&RequestBuilder) -> Result<OutboundRequest, crate::error::BuildError>,
    {
        self.state = WorkflowState::Building;
        self.failure_reason = None;
        self.persistence_handle = None;

        match build(&self.builder) {
            Ok(request) => {
                info!("🚀 请求组包完成，共 {} 个图片部分", request.file_count());
                Ok(request)
            }
            Err(e) => {
                let err = AppError::from(e);
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Building → Submitted，传输错误终止于 Failed
    async fn submit<F, Fut>(&mut self, request: OutboundRequest, send: F) -> AppResult<serde_json::Value>
    where
        F: FnOnce(StudioClient, reqwest::multipart::Form) -> Fut,
        Fut: std::future::Future<Output = Result<serde_json::Value, crate::error::TransportError>>,
    {
        let form = match request.into_form() {
            Ok(form) => form,
            Err(e) => {
                let err = AppError::Other(format!("表单构造失败: {}", e));
                self.fail(&err);
                return Err(err);
            }
        };

        self.state = WorkflowState::Submitted;
        match send(self.studio.clone(), form).await {
            Ok(raw) => Ok(raw),
            Err(e) => {
                let err = AppError::from(e);
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Submitted → Reconciling，形状不可识别终止于 Failed
    fn reconcile(&mut self, raw: &serde_json::Value) -> AppResult<BatchOutcome> {
        self.state = WorkflowState::Reconciling;
        match self.reconciler.reconcile(raw) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                let err = AppError::from(e);
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// 后台落库，不阻塞 Done
    fn spawn_persistence(
        &mut self,
        outcome: &BatchOutcome,
        default_category: Category,
        hints: HashMap<String, EntryHints>,
    ) {
        if !outcome.has_success() {
            return;
        }
        let pipeline = self.pipeline.clone();
        let outcome = outcome.clone();
        self.persistence_handle = Some(tokio::spawn(async move {
            pipeline.persist(&outcome, default_category, &hints).await
        }));
    }

    fn finish(&mut self, outcome: &BatchOutcome) {
        info!(
            "📊 提交完成: {}/{} 成功",
            outcome.success_count, outcome.total_count
        );
        self.state = WorkflowState::Done;
    }

    fn fail(&mut self, err: &AppError) {
        // 只记第一条失败原因
        if self.failure_reason.is_none() {
            self.failure_reason = Some(err.to_string());
        }
        warn!("❌ 流程中止: {}", err);
        self.state = WorkflowState::Failed;
    }

    /// 后台落库是否仍在进行
    ///
    /// 落库不占状态机节点（Done 不等它）；进行中与否
    /// 通过这个标志单独观察
    pub fn is_persisting(&self) -> bool {
        self.persistence_handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// 等后台落库收尾，返回逐件结果
    ///
    /// 没有在跑的落库任务时返回空；任务 panic 时记日志并返回空
    pub async fn await_persistence(&mut self) -> Vec<PersistenceResult> {
        match self.persistence_handle.take() {
            Some(handle) => match handle.await {
                Ok(results) => results,
                Err(e) => {
                    warn!("❌ 落库任务异常退出: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        }
    }

    // ========== 只读辅助接口（不走状态机） ==========

    /// 质量检查：判断照片适不适合抠图
    pub async fn classify(&self, photo: &Asset) -> AppResult<crate::models::wire::QualityCheckResponse> {
        let form = self
            .builder
            .build("image", std::slice::from_ref(photo), &[])?
            .into_form()
            .map_err(|e| AppError::Other(format!("表单构造失败: {}", e)))?;
        Ok(self.studio.classify(form).await?)
    }

    /// 拆解整套穿搭，列出其中的单品
    pub async fn itemize(&self, photo: &Asset) -> AppResult<crate::models::wire::ItemizeResponse> {
        let form = self
            .builder
            .build("image", std::slice::from_ref(photo), &[])?
            .into_form()
            .map_err(|e| AppError::Other(format!("表单构造失败: {}", e)))?;
        Ok(self.studio.itemize(form).await?)
    }

    /// 整套穿搭直接入橱
    pub async fn wardrobe_ingest(&self, photo: &Asset) -> AppResult<crate::models::wire::WardrobeIngestResponse> {
        let form = self
            .builder
            .build("image", std::slice::from_ref(photo), &[])?
            .into_form()
            .map_err(|e| AppError::Other(format!("表单构造失败: {}", e)))?;
        Ok(self.studio.wardrobe_ingest(form).await?)
    }
}
