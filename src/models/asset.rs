//! 素材模型
//!
//! 统一"本地上传的文件"和"衣橱里已保存的条目"两种来源，
//! 提交流程只认识 Asset，不关心它从哪里来

use serde::{Deserialize, Serialize};

use crate::models::wire::WardrobeItem;

/// 素材来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetOrigin {
    /// 用户本次上传的文件
    Local,
    /// 衣橱目录中已保存的条目
    Remote,
}

/// 素材内容（字节 + 类型 + 提交用文件名）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetPayload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

/// 衣橱条目元信息（仅远端素材携带）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteMeta {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
}

impl RemoteMeta {
    pub fn from_item(item: &WardrobeItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            primary_color: item.primary_color.clone(),
        }
    }
}

/// 一个可提交的素材
///
/// - 本地素材：id 由选择顺序生成，payload 立即可用
/// - 远端素材：id 复用衣橱条目 id；payload 在解析成功后才有，
///   占位引用（`temp://`）的素材只有元信息、没有内容
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    /// 选择时分配的序号，决定提交顺序
    pub seq: u64,
    pub origin: AssetOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<AssetPayload>,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_meta: Option<RemoteMeta>,
}

impl Asset {
    /// 创建本地素材
    pub fn local(seq: u64, file_name: impl Into<String>, bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            id: format!("local-{}", seq),
            seq,
            origin: AssetOrigin::Local,
            display_name: file_name.clone(),
            payload: Some(AssetPayload {
                bytes,
                content_type: content_type.into(),
                file_name,
            }),
            remote_meta: None,
        }
    }

    /// 创建远端素材（payload 由解析器填入，占位条目传 None）
    pub fn remote(seq: u64, meta: RemoteMeta, payload: Option<AssetPayload>) -> Self {
        Self {
            id: meta.id.clone(),
            seq,
            origin: AssetOrigin::Remote,
            display_name: meta.name.clone(),
            payload,
            remote_meta: Some(meta),
        }
    }

    /// 是否有可提交的内容
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

/// 选择集合
///
/// 不变量（集中在这里维护，调用方不直接拼数组）：
/// - 顺序由选择序号（seq）决定，与解析完成的先后无关
/// - 同一个衣橱条目 id 最多出现一次
/// - 按 id 移除恰好删除一条，不存在时为幂等空操作
#[derive(Debug, Default, Clone)]
pub struct SelectionSet {
    entries: Vec<Asset>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入素材，保持 seq 升序；id 已存在时拒绝并返回 false
    pub fn add(&mut self, asset: Asset) -> bool {
        if self.entries.iter().any(|a| a.id == asset.id) {
            return false;
        }
        let pos = self
            .entries
            .iter()
            .position(|a| a.seq > asset.seq)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, asset);
        true
    }

    /// 按 id 移除，恰好删除一条；不存在时返回 false
    pub fn remove_by_id(&mut self, id: &str) -> bool {
        match self.entries.iter().position(|a| a.id == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|a| a.id == id)
    }

    /// 取快照：后续对选择集合的修改不影响已取出的副本
    pub fn snapshot(&self) -> Vec<Asset> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
