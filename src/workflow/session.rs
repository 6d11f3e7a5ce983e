//! 选择会话 - 流程编排层
//!
//! 管理一次提交前的素材选择：分配选择序号、容量上限、
//! 以及远端条目"选中但还在解析中"的中间态。
//!
//! 取消语义：解析是异步的，用户可能在解析完成前就取消了选中。
//! 会话用票据（ResolutionTicket）把"发起解析时的选择"和
//! "解析完成时的提交"绑在一起，迟到的结果拿旧票据进不来

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::clients::WardrobeClient;
use crate::config::Config;
use crate::models::asset::{Asset, AssetPayload, SelectionSet};
use crate::models::wire::WardrobeItem;
use crate::services::resolver::AssetResolver;

/// 一次远端解析的准入票据
///
/// 由 begin_remote 签发，complete_remote 验票。票据只在对应的
/// 选中仍然有效时可用，取消后再来的完成会被丢弃
#[derive(Debug)]
pub struct ResolutionTicket {
    item_id: String,
    seq: u64,
}

impl ResolutionTicket {
    /// 解析器按这个序号构造 Asset
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

/// 选择会话
pub struct SelectionSession {
    set: SelectionSet,
    /// 还在解析中的远端条目: item_id -> 签发时的 seq
    pending: HashMap<String, u64>,
    next_seq: u64,
    capacity: usize,
}

impl SelectionSession {
    /// 创建新会话
    ///
    /// # 参数
    /// * `capacity` - 同时选中的素材上限（含解析中的）
    pub fn new(capacity: usize) -> Self {
        Self {
            set: SelectionSet::new(),
            pending: HashMap::new(),
            next_seq: 0,
            capacity,
        }
    }

    /// 按配置的服装上限创建会话
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_clothing_items)
    }

    /// 选中一个本地上传的文件，立即入集合
    ///
    /// 超出容量时拒绝并返回 None
    pub fn select_local(
        &mut self,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        content_type: impl Into<String>,
    ) -> Option<String> {
        if self.occupied() >= self.capacity {
            warn!("⚠️ 选择数量已达上限 {}，忽略本次上传", self.capacity);
            return None;
        }
        let seq = self.take_seq();
        let asset = Asset::local(seq, file_name, bytes, content_type);
        let id = asset.id.clone();
        self.set.add(asset);
        debug!("已选中本地素材 {} (seq={})", id, seq);
        Some(id)
    }

    /// 选中一个衣橱条目，签发解析票据
    ///
    /// 拒绝的情况：已选中、解析中、或容量已满。
    /// 序号在这里就定下来了，解析完成的先后不影响提交顺序
    pub fn begin_remote(&mut self, item: &WardrobeItem) -> Option<ResolutionTicket> {
        if self.set.contains(&item.id) || self.pending.contains_key(&item.id) {
            debug!("条目 {} 已在选择中，忽略重复选中", item.id);
            return None;
        }
        if self.occupied() >= self.capacity {
            warn!("⚠️ 选择数量已达上限 {}，拒绝选中 {}", self.capacity, item.id);
            return None;
        }
        let seq = self.take_seq();
        self.pending.insert(item.id.clone(), seq);
        debug!("开始解析条目 {} (seq={})", item.id, seq);
        Some(ResolutionTicket {
            item_id: item.id.clone(),
            seq,
        })
    }

    /// 解析完成，凭票入集合
    ///
    /// 票据对应的选中已被取消时丢弃结果并返回 false
    pub fn complete_remote(&mut self, ticket: ResolutionTicket, asset: Asset) -> bool {
        match self.pending.get(&ticket.item_id) {
            Some(&seq) if seq == ticket.seq => {
                self.pending.remove(&ticket.item_id);
                self.set.add(asset);
                debug!("条目 {} 解析完成入集合", ticket.item_id);
                true
            }
            _ => {
                debug!("条目 {} 的解析结果迟到，已丢弃", ticket.item_id);
                false
            }
        }
    }

    /// 解析失败，释放占位
    pub fn abort_remote(&mut self, ticket: ResolutionTicket) {
        if self.pending.get(&ticket.item_id) == Some(&ticket.seq) {
            self.pending.remove(&ticket.item_id);
        }
    }

    /// 选中衣橱条目并就地完成解析
    ///
    /// begin → resolve → complete 的串行封装，适合单任务调用方；
    /// 并发界面可以自己持票，在解析回调里验票。
    /// 解析失败（TransferError）时释放占位并返回 false，
    /// 不向上冒错，本次选中直接作废
    pub async fn select_remote(
        &mut self,
        resolver: &AssetResolver,
        client: &WardrobeClient,
        item: &WardrobeItem,
    ) -> bool {
        let ticket = match self.begin_remote(item) {
            Some(ticket) => ticket,
            None => return false,
        };

        match resolver.resolve(client, ticket.seq(), item).await {
            Ok(asset) => self.complete_remote(ticket, asset),
            Err(e) => {
                warn!("⚠️ 条目 {} 解析失败，选中作废: {}", item.id, e);
                self.abort_remote(ticket);
                false
            }
        }
    }

    /// 取消选中（选中/解除是对称操作，解析中的条目同样可取消）
    pub fn deselect(&mut self, id: &str) -> bool {
        if self.pending.remove(id).is_some() {
            debug!("已取消解析中的条目 {}", id);
            return true;
        }
        self.set.remove_by_id(id)
    }

    /// 已入集合的素材快照，按选择顺序排列
    pub fn snapshot(&self) -> Vec<Asset> {
        self.set.snapshot()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.set.contains(id) || self.pending.contains_key(id)
    }

    /// 已入集合的数量（不含解析中）
    pub fn resolved_len(&self) -> usize {
        self.set.len()
    }

    /// 占用的容量 = 已入集合 + 解析中
    fn occupied(&self) -> usize {
        self.set.len() + self.pending.len()
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

// 测试中直接构造 Asset 绕过真实解析器，语义与解析成功一致
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::asset::RemoteMeta;

    fn item(id: &str) -> WardrobeItem {
        WardrobeItem {
            id: id.to_string(),
            name: format!("条目 {}", id),
            category: "tops".to_string(),
            primary_color: None,
            secondary_color: None,
            size: None,
            image_url: format!("http://storage.local/{}.png", id),
        }
    }

    fn resolved(seq: u64, id: &str) -> Asset {
        Asset::remote(
            seq,
            RemoteMeta::from_item(&item(id)),
            Some(AssetPayload {
                bytes: vec![1],
                content_type: "image/png".to_string(),
                file_name: format!("{}.png", id),
            }),
        )
    }

    #[test]
    fn test_select_deselect_symmetry() {
        let mut session = SelectionSession::new(4);
        let ticket = session.begin_remote(&item("a")).unwrap();
        assert!(session.is_selected("a"));

        session.complete_remote(ticket, resolved(0, "a"));
        assert!(session.deselect("a"));
        assert!(!session.is_selected("a"));
        assert!(session.snapshot().is_empty());
    }

    #[test]
    fn test_cancelled_selection_discards_late_resolution() {
        let mut session = SelectionSession::new(4);
        let ticket = session.begin_remote(&item("a")).unwrap();

        // 解析完成前取消
        assert!(session.deselect("a"));
        assert!(!session.complete_remote(ticket, resolved(0, "a")));
        assert!(session.snapshot().is_empty());
        assert!(!session.is_selected("a"));
    }

    #[test]
    fn test_order_follows_selection_not_completion() {
        let mut session = SelectionSession::new(4);
        let first = session.begin_remote(&item("a")).unwrap();
        let second = session.begin_remote(&item("b")).unwrap();

        // 后选的 b 先解析完成
        let seq_b = second.seq();
        session.complete_remote(second, resolved(seq_b, "b"));
        let seq_a = first.seq();
        session.complete_remote(first, resolved(seq_a, "a"));

        let ids: Vec<_> = session.snapshot().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_selection_rejected_while_pending() {
        let mut session = SelectionSession::new(4);
        let _ticket = session.begin_remote(&item("a")).unwrap();
        assert!(session.begin_remote(&item("a")).is_none());
    }

    #[test]
    fn test_from_config_applies_clothing_cap() {
        let config = Config::default();
        let mut session = SelectionSession::from_config(&config);

        for i in 0..config.max_clothing_items {
            assert!(session.begin_remote(&item(&format!("item-{}", i))).is_some());
        }
        // 第 5 件超出配置上限
        assert!(session.begin_remote(&item("overflow")).is_none());
    }

    #[test]
    fn test_capacity_counts_pending() {
        let mut session = SelectionSession::new(2);
        let _t1 = session.begin_remote(&item("a")).unwrap();
        assert!(session.select_local("person.png", vec![1], "image/png").is_some());

        // 两个名额都占了（一个还在解析中）
        assert!(session.begin_remote(&item("c")).is_none());
        assert!(session.select_local("extra.png", vec![1], "image/png").is_none());
    }

    #[test]
    fn test_reselect_after_cancel_gets_new_ticket() {
        let mut session = SelectionSession::new(4);
        let stale = session.begin_remote(&item("a")).unwrap();
        session.deselect("a");

        let fresh = session.begin_remote(&item("a")).unwrap();
        assert_ne!(stale.seq(), fresh.seq());

        // 旧票作废，新票有效
        let stale_seq = stale.seq();
        assert!(!session.complete_remote(stale, resolved(stale_seq, "a")));
        let fresh_seq = fresh.seq();
        assert!(session.complete_remote(fresh, resolved(fresh_seq, "a")));
        assert_eq!(session.resolved_len(), 1);
    }

    #[test]
    fn test_failed_resolution_frees_capacity() {
        let mut session = SelectionSession::new(1);
        let ticket = session.begin_remote(&item("a")).unwrap();
        session.abort_remote(ticket);

        assert!(!session.is_selected("a"));
        assert!(session.begin_remote(&item("b")).is_some());
    }
}
