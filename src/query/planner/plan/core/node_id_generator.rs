//! 节点ID生成器
//!
//! 每个计划上下文持有自己的生成器，节点 ID 在计划内唯一

use std::sync::atomic::{AtomicU64, Ordering};

use super::nodes::NodeId;

/// 节点ID生成器
#[derive(Debug)]
pub struct NodeIdGenerator {
    counter: AtomicU64,
}

impl Default for NodeIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeIdGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1), // 从1开始，0保留为无效ID
        }
    }

    /// 获取下一个唯一ID
    pub fn next_id(&self) -> NodeId {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }

    /// 确保后续分配的 ID 大于 `id`，用于从序列化计划恢复
    pub fn observe(&self, id: NodeId) {
        self.counter.fetch_max(id.saturating_add(1), Ordering::SeqCst);
    }

    pub fn peek(&self) -> NodeId {
        self.counter.load(Ordering::SeqCst)
    }
}

impl Clone for NodeIdGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.peek()),
        }
    }
}
