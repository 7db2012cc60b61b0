//! 近邻结果合并
//!
//! 向量索引在每个分片上各自返回前 K 个候选，这些流不能像普通行那样直接拼接。
//! `NearVectorMerge` 把 N 条已按同一方向排好序的流做多路归并，
//! 再统一跳过 `offset` 个并截断到 `limit` 个。
//! 单分片执行时近邻扫描块也用它完成窗口截取

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::index::VectorMatch;
use crate::query::planner::plan::core::nodes::EnumerateNearVectorNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearVectorMerge {
    ascending: bool,
    offset: u64,
    limit: u64,
}

/// 堆元素：堆顶是当前最优的候选
struct HeapEntry {
    candidate: VectorMatch,
    stream: usize,
    ascending: bool,
}

impl HeapEntry {
    /// 排在前面的候选比较结果为 Less
    fn rank(&self, other: &Self) -> Ordering {
        let by_score = if self.ascending {
            self.candidate.score.total_cmp(&other.candidate.score)
        } else {
            other.candidate.score.total_cmp(&self.candidate.score)
        };
        by_score
            .then_with(|| self.candidate.key.cmp(&other.candidate.key))
            .then_with(|| self.stream.cmp(&other.stream))
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.rank(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap 是最大堆
        self.rank(other).reverse()
    }
}

impl NearVectorMerge {
    pub fn new(ascending: bool, offset: u64, limit: u64) -> Self {
        Self {
            ascending,
            offset,
            limit,
        }
    }

    /// 按近邻扫描节点的方向与窗口创建
    pub fn for_node(node: &EnumerateNearVectorNode) -> Self {
        Self::new(node.ascending(), node.offset(), node.limit())
    }

    pub fn ascending(&self) -> bool {
        self.ascending
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// 每条输入流需要提供的候选数量
    pub fn top_k(&self) -> u64 {
        self.offset.saturating_add(self.limit)
    }

    /// 归并多条有序流，返回窗口内的结果
    pub fn merge(&self, streams: Vec<Vec<VectorMatch>>) -> Vec<VectorMatch> {
        let mut iterators: Vec<_> = streams.into_iter().map(Vec::into_iter).collect();
        let mut heap = BinaryHeap::with_capacity(iterators.len());
        for (stream, iterator) in iterators.iter_mut().enumerate() {
            if let Some(candidate) = iterator.next() {
                heap.push(HeapEntry {
                    candidate,
                    stream,
                    ascending: self.ascending,
                });
            }
        }

        let mut skipped = 0u64;
        let mut output = Vec::new();
        while (output.len() as u64) < self.limit {
            let Some(entry) = heap.pop() else {
                break;
            };
            if let Some(candidate) = iterators[entry.stream].next() {
                heap.push(HeapEntry {
                    candidate,
                    stream: entry.stream,
                    ascending: self.ascending,
                });
            }
            if skipped < self.offset {
                skipped += 1;
                continue;
            }
            output.push(entry.candidate);
        }
        output
    }
}
