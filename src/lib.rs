//! DocDB - 文档数据库查询引擎的执行计划与向量索引优化
//!
//! 本 crate 提供执行计划节点（Singleton、Filter、Limit、EnumerateNearVector 等）、
//! 基于 arena 的执行计划图，以及把「全表扫描 + 距离排序 + LIMIT」改写为
//! 向量索引近邻扫描的优化规则。

pub mod config;
pub mod core;
pub mod expression;
pub mod index;
pub mod query;
pub mod storage;
pub mod utils;
