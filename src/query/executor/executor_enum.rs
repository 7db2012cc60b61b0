//! 执行块枚举
//!
//! 以枚举静态分发代替 `Box<dyn ExecutionBlock>`，每种计划节点对应一个变体

use crate::core::error::DBResult;
use crate::query::executor::base::{ExecutionBlock, ExecutorStats, Row};
use crate::query::executor::data_access::{
    EnumerateCollectionBlock, EnumerateNearVectorBlock, MaterializeBlock, SingletonBlock,
};
use crate::query::executor::result_processing::{
    CalculationBlock, FilterBlock, LimitBlock, ReturnBlock, SortBlock,
};
use crate::query::planner::plan::core::nodes::NodeId;

#[derive(Debug)]
pub enum ExecutionBlockEnum {
    Singleton(SingletonBlock),
    EnumerateCollection(EnumerateCollectionBlock),
    Calculation(CalculationBlock),
    Filter(FilterBlock),
    Sort(SortBlock),
    Limit(LimitBlock),
    Return(ReturnBlock),
    EnumerateNearVectors(EnumerateNearVectorBlock),
    Materialize(MaterializeBlock),
}

macro_rules! dispatch_block {
    ($self:expr, $block:ident => $body:expr) => {
        match $self {
            ExecutionBlockEnum::Singleton($block) => $body,
            ExecutionBlockEnum::EnumerateCollection($block) => $body,
            ExecutionBlockEnum::Calculation($block) => $body,
            ExecutionBlockEnum::Filter($block) => $body,
            ExecutionBlockEnum::Sort($block) => $body,
            ExecutionBlockEnum::Limit($block) => $body,
            ExecutionBlockEnum::Return($block) => $body,
            ExecutionBlockEnum::EnumerateNearVectors($block) => $body,
            ExecutionBlockEnum::Materialize($block) => $body,
        }
    };
}

impl ExecutionBlock for ExecutionBlockEnum {
    fn id(&self) -> NodeId {
        dispatch_block!(self, block => block.id())
    }

    fn name(&self) -> &'static str {
        dispatch_block!(self, block => block.name())
    }

    fn next_row(&mut self) -> DBResult<Option<Row>> {
        dispatch_block!(self, block => block.next_row())
    }

    fn stats(&self) -> &ExecutorStats {
        dispatch_block!(self, block => block.stats())
    }
}

macro_rules! impl_from_block {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ExecutionBlockEnum {
                fn from(block: $ty) -> Self {
                    ExecutionBlockEnum::$variant(block)
                }
            }
        )*
    };
}

impl_from_block! {
    Singleton => SingletonBlock,
    EnumerateCollection => EnumerateCollectionBlock,
    Calculation => CalculationBlock,
    Filter => FilterBlock,
    Sort => SortBlock,
    Limit => LimitBlock,
    Return => ReturnBlock,
    EnumerateNearVectors => EnumerateNearVectorBlock,
    Materialize => MaterializeBlock,
}
