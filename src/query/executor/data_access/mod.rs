//! 数据访问执行块
//!
//! 产生行或从集合、索引读取数据的执行块

pub mod enumerate_collection;
pub mod materialize;
pub mod near_vector;
pub mod singleton;

pub use enumerate_collection::EnumerateCollectionBlock;
pub use materialize::MaterializeBlock;
pub use near_vector::{EnumerateNearVectorBlock, NearVectorRegisters};
pub use singleton::SingletonBlock;
