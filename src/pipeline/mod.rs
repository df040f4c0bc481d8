//! 文本处理管道模块
//!
//! 包含进入翻译流程之前的准备环节：限定符过滤和批次划分。

pub mod batch;
pub mod filter;

pub use batch::{partition, BatchJob};
pub use filter::{ExclusionCheck, ResourceFilter};
