//! 批次划分
//!
//! 把平铺的 (name, text) 列表切成固定大小的批次。批次带着
//! 自己的序号走完整个并发流程，最终按序号还原原始顺序——
//! 并发任务的完成顺序不可依赖。

/// 一个待翻译批次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    /// 在整个输入里的批次序号，从 0 开始
    pub index: usize,
    /// 批次内的 (name, text) 对，保持输入顺序
    pub pairs: Vec<(String, String)>,
}

/// 按固定大小划分批次
///
/// 空输入产生空批次列表；`batch_size` 为 0 时按 1 处理，
/// 避免死循环。
pub fn partition(pairs: &[(String, String)], batch_size: usize) -> Vec<BatchJob> {
    let batch_size = batch_size.max(1);

    pairs
        .chunks(batch_size)
        .enumerate()
        .map(|(index, chunk)| BatchJob {
            index,
            pairs: chunk.to_vec(),
        })
        .collect()
}

/// 输入需要的批次数
pub fn batch_count(item_count: usize, batch_size: usize) -> usize {
    let batch_size = batch_size.max(1);
    item_count.div_euclid(batch_size) + usize::from(item_count % batch_size != 0)
}
