//! 结构化进度事件
//!
//! 编排器是生产者，任意调用方是消费者。事件代替自由文本，
//! 消费端爱怎么渲染都行；接收端被丢弃时发送静默失败。

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// 一次翻译运行经过的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Partitioning,
    Dispatching,
    Collecting,
    Merging,
    Done,
    Cancelled,
}

/// 单条进度事件
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub stage: RunStage,
    pub language: Option<String>,
    pub batch_index: Option<usize>,
    /// 0.0 ..= 100.0
    pub percent: f32,
}

/// 进度事件的发送端
///
/// 多个批次任务并发发送，内部加一把小锁保护发送端。
#[derive(Clone, Default)]
pub struct ProgressSink {
    tx: Option<Arc<Mutex<Sender<ProgressEvent>>>>,
}

impl ProgressSink {
    /// 创建成对的发送端与接收端
    pub fn channel() -> (Self, Receiver<ProgressEvent>) {
        let (tx, rx) = channel();
        (
            Self {
                tx: Some(Arc::new(Mutex::new(tx))),
            },
            rx,
        )
    }

    /// 不上报进度的空发送端
    pub fn disabled() -> Self {
        Self::default()
    }

    /// 发送一条事件；没有消费者时静默丢弃
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            if let Ok(sender) = tx.lock() {
                let _ = sender.send(event);
            }
        }
    }

    pub(crate) fn report(
        &self,
        stage: RunStage,
        language: Option<&str>,
        batch_index: Option<usize>,
        percent: f32,
    ) {
        self.emit(ProgressEvent {
            stage,
            language: language.map(str::to_string),
            batch_index,
            percent,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_flow_through_the_channel() {
        let (sink, rx) = ProgressSink::channel();

        sink.report(RunStage::Partitioning, Some("vi"), None, 0.0);
        sink.report(RunStage::Collecting, Some("vi"), Some(2), 50.0);

        let first = rx.recv().unwrap();
        assert_eq!(first.stage, RunStage::Partitioning);
        assert_eq!(first.language.as_deref(), Some("vi"));

        let second = rx.recv().unwrap();
        assert_eq!(second.batch_index, Some(2));
        assert!((second.percent - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn dropped_receiver_is_ignored() {
        let (sink, rx) = ProgressSink::channel();
        drop(rx);

        // 不应 panic
        sink.report(RunStage::Done, None, None, 100.0);
    }

    #[test]
    fn disabled_sink_swallows_events() {
        let sink = ProgressSink::disabled();
        sink.report(RunStage::Done, None, None, 100.0);
    }
}
