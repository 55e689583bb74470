//! 保存通知
//!
//! 会话通过 channel 把"已保存"通知推给展示层，每次成功保存最多通知一次

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::config::ReviewMode;

/// 会话事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewEvent {
    /// 新题目已写入
    QuestionCreated { position: usize, id: i64 },
    /// 已有题目已更新
    QuestionUpdated { position: usize, id: i64 },
    /// 批量保存结束（至少保存了一条）
    BatchSaved { mode: ReviewMode, saved: usize },
}

impl std::fmt::Display for ReviewEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewEvent::QuestionCreated { id, .. } => write!(f, "Question #{} created.", id),
            ReviewEvent::QuestionUpdated { id, .. } => write!(f, "Question #{} updated.", id),
            ReviewEvent::BatchSaved { mode, saved } => {
                let verb = match mode {
                    ReviewMode::Create => "created",
                    ReviewMode::Update => "updated",
                };
                let plural = if *saved == 1 { "" } else { "s" };
                write!(f, "{} question{} {}.", saved, plural, verb)
            }
        }
    }
}

/// 事件出口，未连接时静默丢弃
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    sender: Option<UnboundedSender<ReviewEvent>>,
}

impl EventSink {
    /// 创建一对 sink / receiver
    pub fn channel() -> (Self, UnboundedReceiver<ReviewEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self { sender: Some(tx) }, rx)
    }

    pub fn notify(&self, event: ReviewEvent) {
        if let Some(sender) = &self.sender {
            if sender.send(event).is_err() {
                debug!("事件接收端已关闭，丢弃通知");
            }
        }
    }
}
