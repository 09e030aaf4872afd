// ==========================================
// 渔场管理系统 - 用户通知
// ==========================================
// 职责: 成功/失败提示的出口（界面 toast 的对应物）
// ==========================================

use serde::Serialize;
use std::sync::Mutex;
use tracing::{info, warn};

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// 通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// 通知出口
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification {
            level: NotificationLevel::Success,
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.notify(Notification {
            level: NotificationLevel::Error,
            message: message.to_string(),
        });
    }
}

/// 写入日志的通知出口
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => info!(message = %notification.message, "通知"),
            NotificationLevel::Error => warn!(message = %notification.message, "通知"),
        }
    }
}

/// 记录全部通知（供界面轮询或测试断言）
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    inner: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications().pop()
    }

    /// 取出并清空
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(
            &mut *self
                .inner
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier() {
        let n = RecordingNotifier::new();
        n.success("ok");
        n.error("bad");
        assert_eq!(n.notifications().len(), 2);
        assert_eq!(n.last().unwrap().level, NotificationLevel::Error);
        assert_eq!(n.drain().len(), 2);
        assert!(n.notifications().is_empty());
    }
}
