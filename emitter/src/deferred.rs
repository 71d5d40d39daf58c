//! 延迟值（Deferred）
//!
//! 单生产者、单消费者、至多完成一次：基于 `tokio::sync::oneshot`。
//! 生产端挂在一次性订阅里，订阅被移除而未触发时生产端随之释放，
//! 消费端得到 [`EmitterError::Cancelled`]，而不是永远挂起。
//!
use crate::error::{EmitterError, EmitterResult};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// `once` / `once_with` 返回的延迟值
#[must_use = "a Deferred does nothing unless awaited"]
pub struct Deferred<T> {
    rx: oneshot::Receiver<T>,
    event: &'static str,
}

impl<T> Deferred<T> {
    pub(crate) fn channel(event: &'static str) -> (oneshot::Sender<T>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx, event })
    }

    /// 已完成的延迟值（用于封存事件的回放）
    pub(crate) fn resolved(event: &'static str, value: T) -> Self {
        let (tx, deferred) = Self::channel(event);
        let _ = tx.send(value);
        deferred
    }

    /// 等待的事件名
    pub fn event(&self) -> &'static str {
        self.event
    }
}

impl<T> Future for Deferred<T> {
    type Output = EmitterResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let event = self.event;
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.map_err(|_| EmitterError::cancelled(event)))
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}
