//! 就绪闸门（prepared / ready）
//!
//! 写入 `prepared = true` 时经普通 `emit` 路径发射内部就绪事件。
//! 就绪事件为本 crate 私有类型，宿主代码无法声明同一个键。
//!
use crate::error::EmitterResult;
use crate::event::{Event, EventMap};
use crate::event_emitter::EventEmitter;
use crate::listener::Listener;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::atomic::Ordering;

/// 内部就绪事件
#[derive(Clone, Copy, Debug)]
pub(crate) struct Ready;

impl<M: EventMap> Event<M> for Ready {
    const NAME: &'static str = "internal_ready";
}

impl<M: EventMap> EventEmitter<M> {
    /// 是否已就绪
    pub fn prepared(&self) -> bool {
        self.shared.prepared.load(Ordering::SeqCst)
    }

    /// 设置就绪标记；写入 true 时唤醒所有 `ready` 等待者
    pub fn set_prepared(&self, prepared: bool) -> &Self {
        self.shared.prepared.store(prepared, Ordering::SeqCst);
        if prepared {
            tracing::debug!(emitter = %self.label(), "emitter prepared");
            if let Err(err) = self.emit(Ready) {
                tracing::error!(emitter = %self.label(), error = %err, "readiness signal rejected");
            }
        }
        self
    }

    /// 等待就绪
    pub fn ready(&self) -> BoxFuture<'static, EmitterResult<()>> {
        self.ready_with(|| async {})
    }

    /// 就绪后调用 `callback` 并等待其完成。
    ///
    /// 回调从不在调用方当前栈内执行：它在返回的 future 被轮询且已就绪时运行。
    pub fn ready_with<F, Fut>(&self, callback: F) -> BoxFuture<'static, EmitterResult<Fut::Output>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future + Send + 'static,
    {
        // 先登记再读标记，避免与 set_prepared 竞争时丢失唤醒
        let listener = Listener::new(|_: &Ready| ());
        let id = listener.id();
        let gate = self.once_with(listener);
        let gate = if self.prepared() {
            self.off_once::<Ready>(Some(id));
            None
        } else {
            Some(gate)
        };

        async move {
            if let Some(gate) = gate {
                gate.await?;
            }
            Ok(callback().await)
        }
        .boxed()
    }
}
