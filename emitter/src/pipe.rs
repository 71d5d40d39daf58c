//! 跨发射器转发（pipe / pipe_once）
//!
//! 源发射器上的转发监听器只持有目标的弱引用，互相转发的两个发射器不会形成引用环。
//!
use crate::error::{EmitterError, EmitterResult};
use crate::event::{Event, EventMap};
use crate::event_emitter::EventEmitter;
use crate::handle::ListenerHandle;
use crate::listener::Listener;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::sync::Arc;

impl<M: EventMap> EventEmitter<M> {
    /// 将源上的事件 `E` 通过 `emit` 转发到 `target`，返回可独立注销的句柄。
    ///
    /// 目标拒绝（已封存）时记录告警，不影响源上的其余监听器。
    pub fn pipe<E, N>(&self, target: &EventEmitter<N>) -> ListenerHandle
    where
        N: EventMap,
        E: Event<M> + Event<N>,
    {
        let target = Arc::downgrade(&target.shared);
        self.on(Listener::new(move |event: &E| {
            let Some(shared) = target.upgrade() else {
                tracing::trace!(event = <E as Event<N>>::NAME, "pipe target dropped");
                return;
            };
            let target = EventEmitter::<N>::from_shared(shared);
            if let Err(err) = target.emit(event.clone()) {
                tracing::warn!(emitter = %target.label(), event = err.event(), error = %err, "piped event rejected by target");
            }
        }))
    }

    /// 源上的事件 `E` 下一次触发时，通过 `emit_once` 转发并封存到 `target`。
    ///
    /// 完成值为目标上 `emit_once` 的结果。
    pub fn pipe_once<E, N>(&self, target: &EventEmitter<N>) -> BoxFuture<'static, EmitterResult<()>>
    where
        N: EventMap,
        E: Event<M> + Event<N>,
    {
        let target = Arc::downgrade(&target.shared);
        let forwarded = self.once_with(Listener::new(move |event: &E| {
            let Some(shared) = target.upgrade() else {
                return Err(EmitterError::cancelled(<E as Event<N>>::NAME));
            };
            EventEmitter::<N>::from_shared(shared)
                .emit_once(event.clone())
                .map(|_| ())
        }));

        async move { forwarded.await? }.boxed()
    }
}
