//! 事件发射器（EventEmitter）
//!
//! 订阅注册、同步分发、一次性事件封存与回放。
//!
//! 分发语义：
//! - 每轮分发先在锁内对匹配订阅做快照，释放锁后按插入顺序逐个调用；
//! - 调用前复核：本轮中已被移除的普通订阅跳过；一次性订阅先摘除再调用，
//!   已被摘除则跳过，因此重入发射不会让一次性订阅触发两次；
//! - 本轮中新增的订阅不参与本轮；
//! - 回调期间从不持有锁，监听器可重入调用发射器的任意方法；
//! - 被移除的订阅在锁外释放；
//! - 监听器 panic 直接向调用方传播并中止本轮剩余分发，注册表保持一致。
//!
//! `emit_once` 与 `emit` 走同一条分发路径，分发结束后才封存并摘除剩余订阅。
//!
use crate::config::EmitterConfig;
use crate::deferred::Deferred;
use crate::error::{EmitterError, EmitterResult};
use crate::event::{Event, EventKey, EventMap};
use crate::handle::ListenerHandle;
use crate::listener::{ErasedCallback, Listener, ListenerId, Payload, erase};
use crate::registry::{DispatchEntry, Registration, Registry};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 发射器共享状态
pub(crate) struct Shared {
    pub(crate) registry: Mutex<Registry>,
    pub(crate) prepared: AtomicBool,
    pub(crate) config: EmitterConfig,
}

impl Shared {
    /// 未封存时返回本轮快照
    fn round(&self, key: EventKey) -> EmitterResult<Vec<DispatchEntry>> {
        let registry = self.registry.lock();
        if registry.is_sealed(key) {
            return Err(EmitterError::sealed(key.name()));
        }
        Ok(registry.snapshot(key))
    }

    /// 逐条复核并调用快照中的订阅
    fn dispatch(&self, payload: &(dyn Any + Send + Sync), round: Vec<DispatchEntry>) {
        for entry in round {
            let (live, claimed) = {
                let mut registry = self.registry.lock();
                if entry.once {
                    let claimed = registry.remove_by_id(entry.id);
                    (claimed.is_some(), claimed)
                } else {
                    (registry.contains(entry.id), None)
                }
            };
            drop(claimed);
            if live {
                (entry.callback)(payload);
            }
        }
    }
}

/// 类型化事件发射器
///
/// `M` 为事件表，只有实现了 `Event<M>` 的载荷才能在该发射器上订阅与发射。
/// 克隆得到的是指向同一状态的句柄。
pub struct EventEmitter<M: EventMap> {
    pub(crate) shared: Arc<Shared>,
    _map: PhantomData<fn() -> M>,
}

impl<M: EventMap> EventEmitter<M> {
    /// 使用默认配置创建发射器
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    /// 使用指定配置创建发射器
    pub fn with_config(config: EmitterConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry::new()),
                prepared: AtomicBool::new(false),
                config,
            }),
            _map: PhantomData,
        }
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            _map: PhantomData,
        }
    }

    /// 发射器配置
    pub fn config(&self) -> &EmitterConfig {
        &self.shared.config
    }

    pub(crate) fn label(&self) -> &str {
        self.shared.config.label()
    }

    /// 订阅事件 `E`。
    ///
    /// 若 `E` 已被 `emit_once` 封存，立即以冻结载荷调用 `listener` 且不登记，
    /// 返回的句柄为空操作。
    pub fn on<E: Event<M>>(&self, listener: Listener<E>) -> ListenerHandle {
        let key = EventKey::of::<M, E>();
        let id = listener.id();
        let fire = listener.clone();
        let callback = erase(move |event: &E| fire.call(event));

        match self.register(key, id, false, callback) {
            Registration::Subscribed(sub) => {
                ListenerHandle::subscribed(Arc::downgrade(&self.shared), sub, key.name())
            }
            Registration::Replay(payload, _) => {
                tracing::trace!(emitter = %self.label(), event = key.name(), "replaying sealed event");
                // 回放在锁外进行
                if let Some(event) = payload.downcast_ref::<E>() {
                    listener.call(event);
                }
                ListenerHandle::inert(key.name())
            }
        }
    }

    /// 取消订阅。
    ///
    /// `listener` 为 None 时移除该事件的全部订阅（含一次性订阅）；
    /// 没有匹配项时不报错。
    pub fn off<E: Event<M>>(&self, listener: Option<ListenerId>) -> &Self {
        self.remove::<E>(listener, false)
    }

    /// 与 `off` 相同，但只移除一次性订阅
    pub fn off_once<E: Event<M>>(&self, listener: Option<ListenerId>) -> &Self {
        self.remove::<E>(listener, true)
    }

    /// 等待事件 `E` 下一次触发，完成值为载荷的克隆。
    /// 事件已封存时立即完成。
    pub fn once<E: Event<M>>(&self) -> Deferred<E> {
        self.once_with(Listener::new(|event: &E| event.clone()))
    }

    /// 等待事件 `E` 下一次触发：触发时在分发过程中同步调用 `listener`，
    /// 延迟值以其返回值完成。事件已封存时立即回放并完成。
    pub fn once_with<E, R>(&self, listener: Listener<E, R>) -> Deferred<R>
    where
        E: Event<M>,
        R: Send + 'static,
    {
        let key = EventKey::of::<M, E>();
        let id = listener.id();
        let (tx, deferred) = Deferred::channel(key.name());
        let tx = Mutex::new(Some(tx));
        let fire = listener.clone();
        let callback = erase(move |event: &E| {
            let out = fire.call(event);
            if let Some(tx) = tx.lock().take() {
                let _ = tx.send(out);
            }
        });

        match self.register(key, id, true, callback) {
            Registration::Subscribed(_) => deferred,
            Registration::Replay(payload, _) => match payload.downcast_ref::<E>() {
                Some(event) => Deferred::resolved(key.name(), listener.call(event)),
                None => {
                    let (_, cancelled) = Deferred::channel(key.name());
                    cancelled
                }
            },
        }
    }

    /// 同步发射事件：按注册顺序调用当前匹配的监听器。
    ///
    /// 事件已封存时返回 [`EmitterError::SealedEventReEmission`]。
    pub fn emit<E: Event<M>>(&self, event: E) -> EmitterResult<&Self> {
        let key = EventKey::of::<M, E>();
        let round = self.shared.round(key)?;

        tracing::debug!(emitter = %self.label(), event = key.name(), listeners = round.len(), "emit");
        self.shared.dispatch(&event, round);
        Ok(self)
    }

    /// 发射并封存事件。
    ///
    /// 先与 `emit` 完全相同地分发给当前监听器，随后写入冻结载荷并摘除该事件
    /// 剩余的全部订阅（分发期间新增的订阅不会再触发）。之后的 `on` / `once`
    /// 直接回放该载荷，之后的 `emit` / `emit_once` 返回
    /// [`EmitterError::SealedEventReEmission`]。
    ///
    /// 分发期间若监听器重入调用 `emit_once` 抢先封存，本次调用返回该错误，
    /// 记录保持为先封存的载荷。
    pub fn emit_once<E: Event<M>>(&self, event: E) -> EmitterResult<&Self> {
        let key = EventKey::of::<M, E>();
        let round = self.shared.round(key)?;

        tracing::debug!(emitter = %self.label(), event = key.name(), listeners = round.len(), "emit_once");
        let payload: Payload = Arc::new(event);
        self.shared.dispatch(&*payload, round);

        let sealed = self.shared.registry.lock().seal(key, payload.clone());
        let Some(dropped) = sealed else {
            return Err(EmitterError::sealed(key.name()));
        };
        tracing::debug!(emitter = %self.label(), event = key.name(), dropped = dropped.len(), "event sealed");
        drop(dropped);
        Ok(self)
    }

    /// 清空全部订阅与封存记录，不改变 `prepared`
    pub fn clear_events(&self) -> &Self {
        let (dropped, records) = self.shared.registry.lock().clear();
        tracing::debug!(emitter = %self.label(), subscriptions = dropped.len(), sealed = records.len(), "events cleared");
        drop((dropped, records));
        self
    }

    /// 事件 `E` 当前的订阅数量
    pub fn listener_count<E: Event<M>>(&self) -> usize {
        self.shared.registry.lock().count(EventKey::of::<M, E>())
    }

    /// 事件 `E` 是否已被封存
    pub fn is_sealed<E: Event<M>>(&self) -> bool {
        self.shared.registry.lock().is_sealed(EventKey::of::<M, E>())
    }

    /// 已封存事件的冻结载荷
    pub fn sealed<E: Event<M>>(&self) -> Option<E> {
        let payload = self
            .shared
            .registry
            .lock()
            .sealed_payload(EventKey::of::<M, E>())?;
        payload.downcast_ref::<E>().cloned()
    }

    /// 注册表中是否没有任何订阅
    pub fn is_empty(&self) -> bool {
        self.shared.registry.lock().len() == 0
    }

    pub(crate) fn register(
        &self,
        key: EventKey,
        listener: ListenerId,
        once: bool,
        callback: ErasedCallback,
    ) -> Registration {
        let max = self.shared.config.max_listeners;
        let (registration, crossed, count) = {
            let mut registry = self.shared.registry.lock();
            let registration = registry.register(key, listener, once, callback);
            let crossed = registry.crossed_limit(key, max);
            (registration, crossed, registry.count(key))
        };

        if let Registration::Subscribed(sub) = &registration {
            tracing::trace!(emitter = %self.label(), event = key.name(), subscription = %sub, once, "listener added");
        }
        if crossed {
            tracing::warn!(
                emitter = %self.label(),
                event = key.name(),
                listeners = count,
                max_listeners = max,
                "possible listener leak: listener count exceeds max_listeners"
            );
        }
        registration
    }

    fn remove<E: Event<M>>(&self, listener: Option<ListenerId>, once_only: bool) -> &Self {
        let key = EventKey::of::<M, E>();
        let removed = self
            .shared
            .registry
            .lock()
            .remove_matching(key, listener, once_only);
        tracing::trace!(emitter = %self.label(), event = key.name(), removed = removed.len(), once_only, "listeners removed");
        drop(removed);
        self
    }
}

impl<M: EventMap> Clone for EventEmitter<M> {
    fn clone(&self) -> Self {
        Self::from_shared(Arc::clone(&self.shared))
    }
}

impl<M: EventMap> Default for EventEmitter<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: EventMap> fmt::Debug for EventEmitter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("label", &self.label())
            .field("prepared", &self.shared.prepared.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
