//! 订阅句柄（ListenerHandle）
//!
//! `on` / `pipe` 返回，持有发射器状态的弱引用；`stop` 与 `remove` 为同义方法，
//! 仅注销该次注册产生的那一条订阅。句柄被丢弃时不会自动注销。
//!
use crate::event_emitter::Shared;
use crate::registry::SubscriptionId;
use std::sync::Weak;

#[derive(Clone, Debug)]
pub struct ListenerHandle {
    shared: Weak<Shared>,
    subscription: Option<SubscriptionId>,
    event: &'static str,
}

impl ListenerHandle {
    pub(crate) fn subscribed(shared: Weak<Shared>, id: SubscriptionId, event: &'static str) -> Self {
        Self {
            shared,
            subscription: Some(id),
            event,
        }
    }

    /// 事件已封存、回调已被立即回放时返回的空句柄
    pub(crate) fn inert(event: &'static str) -> Self {
        Self {
            shared: Weak::new(),
            subscription: None,
            event,
        }
    }

    /// 注销订阅；订阅已不存在时为空操作
    pub fn stop(&self) {
        let (Some(id), Some(shared)) = (self.subscription, self.shared.upgrade()) else {
            return;
        };
        let removed = shared.registry.lock().remove_by_id(id);
        if removed.is_some() {
            tracing::trace!(emitter = %shared.config.label(), event = self.event, subscription = %id, "listener stopped");
        }
        drop(removed);
    }

    /// `stop` 的同义方法
    pub fn remove(&self) {
        self.stop();
    }

    /// 订阅是否仍在注册表中
    pub fn is_active(&self) -> bool {
        match (self.subscription, self.shared.upgrade()) {
            (Some(id), Some(shared)) => shared.registry.lock().contains(id),
            _ => false,
        }
    }

    pub fn event(&self) -> &'static str {
        self.event
    }

    pub fn subscription_id(&self) -> Option<SubscriptionId> {
        self.subscription
    }
}
