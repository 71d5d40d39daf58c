//! 订阅注册表（Registry）
//!
//! 纯数据结构，不负责调用回调：
//! - `subscriptions`：按插入顺序保存的订阅列表，插入顺序即分发顺序；
//! - `sealed`：经 `emit_once` 封存的事件及其冻结载荷；
//! - 封存与清理订阅在同一次加锁内完成，保证封存事件不存在挂起订阅；
//! - 被移除的订阅一律交还调用方，由调用方在锁外释放（回调捕获的值可能在 Drop 中回调发射器）。
//!
use crate::event::EventKey;
use crate::listener::{ErasedCallback, ListenerId, Payload};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// 订阅 ID：由注册表单调分配，句柄据此精确注销
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

pub(crate) struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) key: EventKey,
    pub(crate) listener: ListenerId,
    pub(crate) once: bool,
    pub(crate) callback: ErasedCallback,
}

/// 一轮分发中的条目（快照）
#[derive(Clone)]
pub(crate) struct DispatchEntry {
    pub(crate) id: SubscriptionId,
    pub(crate) once: bool,
    pub(crate) callback: ErasedCallback,
}

impl From<&Subscription> for DispatchEntry {
    fn from(sub: &Subscription) -> Self {
        Self {
            id: sub.id,
            once: sub.once,
            callback: sub.callback.clone(),
        }
    }
}

/// 注册结果：要么登记为订阅，要么事件已封存需立即回放（未登记的回调一并交还）
pub(crate) enum Registration {
    Subscribed(SubscriptionId),
    Replay(Payload, ErasedCallback),
}

#[derive(Default)]
pub(crate) struct Registry {
    subscriptions: Vec<Subscription>,
    sealed: HashMap<EventKey, Payload>,
    over_limit: HashSet<EventKey>,
    next_id: u64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 已封存则返回冻结载荷（不登记）；否则追加订阅
    pub(crate) fn register(
        &mut self,
        key: EventKey,
        listener: ListenerId,
        once: bool,
        callback: ErasedCallback,
    ) -> Registration {
        if let Some(payload) = self.sealed.get(&key) {
            return Registration::Replay(payload.clone(), callback);
        }

        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription {
            id,
            key,
            listener,
            once,
            callback,
        });
        Registration::Subscribed(id)
    }

    /// 移除匹配的订阅并返回
    /// - `listener` 为 None 时匹配该事件的全部订阅
    /// - `once_only` 为 true 时仅匹配一次性订阅
    pub(crate) fn remove_matching(
        &mut self,
        key: EventKey,
        listener: Option<ListenerId>,
        once_only: bool,
    ) -> Vec<Subscription> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.subscriptions)
            .into_iter()
            .partition(|sub: &Subscription| {
                sub.key == key
                    && listener.is_none_or(|l| sub.listener == l)
                    && (!once_only || sub.once)
            });
        self.subscriptions = kept;
        if !removed.is_empty() {
            self.rearm(key);
        }
        removed
    }

    pub(crate) fn remove_by_id(&mut self, id: SubscriptionId) -> Option<Subscription> {
        let idx = self.subscriptions.iter().position(|s| s.id == id)?;
        let removed = self.subscriptions.remove(idx);
        self.rearm(removed.key);
        Some(removed)
    }

    pub(crate) fn contains(&self, id: SubscriptionId) -> bool {
        self.subscriptions.iter().any(|s| s.id == id)
    }

    /// 当前匹配该事件的订阅快照（按插入顺序）
    pub(crate) fn snapshot(&self, key: EventKey) -> Vec<DispatchEntry> {
        self.subscriptions
            .iter()
            .filter(|s| s.key == key)
            .map(DispatchEntry::from)
            .collect()
    }

    /// 封存事件：写入冻结载荷并摘除该事件剩余的全部订阅（不再触发）。
    /// 已封存时返回 None 且不改动记录。
    pub(crate) fn seal(&mut self, key: EventKey, payload: Payload) -> Option<Vec<Subscription>> {
        if self.sealed.contains_key(&key) {
            return None;
        }
        self.sealed.insert(key, payload);

        let (drained, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.subscriptions)
            .into_iter()
            .partition(|sub: &Subscription| sub.key == key);
        self.subscriptions = kept;
        self.over_limit.remove(&key);
        Some(drained)
    }

    pub(crate) fn is_sealed(&self, key: EventKey) -> bool {
        self.sealed.contains_key(&key)
    }

    pub(crate) fn sealed_payload(&self, key: EventKey) -> Option<Payload> {
        self.sealed.get(&key).cloned()
    }

    pub(crate) fn count(&self, key: EventKey) -> usize {
        self.subscriptions.iter().filter(|s| s.key == key).count()
    }

    pub(crate) fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// 该事件订阅清零后重新允许告警
    fn rearm(&mut self, key: EventKey) {
        if self.count(key) == 0 {
            self.over_limit.remove(&key);
        }
    }

    /// 首次超过阈值时返回 true（每个事件只提示一次，订阅清零后重新计）
    pub(crate) fn crossed_limit(&mut self, key: EventKey, max: usize) -> bool {
        if max == 0 || self.count(key) <= max {
            return false;
        }
        self.over_limit.insert(key)
    }

    /// 清空订阅与封存记录，返回被丢弃的订阅与载荷（由调用方在锁外释放）
    pub(crate) fn clear(&mut self) -> (Vec<Subscription>, HashMap<EventKey, Payload>) {
        self.over_limit.clear();
        (
            std::mem::take(&mut self.subscriptions),
            std::mem::take(&mut self.sealed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventMap};
    use crate::listener::{Listener, erase};
    use std::sync::Arc;

    struct Map;
    impl EventMap for Map {}

    #[derive(Clone)]
    struct Greet(&'static str);
    impl Event<Map> for Greet {
        const NAME: &'static str = "greet";
    }

    #[derive(Clone)]
    struct Boot(u32);
    impl Event<Map> for Boot {
        const NAME: &'static str = "boot";
    }

    fn greet() -> EventKey {
        EventKey::of::<Map, Greet>()
    }

    fn boot() -> EventKey {
        EventKey::of::<Map, Boot>()
    }

    fn noop() -> ErasedCallback {
        erase(|_: &Greet| {})
    }

    fn subscribe(reg: &mut Registry, key: EventKey, listener: ListenerId, once: bool) -> SubscriptionId {
        match reg.register(key, listener, once, noop()) {
            Registration::Subscribed(id) => id,
            Registration::Replay(..) => panic!("unexpected replay"),
        }
    }

    #[test]
    fn test_register_keeps_insertion_order() {
        let mut reg = Registry::new();
        let l = Listener::new(|_: &Greet| {}).id();
        let a = subscribe(&mut reg, greet(), l, false);
        let _ = subscribe(&mut reg, boot(), l, false);
        let c = subscribe(&mut reg, greet(), l, true);

        let ids: Vec<_> = reg.snapshot(greet()).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a, c]);
        assert_eq!(reg.count(greet()), 2);
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn test_remove_matching_by_listener() {
        let mut reg = Registry::new();
        let l1 = Listener::new(|_: &Greet| {}).id();
        let l2 = Listener::new(|_: &Greet| {}).id();
        subscribe(&mut reg, greet(), l1, false);
        subscribe(&mut reg, greet(), l2, false);
        subscribe(&mut reg, greet(), l1, true);
        subscribe(&mut reg, boot(), l1, false);

        assert_eq!(reg.remove_matching(greet(), Some(l1), false).len(), 2);
        assert_eq!(reg.count(greet()), 1);
        assert_eq!(reg.count(boot()), 1);
        // 不存在的匹配不报错
        assert!(reg.remove_matching(greet(), Some(l1), false).is_empty());
    }

    #[test]
    fn test_remove_matching_once_only() {
        let mut reg = Registry::new();
        let l = Listener::new(|_: &Greet| {}).id();
        subscribe(&mut reg, greet(), l, false);
        subscribe(&mut reg, greet(), l, true);
        subscribe(&mut reg, greet(), l, true);

        assert_eq!(reg.remove_matching(greet(), None, true).len(), 2);
        assert_eq!(reg.count(greet()), 1);
        assert_eq!(reg.remove_matching(greet(), None, false).len(), 1);
        assert_eq!(reg.count(greet()), 0);
    }

    #[test]
    fn test_seal_drains_and_rejects_second_seal() {
        let mut reg = Registry::new();
        let l = Listener::new(|_: &Boot| {}).id();
        subscribe(&mut reg, boot(), l, false);
        subscribe(&mut reg, boot(), l, true);
        subscribe(&mut reg, greet(), l, false);

        let drained = reg.seal(boot(), Arc::new(Boot(42))).unwrap();
        assert_eq!(drained.len(), 2);
        assert_eq!(reg.count(boot()), 0);
        assert_eq!(reg.count(greet()), 1);
        assert!(reg.is_sealed(boot()));

        assert!(reg.seal(boot(), Arc::new(Boot(7))).is_none());
        let stored = reg.sealed_payload(boot()).unwrap();
        assert_eq!(stored.downcast_ref::<Boot>().unwrap().0, 42);
    }

    #[test]
    fn test_register_on_sealed_replays() {
        let mut reg = Registry::new();
        reg.seal(greet(), Arc::new(Greet("Alice"))).unwrap();

        let l = Listener::new(|_: &Greet| {}).id();
        match reg.register(greet(), l, false, noop()) {
            Registration::Replay(payload, _) => {
                assert_eq!(payload.downcast_ref::<Greet>().unwrap().0, "Alice");
            }
            Registration::Subscribed(_) => panic!("sealed event must not accept subscriptions"),
        }
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn test_remove_by_id() {
        let mut reg = Registry::new();
        let l = Listener::new(|_: &Greet| {}).id();
        let a = subscribe(&mut reg, greet(), l, false);
        let b = subscribe(&mut reg, greet(), l, false);

        assert!(reg.remove_by_id(a).is_some());
        assert!(reg.remove_by_id(a).is_none());
        assert!(!reg.contains(a));
        assert!(reg.contains(b));
    }

    #[test]
    fn test_crossed_limit_reports_once() {
        let mut reg = Registry::new();
        let l = Listener::new(|_: &Greet| {}).id();
        subscribe(&mut reg, greet(), l, false);
        assert!(!reg.crossed_limit(greet(), 1));
        subscribe(&mut reg, greet(), l, false);
        assert!(reg.crossed_limit(greet(), 1));
        subscribe(&mut reg, greet(), l, false);
        assert!(!reg.crossed_limit(greet(), 1));
        // 0 表示关闭提示
        assert!(!reg.crossed_limit(greet(), 0));
    }

    // 测试按 ID 移除至清零后告警重新生效
    #[test]
    fn test_remove_by_id_rearms_limit() {
        let mut reg = Registry::new();
        let l = Listener::new(|_: &Greet| {}).id();
        let a = subscribe(&mut reg, greet(), l, false);
        let b = subscribe(&mut reg, greet(), l, true);
        assert!(reg.crossed_limit(greet(), 1));

        reg.remove_by_id(a).unwrap();
        // 仍有订阅，不重新计
        subscribe(&mut reg, greet(), l, false);
        assert!(!reg.crossed_limit(greet(), 1));

        let ids: Vec<_> = reg.snapshot(greet()).iter().map(|e| e.id).collect();
        for id in ids {
            reg.remove_by_id(id).unwrap();
        }
        assert!(!reg.contains(b));
        assert_eq!(reg.count(greet()), 0);

        subscribe(&mut reg, greet(), l, false);
        subscribe(&mut reg, greet(), l, false);
        assert!(reg.crossed_limit(greet(), 1));
    }

    #[test]
    fn test_clear() {
        let mut reg = Registry::new();
        let l = Listener::new(|_: &Greet| {}).id();
        subscribe(&mut reg, greet(), l, false);
        reg.seal(boot(), Arc::new(Boot(1))).unwrap();

        let (dropped, records) = reg.clear();
        assert_eq!(dropped.len(), 1);
        assert_eq!(records.len(), 1);
        assert_eq!(reg.len(), 0);
        assert!(!reg.is_sealed(boot()));
        assert!(reg.seal(boot(), Arc::new(Boot(2))).is_some());
    }
}
