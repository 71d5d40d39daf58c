//! 监听器（Listener）
//!
//! 闭包本身没有可比较的身份，因此以 [`Listener`] 包装：构造时分配一个
//! [`ListenerId`]，克隆共享同一身份。`off` / `off_once` 按该 ID 匹配。
//!
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 监听器身份
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// 类型化的监听器：`Fn(&E) -> R`
pub struct Listener<E, R = ()> {
    id: ListenerId,
    callback: Arc<dyn Fn(&E) -> R + Send + Sync>,
}

impl<E, R> Listener<E, R> {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&E) -> R + Send + Sync + 'static,
    {
        Self {
            id: ListenerId::next(),
            callback: Arc::new(callback),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn call(&self, event: &E) -> R {
        (self.callback)(event)
    }
}

impl<E, R> Clone for Listener<E, R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<E, R> fmt::Debug for Listener<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish()
    }
}

impl<E, R> From<&Listener<E, R>> for ListenerId {
    fn from(listener: &Listener<E, R>) -> Self {
        listener.id
    }
}

/// 类型擦除的载荷
pub(crate) type Payload = Arc<dyn Any + Send + Sync>;

/// 类型擦除的回调：注册表内统一以 `&dyn Any` 调用
pub(crate) type ErasedCallback = Arc<dyn Fn(&(dyn Any + Send + Sync)) + Send + Sync>;

/// 擦除载荷类型；键与闭包同一泛型 `E`，正常情况下 downcast 不会失败
pub(crate) fn erase<E, F>(callback: F) -> ErasedCallback
where
    E: Send + Sync + 'static,
    F: Fn(&E) + Send + Sync + 'static,
{
    Arc::new(move |payload: &(dyn Any + Send + Sync)| {
        if let Some(event) = payload.downcast_ref::<E>() {
            callback(event);
        } else {
            tracing::error!(
                expected = std::any::type_name::<E>(),
                "payload type mismatch, listener skipped"
            );
        }
    })
}
