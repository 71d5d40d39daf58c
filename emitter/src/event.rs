//! 事件表（EventMap）与事件（Event）
//!
//! 由宿主应用声明：一个事件表类型 `M`，以及若干实现 `Event<M>` 的载荷类型。
//! 载荷类型本身即事件标识（类似 symbol 的键），其字段即事件参数。
//! 运行期注册表以类型擦除后的 [`EventKey`] 为键，在泛型公开方法处恢复类型。
//!
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 事件表标记：用于把一组事件绑定到某一类发射器上
pub trait EventMap: Send + Sync + 'static {}

/// 属于事件表 `M` 的事件；实现类型即为事件参数
pub trait Event<M: EventMap>: Clone + Send + Sync + 'static {
    /// 事件名（用于日志与错误信息）
    const NAME: &'static str;
}

/// 类型擦除后的事件键，仅以 `TypeId` 判等
#[derive(Clone, Copy)]
pub struct EventKey {
    type_id: TypeId,
    name: &'static str,
}

impl EventKey {
    pub fn of<M, E>() -> Self
    where
        M: EventMap,
        E: Event<M>,
    {
        Self {
            type_id: TypeId::of::<E>(),
            name: <E as Event<M>>::NAME,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EventKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EventKey {}

impl Hash for EventKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventKey").field(&self.name).finish()
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Map;
    impl EventMap for Map {}

    #[derive(Clone)]
    struct Greet;
    impl Event<Map> for Greet {
        const NAME: &'static str = "greet";
    }

    // 同名但不同类型的事件不应冲突
    #[derive(Clone)]
    struct FakeGreet;
    impl Event<Map> for FakeGreet {
        const NAME: &'static str = "greet";
    }

    #[test]
    fn test_key_equality_by_type() {
        assert_eq!(EventKey::of::<Map, Greet>(), EventKey::of::<Map, Greet>());
        assert_ne!(EventKey::of::<Map, Greet>(), EventKey::of::<Map, FakeGreet>());
    }

    #[test]
    fn test_key_display() {
        let key = EventKey::of::<Map, Greet>();
        assert_eq!(key.name(), "greet");
        assert_eq!(key.to_string(), "greet");
        assert_eq!(format!("{:?}", key), "EventKey(\"greet\")");
    }
}
