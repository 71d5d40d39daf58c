//! 类型化发布/订阅事件发射器（emitter）
//!
//! 可嵌入任意组件的事件面：注册监听、按注册顺序同步分发，
//! 以及若干在此之上的语义：
//! - 一次性订阅（`once` / `once_with` / `off_once`），以延迟值形式等待；
//! - 事件封存（`emit_once`）：事件永久触发一次，迟到的订阅者直接回放载荷；
//! - 就绪闸门（`prepared` / `ready`）：延后执行直到初始化信号到达；
//! - 跨发射器转发（`pipe` / `pipe_once`）。
//!
//! 不包含网络传输、持久化、跨进程投递、通配匹配与排队/背压。
//!
//! 典型用法：
//! 1. 用 `#[event_map]` 声明事件表，用 `#[event(map = ...)]` 声明各事件载荷；
//! 2. 在组件中持有 `EventEmitter<YourMap>`，对外暴露订阅方法；
//! 3. 通过 `emit` / `emit_once` 通知监听者。
//!
//! ```
//! use emitter::{EventEmitter, Listener, event, event_map};
//!
//! #[event_map]
//! pub struct AppEvents;
//!
//! #[event(map = AppEvents, name = "greet")]
//! pub struct Greet(pub String);
//!
//! let emitter = EventEmitter::<AppEvents>::new();
//! let handle = emitter.on(Listener::new(|g: &Greet| println!("hello, {}", g.0)));
//! emitter.emit(Greet("Alice".into())).unwrap();
//! handle.stop();
//! ```
//!
pub mod config;
pub mod deferred;
pub mod error;
pub mod event;
pub mod event_emitter;
pub mod handle;
pub mod listener;
mod pipe;
mod readiness;
mod registry;

pub use config::EmitterConfig;
pub use deferred::Deferred;
pub use error::{EmitterError, EmitterResult};
pub use event::{Event, EventKey, EventMap};
pub use event_emitter::EventEmitter;
pub use handle::ListenerHandle;
pub use listener::{Listener, ListenerId};
pub use registry::SubscriptionId;

#[cfg(feature = "macros")]
pub use emitter_macros::{event, event_map};

// 允许在本 crate 内部通过 ::emitter 进行自引用，
// 以便宏展开在本 crate 的测试与文档示例中也能解析到 ::emitter 路径。
extern crate self as emitter;
