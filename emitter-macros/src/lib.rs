//! 发射器的声明宏
//!
//! - `#[event_map]`：声明事件表（单元结构体），实现 `::emitter::event::EventMap`；
//! - `#[event(map = T, name = "...")]`：声明事件载荷，实现 `::emitter::event::Event<T>`。
//!
use proc_macro::TokenStream;

mod event;
mod event_map;
mod utils;

/// 事件表宏
/// - 仅支持单元结构体：`pub struct AppEvents;`
/// - 合并/追加派生：Debug, Clone, Copy, Default
/// - 生成 `::emitter::event::EventMap` 实现
#[proc_macro_attribute]
pub fn event_map(attr: TokenStream, item: TokenStream) -> TokenStream {
    event_map::expand(attr, item)
}

/// 事件宏
/// - 支持结构体（具名、tuple、单元）与枚举
/// - 合并/追加派生：Debug, Clone
/// - 参数：`map = T`（必填，可重复以加入多个事件表）、`name = "..."`（默认取类型名）
/// - 为每个事件表生成 `::emitter::event::Event<T>` 实现
#[proc_macro_attribute]
pub fn event(attr: TokenStream, item: TokenStream) -> TokenStream {
    event::expand(attr, item)
}
