//! 发射器统一错误定义
//!
//! 仅包含发射器自身可能产生的最小错误集合；监听器内部的 panic 不在此列，
//! 会直接沿 `emit`/`emit_once` 调用栈向上传播。
//!
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitterError {
    /// 事件已通过 `emit_once` 封存，不可再次发射
    #[error("event already sealed by emit_once: event={event}")]
    SealedEventReEmission { event: &'static str },

    /// 延迟值对应的订阅在触发前被移除（off / off_once / clear_events / 发射器释放）
    #[error("subscription removed before the event fired: event={event}")]
    Cancelled { event: &'static str },
}

impl EmitterError {
    pub fn sealed(event: &'static str) -> Self {
        Self::SealedEventReEmission { event }
    }

    pub fn cancelled(event: &'static str) -> Self {
        Self::Cancelled { event }
    }

    /// 触发错误的事件名
    pub fn event(&self) -> &'static str {
        match self {
            Self::SealedEventReEmission { event } | Self::Cancelled { event } => event,
        }
    }
}

/// 统一 Result 类型别名
pub type EmitterResult<T> = Result<T, EmitterError>;
