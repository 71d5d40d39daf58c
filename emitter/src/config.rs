//! 发射器配置
//!
use bon::Builder;

/// 单个事件的监听器数量超过该值时输出一次告警
pub const DEFAULT_MAX_LISTENERS: usize = 10;

/// 发射器配置
#[derive(Clone, Debug, Builder)]
pub struct EmitterConfig {
    /// 日志中标识该发射器的名称
    #[builder(into)]
    pub label: Option<String>,
    /// 单事件监听器数量告警阈值，0 表示关闭
    #[builder(default = DEFAULT_MAX_LISTENERS)]
    pub max_listeners: usize,
}

impl EmitterConfig {
    pub(crate) fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("emitter")
    }
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            label: None,
            max_listeners: DEFAULT_MAX_LISTENERS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = EmitterConfig::default();
        assert_eq!(cfg.label(), "emitter");
        assert_eq!(cfg.max_listeners, DEFAULT_MAX_LISTENERS);
    }

    #[test]
    fn test_builder_matches_default() {
        let built = EmitterConfig::builder().build();
        assert_eq!(built.label, None);
        assert_eq!(built.max_listeners, DEFAULT_MAX_LISTENERS);

        let cfg = EmitterConfig::builder().label("db").max_listeners(0).build();
        assert_eq!(cfg.label(), "db");
        assert_eq!(cfg.max_listeners, 0);
    }
}
