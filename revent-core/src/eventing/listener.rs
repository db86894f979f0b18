//! 事件监听器（EventListener）协议
//!
//! 定义订阅某类/多类/全部事件的处理逻辑与注册元信息：
//! - `ListenerRegistration`：注册形态，决定能否导出稳定标识；
//! - `DeliveryPhase`：投递阶段声明，`AfterCommit` 表示需要日志背书的可靠投递；
//! - `HandledEventType`：订阅的事件类型集合。
//!
use crate::domain_event::EventEnvelope;
use async_trait::async_trait;

#[derive(Clone, Debug)]
pub enum HandledEventType {
    One(String),
    Many(Vec<String>),
    All,
}

/// 监听器的注册形态
///
/// 只有以“类型名 + 方法名”注册的监听器才拥有跨重启稳定的标识；
/// 匿名注册（闭包、框架桥接器等）无法参与可靠投递。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerRegistration {
    Method { type_name: String, method: String },
    Anonymous,
}

impl ListenerRegistration {
    pub fn method(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        Self::Method {
            type_name: type_name.into(),
            method: method.into(),
        }
    }

    /// 用于日志与错误信息的展示名
    pub fn label(&self) -> String {
        match self {
            Self::Method { type_name, method } => format!("{type_name}::{method}"),
            Self::Anonymous => "anonymous".to_string(),
        }
    }
}

/// 监听器的投递阶段声明
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPhase {
    /// 分发现场立即调用，纯内存尽力而为
    Immediate,
    /// 提交完成阶段调用，要求至少一次、可重放的投递
    AfterCommit,
}

/// 事件监听器：消费某一类型的事件
#[async_trait]
pub trait EventListener: Send + Sync {
    /// 注册元信息；默认匿名，即不参与可靠投递
    fn registration(&self) -> ListenerRegistration {
        ListenerRegistration::Anonymous
    }

    /// 投递阶段；默认立即投递
    fn delivery_phase(&self) -> DeliveryPhase {
        DeliveryPhase::Immediate
    }

    /// 返回该监听器订阅的事件类型
    fn handled_event_type(&self) -> HandledEventType;

    /// 处理事件。重投可能让同一事件（相同 `event_id`）到达多次，实现必须幂等
    async fn on_event(&self, event: &EventEnvelope) -> anyhow::Result<()>;
}
