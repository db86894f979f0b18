//! 监听器注册表（ListenerRegistry）
//!
//! 按事件类型索引监听器，并支持按稳定标识反查，供恢复流程
//! 在重启后重新解析发布记录的目标。
//!
use crate::eventing::listener::{EventListener, HandledEventType};
use crate::eventing::target::TargetIdentifier;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct ListenerRegistry {
    by_type: HashMap<String, Vec<Arc<dyn EventListener>>>,
    all: Vec<Arc<dyn EventListener>>,
    listeners: Vec<Arc<dyn EventListener>>,
}

impl ListenerRegistry {
    pub fn new(listeners: Vec<Arc<dyn EventListener>>) -> Self {
        let mut by_type: HashMap<String, Vec<Arc<dyn EventListener>>> = HashMap::new();
        let mut all: Vec<Arc<dyn EventListener>> = Vec::new();

        for listener in &listeners {
            match listener.handled_event_type() {
                HandledEventType::All => all.push(listener.clone()),
                HandledEventType::One(event_type) => {
                    by_type.entry(event_type).or_default().push(listener.clone());
                }
                HandledEventType::Many(event_types) => {
                    for event_type in event_types {
                        by_type.entry(event_type).or_default().push(listener.clone());
                    }
                }
            }
        }

        Self {
            by_type,
            all,
            listeners,
        }
    }

    /// 订阅给定事件类型的监听器（类型匹配 + 全量订阅）
    pub fn matching(&self, event_type: &str) -> Vec<Arc<dyn EventListener>> {
        let mut merged: Vec<Arc<dyn EventListener>> = Vec::new();
        if let Some(list) = self.by_type.get(event_type) {
            merged.extend(list.iter().cloned());
        }
        merged.extend(self.all.iter().cloned());
        merged
    }

    /// 当前注册的全部监听器
    pub fn listeners(&self) -> &[Arc<dyn EventListener>] {
        &self.listeners
    }

    /// 按稳定标识反查监听器；无法导出标识的注册直接跳过
    pub fn resolve(&self, target: &TargetIdentifier) -> Option<Arc<dyn EventListener>> {
        self.listeners
            .iter()
            .find(|listener| {
                TargetIdentifier::for_listener(listener.as_ref())
                    .is_ok_and(|derived| &derived == target)
            })
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}
