//! 监听器分类器（ListenerClassifier）
//!
//! 判定监听器是否为持久监听器：声明 `AfterCommit` 投递阶段、
//! 且能导出稳定标识的监听器才进入可靠投递路径。
//! 分类结果按稳定标识缓存；分类只取决于注册元信息，缓存无需失效。
//!
use crate::eventing::listener::{DeliveryPhase, EventListener};
use crate::eventing::target::TargetIdentifier;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// 持久/瞬时监听器分类器，内部缓存可安全并发读写
#[derive(Default)]
pub struct ListenerClassifier {
    cache: RwLock<HashMap<TargetIdentifier, bool>>,
}

impl ListenerClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 监听器是否需要日志背书的可靠投递
    ///
    /// 无法导出稳定标识的监听器一律按瞬时处理，即使其声明了
    /// `AfterCommit`；该判定不进缓存（匿名注册没有缓存键，判定本身也不昂贵）。
    pub fn is_durable(&self, listener: &dyn EventListener) -> bool {
        let Ok(target) = TargetIdentifier::for_listener(listener) else {
            return false;
        };

        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&target)
        {
            return *cached;
        }

        let durable = listener.delivery_phase() == DeliveryPhase::AfterCommit;
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(target, durable);
        durable
    }

    /// 清空缓存，供测试在多轮运行之间复位
    pub fn clear(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
