//! 内存版发布日志（InMemoryPublicationLog）
//!
//! 满足 `PublicationLog` 协议的轻量实现：
//! - 典型用途：测试环境、示例与尚未接入持久存储的本地开发；
//! - 进程结束即丢失，不提供真正的崩溃恢复。
//!
use crate::domain_event::EventEnvelope;
use crate::error::{EventError, EventResult};
use crate::eventing::TargetIdentifier;
use crate::persist::{EventPublication, PublicationLog};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// 简单的内存发布日志实现
#[derive(Default)]
pub struct InMemoryPublicationLog {
    publications: Mutex<Vec<EventPublication>>,
}

impl InMemoryPublicationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前全部记录的快照（含已完成），供测试与审计查看
    pub fn publications(&self) -> Vec<EventPublication> {
        self.guard().clone()
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, Vec<EventPublication>> {
        self.publications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PublicationLog for InMemoryPublicationLog {
    async fn store(
        &self,
        event: &EventEnvelope,
        targets: &[TargetIdentifier],
    ) -> EventResult<Vec<EventPublication>> {
        let created: Vec<EventPublication> = targets
            .iter()
            .map(|target| EventPublication::new(event, target.clone()))
            .collect();

        self.guard().extend(created.iter().cloned());
        Ok(created)
    }

    async fn mark_completed(&self, publication: &EventPublication) -> EventResult<()> {
        let mut publications = self.guard();
        match publications
            .iter_mut()
            .find(|stored| stored.publication_id() == publication.publication_id())
        {
            Some(stored) => {
                stored.mark_completed();
                Ok(())
            }
            None => Err(EventError::NotFound {
                reason: format!("publication {}", publication.publication_id()),
            }),
        }
    }

    async fn find_incomplete_publications(&self) -> EventResult<Vec<EventPublication>> {
        Ok(self
            .guard()
            .iter()
            .filter(|publication| !publication.is_completed())
            .cloned()
            .collect())
    }
}
