//! 事件分发器（EventDispatcher）
//!
//! 在调用方所在任务上同步完成一次发布：
//! - 解析订阅监听器并按持久/瞬时分流；
//! - 持久监听器对应的发布记录先于任何调用落盘，且处于调用方当前工作单元内；
//! - 调用全部监听器：持久监听器成功后标记记录完成，失败只记日志、留待恢复；
//!   瞬时监听器的失败按普通内存分发语义原样上抛。
//!
//! 分发器自身不引入任何后台任务。
//!
use crate::domain_event::{DomainEvent, EventEnvelope};
use crate::error::{EventError, EventResult};
use crate::eventing::classifier::ListenerClassifier;
use crate::eventing::listener::EventListener;
use crate::eventing::registry::ListenerRegistry;
use crate::eventing::target::TargetIdentifier;
use crate::persist::{EventPublication, PublicationLog};
use bon::Builder;
use std::sync::Arc;

#[derive(Builder)]
pub struct EventDispatcher {
    registry: Arc<ListenerRegistry>,
    publication_log: Arc<dyn PublicationLog>,
    #[builder(default)]
    classifier: Arc<ListenerClassifier>,
}

impl EventDispatcher {
    /// 包装并分发一个生产方事件
    pub async fn publish<E: DomainEvent>(&self, event: &E) -> EventResult<()> {
        self.dispatch(&EventEnvelope::of(event)?).await
    }

    /// 分发一个事件信封
    pub async fn dispatch(&self, event: &EventEnvelope) -> EventResult<()> {
        let listeners = self.registry.matching(event.event_type());
        if listeners.is_empty() {
            return Ok(());
        }

        let mut durable: Vec<(Arc<dyn EventListener>, TargetIdentifier)> = Vec::new();
        let mut transient: Vec<Arc<dyn EventListener>> = Vec::new();
        for listener in listeners {
            // 标识导不出的监听器即使声明了 AfterCommit 也降级为瞬时
            if self.classifier.is_durable(listener.as_ref())
                && let Ok(target) = TargetIdentifier::for_listener(listener.as_ref())
            {
                durable.push((listener, target));
            } else {
                transient.push(listener);
            }
        }

        let publications = if durable.is_empty() {
            Vec::new()
        } else {
            let targets: Vec<TargetIdentifier> =
                durable.iter().map(|(_, target)| target.clone()).collect();
            // 记录必须先于任何监听器调用落盘；落盘失败上抛，生产方的工作单元随之失败
            self.publication_log.store(event, &targets).await?
        };

        for ((listener, _), publication) in durable.iter().zip(publications.iter()) {
            invoke_with_completion(
                self.publication_log.as_ref(),
                event,
                listener.as_ref(),
                publication,
            )
            .await;
        }

        for listener in transient {
            listener
                .on_event(event)
                .await
                .map_err(|err| EventError::Listener {
                    listener: listener.registration().label(),
                    reason: err.to_string(),
                })?;
        }

        Ok(())
    }
}

/// 调用监听器并在成功后标记记录完成；首次分发与恢复重放共用该路径。
///
/// 返回记录是否在本次调用中转为完成。调用失败或标记失败都只记日志，
/// 记录保持未完成，由下一轮恢复兜底。
pub(crate) async fn invoke_with_completion(
    log: &dyn PublicationLog,
    event: &EventEnvelope,
    listener: &dyn EventListener,
    publication: &EventPublication,
) -> bool {
    match listener.on_event(event).await {
        Ok(()) => match log.mark_completed(publication).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    listener = %publication.target_identifier(),
                    error = %err,
                    "failed to mark publication completed, will retry on next recovery pass"
                );
                false
            }
        },
        Err(err) => {
            tracing::warn!(
                listener = %publication.target_identifier(),
                event_type = %event.event_type(),
                error = %err,
                "durable listener failed, publication left incomplete"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_event::DomainEvent;
    use crate::eventing::listener::{DeliveryPhase, HandledEventType, ListenerRegistration};
    use crate::persist::InMemoryPublicationLog;
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct OrderPlaced {
        order_id: u64,
    }

    impl DomainEvent for OrderPlaced {
        fn event_type(&self) -> &str {
            "OrderPlaced"
        }
    }

    struct SpyListener {
        name: &'static str,
        phase: DeliveryPhase,
        anonymous: bool,
        fail: bool,
        invoked: AtomicUsize,
    }

    impl SpyListener {
        fn new(name: &'static str, phase: DeliveryPhase) -> Arc<Self> {
            Arc::new(Self {
                name,
                phase,
                anonymous: false,
                fail: false,
                invoked: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str, phase: DeliveryPhase) -> Arc<Self> {
            Arc::new(Self {
                name,
                phase,
                anonymous: false,
                fail: true,
                invoked: AtomicUsize::new(0),
            })
        }

        fn anonymous(phase: DeliveryPhase) -> Arc<Self> {
            Arc::new(Self {
                name: "anonymous",
                phase,
                anonymous: true,
                fail: false,
                invoked: AtomicUsize::new(0),
            })
        }

        fn invocations(&self) -> usize {
            self.invoked.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl EventListener for SpyListener {
        fn registration(&self) -> ListenerRegistration {
            if self.anonymous {
                ListenerRegistration::Anonymous
            } else {
                ListenerRegistration::method(self.name, "on_event")
            }
        }

        fn delivery_phase(&self) -> DeliveryPhase {
            self.phase
        }

        fn handled_event_type(&self) -> HandledEventType {
            HandledEventType::One("OrderPlaced".into())
        }

        async fn on_event(&self, _event: &EventEnvelope) -> anyhow::Result<()> {
            self.invoked.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                anyhow::bail!("listener failure requested");
            }
            Ok(())
        }
    }

    /// 在被调用时检查自己的记录是否已经落盘
    struct StoreOrderProbe {
        log: Arc<InMemoryPublicationLog>,
        records_seen: AtomicUsize,
    }

    #[async_trait]
    impl EventListener for StoreOrderProbe {
        fn registration(&self) -> ListenerRegistration {
            ListenerRegistration::method("StoreOrderProbe", "on_event")
        }

        fn delivery_phase(&self) -> DeliveryPhase {
            DeliveryPhase::AfterCommit
        }

        fn handled_event_type(&self) -> HandledEventType {
            HandledEventType::One("OrderPlaced".into())
        }

        async fn on_event(&self, _event: &EventEnvelope) -> anyhow::Result<()> {
            self.records_seen
                .store(self.log.publications().len(), Ordering::Relaxed);
            Ok(())
        }
    }

    struct FailingLog;

    #[async_trait]
    impl PublicationLog for FailingLog {
        async fn store(
            &self,
            _event: &EventEnvelope,
            _targets: &[TargetIdentifier],
        ) -> EventResult<Vec<EventPublication>> {
            Err(EventError::PublicationLog {
                reason: "store unavailable".into(),
            })
        }

        async fn mark_completed(&self, _publication: &EventPublication) -> EventResult<()> {
            Ok(())
        }

        async fn find_incomplete_publications(&self) -> EventResult<Vec<EventPublication>> {
            Ok(Vec::new())
        }
    }

    fn dispatcher(
        listeners: Vec<Arc<dyn EventListener>>,
        log: Arc<InMemoryPublicationLog>,
    ) -> EventDispatcher {
        EventDispatcher::builder()
            .registry(Arc::new(ListenerRegistry::new(listeners)))
            .publication_log(log)
            .build()
    }

    #[tokio::test]
    async fn creates_one_record_per_durable_listener() {
        let log = Arc::new(InMemoryPublicationLog::new());
        let durable_ok = SpyListener::new("Projector", DeliveryPhase::AfterCommit);
        let durable_fail = SpyListener::failing("Mailer", DeliveryPhase::AfterCommit);
        let transient = SpyListener::new("Logger", DeliveryPhase::Immediate);

        let dispatcher = dispatcher(
            vec![durable_ok.clone(), durable_fail.clone(), transient.clone()],
            log.clone(),
        );
        dispatcher.publish(&OrderPlaced { order_id: 42 }).await.unwrap();

        let publications = log.publications();
        assert_eq!(publications.len(), 2);
        assert_eq!(durable_ok.invocations(), 1);
        assert_eq!(durable_fail.invocations(), 1);
        assert_eq!(transient.invocations(), 1);

        // 成功的持久监听器完成，失败的保持未完成
        let incomplete = log.find_incomplete_publications().await.unwrap();
        assert_eq!(incomplete.len(), 1);
        assert!(
            incomplete[0].is_identified_by(&TargetIdentifier::from("Mailer::on_event".to_string()))
        );
    }

    #[tokio::test]
    async fn transient_only_dispatch_creates_no_records() {
        let log = Arc::new(InMemoryPublicationLog::new());
        let transient = SpyListener::new("Logger", DeliveryPhase::Immediate);

        let dispatcher = dispatcher(vec![transient.clone()], log.clone());
        dispatcher.publish(&OrderPlaced { order_id: 1 }).await.unwrap();

        assert!(log.publications().is_empty());
        assert_eq!(transient.invocations(), 1);
    }

    #[tokio::test]
    async fn no_listeners_is_a_no_op() {
        let log = Arc::new(InMemoryPublicationLog::new());
        let dispatcher = dispatcher(Vec::new(), log.clone());

        dispatcher.publish(&OrderPlaced { order_id: 2 }).await.unwrap();
        assert!(log.publications().is_empty());
    }

    #[tokio::test]
    async fn record_is_stored_before_listener_runs() {
        let log = Arc::new(InMemoryPublicationLog::new());
        let probe = Arc::new(StoreOrderProbe {
            log: log.clone(),
            records_seen: AtomicUsize::new(0),
        });

        let dispatcher = dispatcher(vec![probe.clone()], log.clone());
        dispatcher.publish(&OrderPlaced { order_id: 3 }).await.unwrap();

        assert_eq!(probe.records_seen.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn anonymous_after_commit_listener_is_dispatched_transiently() {
        let log = Arc::new(InMemoryPublicationLog::new());
        let listener = SpyListener::anonymous(DeliveryPhase::AfterCommit);

        let dispatcher = dispatcher(vec![listener.clone()], log.clone());
        dispatcher.publish(&OrderPlaced { order_id: 4 }).await.unwrap();

        assert!(log.publications().is_empty());
        assert_eq!(listener.invocations(), 1);
    }

    #[tokio::test]
    async fn durable_listener_failure_is_not_propagated() {
        let log = Arc::new(InMemoryPublicationLog::new());
        let durable_fail = SpyListener::failing("Mailer", DeliveryPhase::AfterCommit);

        let dispatcher = dispatcher(vec![durable_fail.clone()], log.clone());
        let result = dispatcher.publish(&OrderPlaced { order_id: 5 }).await;

        assert!(result.is_ok());
        assert_eq!(log.find_incomplete_publications().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn transient_listener_failure_propagates() {
        let log = Arc::new(InMemoryPublicationLog::new());
        let transient_fail = SpyListener::failing("Logger", DeliveryPhase::Immediate);

        let dispatcher = dispatcher(vec![transient_fail.clone()], log.clone());
        let err = dispatcher
            .publish(&OrderPlaced { order_id: 6 })
            .await
            .unwrap_err();

        assert!(matches!(err, EventError::Listener { .. }));
    }

    #[tokio::test]
    async fn store_failure_propagates_and_no_listener_runs() {
        let durable = SpyListener::new("Projector", DeliveryPhase::AfterCommit);
        let dispatcher = EventDispatcher::builder()
            .registry(Arc::new(ListenerRegistry::new(vec![
                durable.clone() as Arc<dyn EventListener>
            ])))
            .publication_log(Arc::new(FailingLog))
            .build();

        let err = dispatcher
            .publish(&OrderPlaced { order_id: 7 })
            .await
            .unwrap_err();

        assert!(matches!(err, EventError::PublicationLog { .. }));
        assert_eq!(durable.invocations(), 0);
    }
}
