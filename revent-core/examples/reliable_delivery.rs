/// 可靠投递（内存版）示例
/// 展示 分发 -> 落盘发布记录 -> 监听器失败 -> 恢复重放 的闭环
use anyhow::Result as AnyResult;
use async_trait::async_trait;
use revent_core::domain_event::{DomainEvent, EventEnvelope};
use revent_core::eventing::{
    DeliveryPhase, EventDispatcher, EventListener, HandledEventType, ListenerRegistry,
    ListenerRegistration, RecoveryRunner,
};
use revent_core::persist::{InMemoryPublicationLog, PublicationLog};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ============================================================================
// 领域事件
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OrderPlaced {
    order_id: u64,
    amount_cents: u64,
}

impl DomainEvent for OrderPlaced {
    fn event_type(&self) -> &str {
        "OrderPlaced"
    }
}

// ============================================================================
// 瞬时监听器：现场打印，不参与可靠投递
// ============================================================================

struct ConsoleLogger;

#[async_trait]
impl EventListener for ConsoleLogger {
    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::All
    }

    async fn on_event(&self, event: &EventEnvelope) -> AnyResult<()> {
        println!(
            "logger: type={} id={} payload={}",
            event.event_type(),
            event.event_id(),
            event.payload()
        );
        Ok(())
    }
}

// ============================================================================
// 持久监听器：首次处理失败，重放时成功
// ============================================================================

struct InvoiceMailer {
    seen: Mutex<HashSet<String>>,
}

#[async_trait]
impl EventListener for InvoiceMailer {
    fn registration(&self) -> ListenerRegistration {
        ListenerRegistration::method("InvoiceMailer", "on_order_placed")
    }

    fn delivery_phase(&self) -> DeliveryPhase {
        DeliveryPhase::AfterCommit
    }

    fn handled_event_type(&self) -> HandledEventType {
        HandledEventType::One("OrderPlaced".to_string())
    }

    async fn on_event(&self, event: &EventEnvelope) -> AnyResult<()> {
        let order: OrderPlaced = event.payload_as()?;
        // 按 event_id 识别重放：同一事件第二次到达时视为已具备发送条件
        if self.seen.lock().unwrap().insert(event.event_id().to_string()) {
            anyhow::bail!("smtp unreachable");
        }
        println!(
            "mailer: invoice for order {} ({} cents) sent",
            order.order_id, order.amount_cents
        );
        Ok(())
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt::init();
    println!("=== 可靠投递（内存版）示例 ===\n");

    let log = Arc::new(InMemoryPublicationLog::new());
    let registry = Arc::new(ListenerRegistry::new(vec![
        Arc::new(ConsoleLogger) as Arc<dyn EventListener>,
        Arc::new(InvoiceMailer {
            seen: Mutex::new(HashSet::new()),
        }),
    ]));

    let dispatcher = EventDispatcher::builder()
        .registry(registry.clone())
        .publication_log(log.clone() as Arc<dyn PublicationLog>)
        .build();

    // 分发：mailer 首次处理失败，其发布记录保持未完成
    dispatcher
        .publish(&OrderPlaced {
            order_id: 42,
            amount_cents: 19_900,
        })
        .await?;
    println!(
        "✅ 分发完成，未完成记录数: {}",
        log.find_incomplete_publications().await?.len()
    );

    // 恢复：相当于进程重启后的启动期重放
    let runner = RecoveryRunner::builder()
        .registry(registry)
        .publication_log(log.clone() as Arc<dyn PublicationLog>)
        .build();
    let completed = runner.recover_incomplete().await?;
    println!(
        "✅ 恢复完成 {completed} 条，未完成记录数: {}",
        log.find_incomplete_publications().await?.len()
    );

    Ok(())
}
