//! 事件信封（EventEnvelope）
//!
//! 生产方事件在进入分发流程时被类型擦除为统一的信封形态：
//! 载荷序列化为 JSON，附带事件标识、类型与发生时间。
//! 首次分发与恢复重放投递给监听器的都是该信封；`event_id` 在重投时保持不变，
//! 幂等的监听器可据此去重。
//!
use crate::domain_event::DomainEvent;
use crate::error::EventResult;
use crate::persist::{deserialize_event, serialize_event};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// 事件唯一标识符，重投时保持不变
    event_id: String,
    /// 事件类型，用于监听器匹配
    event_type: String,
    /// 事件载荷
    payload: Value,
    /// 事件发生时间
    occurred_at: DateTime<Utc>,
}

impl EventEnvelope {
    /// 将生产方事件包装为信封，载荷即时序列化
    pub fn of<E: DomainEvent>(event: &E) -> EventResult<Self> {
        Ok(Self {
            event_id: Uuid::new_v4().to_string(),
            event_type: event.event_type().to_string(),
            payload: serialize_event(event)?,
            occurred_at: Utc::now(),
        })
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// 还原为生产方事件类型；类型不一致仅告警，不视为错误
    pub fn payload_as<E: DomainEvent>(&self) -> EventResult<E> {
        deserialize_event(&self.payload, &self.event_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct OrderPlaced {
        order_id: u64,
    }

    impl DomainEvent for OrderPlaced {
        fn event_type(&self) -> &str {
            "OrderPlaced"
        }
    }

    #[test]
    fn wraps_and_restores_payload() {
        let event = OrderPlaced { order_id: 42 };
        let envelope = EventEnvelope::of(&event).unwrap();

        assert_eq!(envelope.event_type(), "OrderPlaced");
        assert!(!envelope.event_id().is_empty());

        let restored: OrderPlaced = envelope.payload_as().unwrap();
        assert_eq!(restored, event);
    }

    #[test]
    fn envelopes_of_same_event_have_distinct_ids() {
        let event = OrderPlaced { order_id: 1 };
        let a = EventEnvelope::of(&event).unwrap();
        let b = EventEnvelope::of(&event).unwrap();
        assert_ne!(a.event_id(), b.event_id());
    }
}
