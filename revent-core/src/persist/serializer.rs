//! 事件载荷序列化工具
//!
//! 仅供需要字节级持久化的发布日志后端使用；内存实现直接保存 JSON 值。
//! 反序列化在类型不一致时只告警不报错，以容忍跨重启演进的载荷类型。
//!
use crate::domain_event::DomainEvent;
use crate::error::EventResult;
use serde_json::Value;

/// 将事件载荷序列化为可存储的 JSON 值
pub fn serialize_event<E: DomainEvent>(event: &E) -> EventResult<Value> {
    Ok(serde_json::to_value(event)?)
}

/// 从存储形态还原事件载荷
///
/// 还原后若载荷自述的事件类型与存储记录不一致，仅记录告警并照常返回，
/// 使重放不被演进中的载荷类型阻断。
pub fn deserialize_event<E: DomainEvent>(payload: &Value, stored_type: &str) -> EventResult<E> {
    let event: E = serde_json::from_value(payload.clone())?;

    if event.event_type() != stored_type {
        tracing::warn!(
            stored = %stored_type,
            actual = %event.event_type(),
            "stored event type differs from deserialized payload"
        );
    }

    Ok(event)
}
