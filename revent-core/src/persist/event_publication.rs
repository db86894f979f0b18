//! 发布记录（EventPublication）
//!
//! 每条记录对应一次“事件发布 × 单个持久监听器”，是可靠投递的持久化单元。
//! 记录只有两个状态：未完成与已完成；完成是单向且幂等的，
//! 记录在完成前不会被删除。
//!
use crate::domain_event::EventEnvelope;
use crate::eventing::TargetIdentifier;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
pub struct EventPublication {
    /// 记录唯一标识符
    publication_id: String,
    /// 事件唯一标识符，重投时保持不变
    event_id: String,
    /// 事件类型
    event_type: String,
    /// 事件载荷（信封拆出的存储形态，与运行期信封解耦）
    payload: Value,
    /// 目标监听器的稳定标识
    target_identifier: TargetIdentifier,
    /// 记录创建时间（恢复时的排序参考，不承担正确性语义）
    publication_time: DateTime<Utc>,
    /// 完成时间；未完成为 None
    completed_at: Option<DateTime<Utc>>,
}

impl EventPublication {
    /// 为一个目标监听器创建未完成的发布记录
    pub fn new(event: &EventEnvelope, target: TargetIdentifier) -> Self {
        Self {
            publication_id: Uuid::new_v4().to_string(),
            event_id: event.event_id().to_string(),
            event_type: event.event_type().to_string(),
            payload: event.payload().clone(),
            target_identifier: target,
            publication_time: Utc::now(),
            completed_at: None,
        }
    }

    pub fn publication_id(&self) -> &str {
        &self.publication_id
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

    pub fn target_identifier(&self) -> &TargetIdentifier {
        &self.target_identifier
    }

    pub fn publication_time(&self) -> DateTime<Utc> {
        self.publication_time
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// 记录是否指向给定的目标监听器
    pub fn is_identified_by(&self, target: &TargetIdentifier) -> bool {
        &self.target_identifier == target
    }

    /// 标记完成；已完成的记录保持原完成时间不变（幂等、单向）
    pub fn mark_completed(&mut self) {
        if self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
        }
    }

    /// 重建事件信封，供恢复流程按原事件重放
    pub fn event(&self) -> EventEnvelope {
        EventEnvelope::builder()
            .event_id(self.event_id.clone())
            .event_type(self.event_type.clone())
            .payload(self.payload.clone())
            .occurred_at(self.publication_time)
            .build()
    }
}
