//! 发布记录持久化（persist）
//!
//! 定义发布记录的标准形态与持久化协议：
//! - `EventPublication`：一条“事件 × 目标监听器”的持久化记录；
//! - `PublicationLog`：发布日志协议（写入、标记完成、查询未完成）；
//! - `InMemoryPublicationLog`：内存实现，用于测试、示例与未接入持久存储的场景；
//! - `serialize_event` / `deserialize_event`：载荷序列化工具。
//!
//! 该模块聚焦协议与数据形态，具体存储后端（如 Postgres）由独立 crate 提供实现并注入。
//!
mod event_publication;
mod log_inmemory;
mod publication_log;
mod serializer;

pub use event_publication::EventPublication;
pub use log_inmemory::InMemoryPublicationLog;
pub use publication_log::PublicationLog;
pub use serializer::{deserialize_event, serialize_event};
