use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// 领域事件载荷需要满足的通用能力边界
pub trait DomainEvent:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync
{
    /// 事件类型（形如 `OrderEvent.Placed` 或自定义类型名），
    /// 用于监听器匹配与持久化后的载荷校验
    fn event_type(&self) -> &str;
}
