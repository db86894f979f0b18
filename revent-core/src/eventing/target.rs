//! 目标标识（TargetIdentifier）
//!
//! 监听器的稳定标识：由注册元信息纯函数式导出，与运行期实例无关，
//! 因此在进程重启后仍可据此找回同一监听器。
//!
use crate::error::{EventError, EventResult};
use crate::eventing::listener::{EventListener, ListenerRegistration};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetIdentifier(String);

impl TargetIdentifier {
    /// 从监听器注册元信息导出稳定标识
    ///
    /// 匿名注册没有足够的元信息，返回 `UnsupportedListener`；
    /// 这是分类流程的正常分支，不是异常路径。
    pub fn for_listener(listener: &dyn EventListener) -> EventResult<Self> {
        match listener.registration() {
            ListenerRegistration::Method { type_name, method } => {
                Ok(Self(format!("{type_name}::{method}")))
            }
            ListenerRegistration::Anonymous => Err(EventError::UnsupportedListener {
                reason: "listener has no method registration metadata".to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TargetIdentifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}
