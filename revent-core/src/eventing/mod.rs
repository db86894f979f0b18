//! 事件子系统（eventing）
//!
//! 提供“可靠发布 + 崩溃恢复”的核心构件：
//! - `EventListener`：监听器协议（注册元信息、投递阶段、订阅类型）；
//! - `TargetIdentifier`：监听器的稳定标识，跨进程重启可解析；
//! - `ListenerClassifier`：区分持久监听器与瞬时监听器，结果按标识缓存；
//! - `ListenerRegistry`：按事件类型匹配监听器，并支持按标识反查；
//! - `EventDispatcher`：分发事件，先落盘发布记录再调用监听器；
//! - `RecoveryRunner`：启动期或按计划重放所有未完成的发布记录。
//!
//! 该模块仅定义协议与调度逻辑，发布日志的具体存储由 `persist` 协议的实现提供。
//!
pub mod classifier;
pub mod dispatcher;
pub mod listener;
pub mod recovery;
pub mod registry;
pub mod target;

pub use classifier::ListenerClassifier;
pub use dispatcher::EventDispatcher;
pub use listener::{DeliveryPhase, EventListener, HandledEventType, ListenerRegistration};
pub use recovery::{RecoveryConfig, RecoveryHandle, RecoveryRunner};
pub use registry::ListenerRegistry;
pub use target::TargetIdentifier;
