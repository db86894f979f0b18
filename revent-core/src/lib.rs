//! 可靠事件发布基础库（revent-core）
//!
//! 为进程内领域事件提供“至少一次”的投递保证：事件分发给持久监听器前，
//! 先在发布日志中落盘一条发布记录，该记录只有在对应监听器成功处理后才标记完成；
//! 进程崩溃或重启后，恢复流程重放所有仍未完成的记录。
//!
//! 核心构件：
//! - 领域事件与类型擦除信封（`domain_event`）
//! - 监听器协议、分类、注册表与分发/恢复（`eventing`）
//! - 发布记录模型与发布日志协议（`persist`）
//! - 统一错误类型（`error`）
//!
//! 本 crate 只定义协议与调度逻辑，不绑定具体存储；发布日志的持久实现
//! （例如 Postgres）由独立 crate 提供并注入。监听器必须幂等：
//! 已投递但未来得及标记完成的记录会被再次投递。
//!
//! 典型用法：
//! 1. 实现 `DomainEvent` 定义事件，`EventListener` 定义监听器；
//! 2. 需要可靠投递的监听器声明 `AfterCommit` 投递阶段与方法注册元信息；
//! 3. 以 `ListenerRegistry` + `PublicationLog` 构建 `EventDispatcher` 分发事件；
//! 4. 进程启动时（或按计划）运行 `RecoveryRunner` 重放未完成的发布。
//!
pub mod domain_event;
pub mod error;
pub mod eventing;
pub mod persist;
