//! 发布日志（PublicationLog）协议
//!
//! 可靠投递的唯一共享持久资源。对日志的全部变更以单条记录为原子单位，
//! 不要求跨记录的锁或事务。
//!
use crate::domain_event::EventEnvelope;
use crate::error::EventResult;
use crate::eventing::TargetIdentifier;
use crate::persist::EventPublication;
use async_trait::async_trait;

/// 发布日志：持久保存发布记录并支持完成标记与未完成查询
#[async_trait]
pub trait PublicationLog: Send + Sync {
    /// 为每个目标各持久化一条未完成记录，返回顺序与 `targets` 一致。
    ///
    /// 写入必须发生在调用方当前工作单元内：工作单元被放弃时记录一并消失。
    /// 写入失败向调用方上抛，持久化不允许被静默跳过。
    async fn store(
        &self,
        event: &EventEnvelope,
        targets: &[TargetIdentifier],
    ) -> EventResult<Vec<EventPublication>>;

    /// 标记记录完成；对已完成记录重复标记为空操作，不是错误
    async fn mark_completed(&self, publication: &EventPublication) -> EventResult<()>;

    /// 查询当前所有未完成的记录；每次调用反映当下状态，顺序不作承诺
    async fn find_incomplete_publications(&self) -> EventResult<Vec<EventPublication>>;
}
