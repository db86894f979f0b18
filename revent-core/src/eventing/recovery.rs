//! 恢复执行器（RecoveryRunner）
//!
//! 扫描发布日志中所有未完成的记录，逐条重放给其目标监听器：
//! - 每条记录的恢复相互独立，单条失败不阻断整轮；
//! - 目标监听器已不存在时只告警跳过，记录保持未完成等待外部处置；
//! - 可单次调用（进程启动时），也可作为周期任务长驻运行。
//!
use crate::error::EventResult;
use crate::eventing::dispatcher::invoke_with_completion;
use crate::eventing::registry::ListenerRegistry;
use crate::persist::{EventPublication, PublicationLog};
use bon::Builder;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Builder)]
pub struct RecoveryRunner {
    registry: Arc<ListenerRegistry>,
    publication_log: Arc<dyn PublicationLog>,
    #[builder(default)]
    config: RecoveryConfig,
}

impl RecoveryRunner {
    /// 执行一轮恢复，返回本轮转为完成的记录数
    pub async fn recover_incomplete(&self) -> EventResult<usize> {
        let publications = self.publication_log.find_incomplete_publications().await?;

        let mut completed = 0;
        for publication in &publications {
            if self.recover_one(publication).await {
                completed += 1;
            }
        }

        Ok(completed)
    }

    async fn recover_one(&self, publication: &EventPublication) -> bool {
        let Some(listener) = self.registry.resolve(publication.target_identifier()) else {
            tracing::warn!(
                listener = %publication.target_identifier(),
                event_type = %publication.event_type(),
                "listener for incomplete publication not registered, skipping"
            );
            return false;
        };

        let event = publication.event();
        invoke_with_completion(
            self.publication_log.as_ref(),
            &event,
            listener.as_ref(),
            publication,
        )
        .await
    }

    /// 作为周期任务启动，返回可用于关闭/等待的句柄。
    /// 首个周期立即触发，承担进程启动时的那一轮恢复。
    pub fn start(self: Arc<Self>) -> RecoveryHandle {
        let token = CancellationToken::new();
        let mut tasks: Vec<JoinHandle<()>> = Vec::with_capacity(1);

        {
            let runner = self.clone();
            let token = token.clone();
            let interval = self.config.recover_interval;

            tasks.push(tokio::spawn(async move {
                let mut ticker = time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = ticker.tick() => {
                            if let Err(err) = runner.recover_incomplete().await {
                                tracing::warn!(error = %err, "recovery pass failed");
                            }
                        }
                    }
                }
            }));
        }

        RecoveryHandle { token, tasks }
    }
}

/// 恢复调度配置
#[derive(Clone, Copy, Debug)]
pub struct RecoveryConfig {
    /// 扫描未完成发布记录的间隔
    pub recover_interval: Duration,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            recover_interval: Duration::from_secs(60),
        }
    }
}

/// 恢复任务运行句柄：用于优雅关闭与等待任务结束
pub struct RecoveryHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl RecoveryHandle {
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub async fn join(mut self) {
        let tasks = std::mem::take(&mut self.tasks);

        for task in tasks {
            let _ = task.await;
        }
    }
}

impl Drop for RecoveryHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
