//! Postgres 版发布日志（revent-postgres）
//!
//! 以单张 `event_publication` 表实现 `PublicationLog` 协议：
//! - `store`：每个目标一行，默认在自有短事务内写入；
//!   需要与业务写入同事务时使用 `store_with` 传入调用方连接；
//! - `mark_completed`：`completed_at IS NULL` 条件更新，天然幂等且单向；
//! - `find_incomplete_publications`：按 `publication_time` 排序返回未完成记录。
//!
//! 已完成的记录保留在表中供审计查看，是否归档清理由运维策略决定。
//!
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use revent_core::domain_event::EventEnvelope;
use revent_core::error::EventResult;
use revent_core::eventing::TargetIdentifier;
use revent_core::persist::{EventPublication, PublicationLog};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{PgConnection, Row};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS event_publication (
    publication_id    TEXT PRIMARY KEY,
    event_id          TEXT        NOT NULL,
    event_type        TEXT        NOT NULL,
    payload           JSONB       NOT NULL,
    target_identifier TEXT        NOT NULL,
    publication_time  TIMESTAMPTZ NOT NULL,
    completed_at      TIMESTAMPTZ
);
CREATE INDEX IF NOT EXISTS idx_event_publication_incomplete
    ON event_publication (publication_time)
    WHERE completed_at IS NULL;
";

const INSERT_SQL: &str = "
INSERT INTO event_publication
    (publication_id, event_id, event_type, payload, target_identifier, publication_time, completed_at)
VALUES ($1, $2, $3, $4, $5, $6, $7)
";

const COMPLETE_SQL: &str = "
UPDATE event_publication
SET completed_at = $2
WHERE publication_id = $1 AND completed_at IS NULL
";

const FIND_INCOMPLETE_SQL: &str = "
SELECT publication_id, event_id, event_type, payload, target_identifier, publication_time, completed_at
FROM event_publication
WHERE completed_at IS NULL
ORDER BY publication_time
";

/// 基于 Postgres 的发布日志实现
pub struct PostgresPublicationLog {
    pool: PgPool,
}

impl PostgresPublicationLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 建表与索引（幂等），供未接入迁移工具的进程在启动时调用
    pub async fn ensure_schema(&self) -> EventResult<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// 在调用方提供的连接（通常是进行中的事务）内写入发布记录，
    /// 使记录与触发事件的业务写入同生共死
    pub async fn store_with(
        &self,
        conn: &mut PgConnection,
        event: &EventEnvelope,
        targets: &[TargetIdentifier],
    ) -> EventResult<Vec<EventPublication>> {
        let mut created = Vec::with_capacity(targets.len());

        for target in targets {
            let publication = EventPublication::new(event, target.clone());
            sqlx::query(INSERT_SQL)
                .bind(publication.publication_id())
                .bind(publication.event_id())
                .bind(publication.event_type())
                .bind(publication.payload().clone())
                .bind(publication.target_identifier().as_str())
                .bind(publication.publication_time())
                .bind(publication.completed_at())
                .execute(&mut *conn)
                .await?;
            created.push(publication);
        }

        Ok(created)
    }
}

#[async_trait]
impl PublicationLog for PostgresPublicationLog {
    async fn store(
        &self,
        event: &EventEnvelope,
        targets: &[TargetIdentifier],
    ) -> EventResult<Vec<EventPublication>> {
        let mut tx = self.pool.begin().await?;
        let created = self.store_with(&mut tx, event, targets).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn mark_completed(&self, publication: &EventPublication) -> EventResult<()> {
        // 已完成（或不存在）的记录更新为零行，视为无操作
        let result = sqlx::query(COMPLETE_SQL)
            .bind(publication.publication_id())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(
                publication_id = %publication.publication_id(),
                "mark_completed affected no rows"
            );
        }
        Ok(())
    }

    async fn find_incomplete_publications(&self) -> EventResult<Vec<EventPublication>> {
        let rows = sqlx::query(FIND_INCOMPLETE_SQL)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(publication_from_row).collect()
    }
}

fn publication_from_row(row: &PgRow) -> EventResult<EventPublication> {
    Ok(EventPublication::builder()
        .publication_id(row.try_get::<String, _>("publication_id")?)
        .event_id(row.try_get::<String, _>("event_id")?)
        .event_type(row.try_get::<String, _>("event_type")?)
        .payload(row.try_get::<serde_json::Value, _>("payload")?)
        .target_identifier(TargetIdentifier::from(
            row.try_get::<String, _>("target_identifier")?,
        ))
        .publication_time(row.try_get::<DateTime<Utc>, _>("publication_time")?)
        .maybe_completed_at(row.try_get::<Option<DateTime<Utc>>, _>("completed_at")?)
        .build())
}
