use anyhow::Context;
use axum::async_trait;
use komento_api::{Comment, CommentId, NewComment, SortOrder, Store, Uuid};
use sqlx::Row;

pub struct PgStore {
    pool: sqlx::PgPool,
}

impl PgStore {
    pub fn new(pool: sqlx::PgPool) -> PgStore {
        PgStore { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn fetch_comments(&self, order: SortOrder) -> anyhow::Result<Vec<Comment>> {
        // the whole board is fetched so every thread stays complete
        // TODO: switch to a recursive CTE if boards ever outgrow one fetch
        let query = match order {
            SortOrder::NewestFirst => {
                "SELECT id, parent_id, name, email, content, created_at, ip
                    FROM comments
                    ORDER BY created_at DESC"
            }
            SortOrder::OldestFirst => {
                "SELECT id, parent_id, name, email, content, created_at, ip
                    FROM comments
                    ORDER BY created_at ASC"
            }
        };
        sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .context("querying comments table")?
            .iter()
            .map(comment_from_row)
            .collect()
    }

    async fn insert_comment(&self, comment: NewComment) -> anyhow::Result<CommentId> {
        let id = CommentId(Uuid::new_v4());
        sqlx::query(
            "INSERT INTO comments (id, parent_id, name, email, content, created_at, ip)
                VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id.0)
        .bind(comment.parent_id.map(|p| p.0))
        .bind(&comment.name)
        .bind(&comment.email)
        .bind(&comment.content)
        .bind(comment.created_at)
        .bind(comment.ip.to_string())
        .execute(&self.pool)
        .await
        .context("inserting into comments table")?;
        Ok(id)
    }

    async fn increment_counter(&self, name: &str) -> anyhow::Result<i64> {
        sqlx::query(
            "INSERT INTO counters (name, value) VALUES ($1, 1)
                ON CONFLICT (name) DO UPDATE SET value = counters.value + 1
                RETURNING value",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("bumping counter {name:?}"))?
        .try_get("value")
        .context("reading counter value")
    }
}

fn comment_from_row(row: &sqlx::postgres::PgRow) -> anyhow::Result<Comment> {
    let ip: String = row.try_get("ip").context("reading ip column")?;
    Ok(Comment {
        id: CommentId(row.try_get("id").context("reading id column")?),
        parent_id: row
            .try_get::<Option<Uuid>, _>("parent_id")
            .context("reading parent_id column")?
            .map(CommentId),
        name: row.try_get("name").context("reading name column")?,
        email: row.try_get("email").context("reading email column")?,
        content: row.try_get("content").context("reading content column")?,
        created_at: row
            .try_get("created_at")
            .context("reading created_at column")?,
        ip: Some(
            ip.parse()
                .with_context(|| format!("parsing stored ip {ip:?}"))?,
        ),
    })
}
