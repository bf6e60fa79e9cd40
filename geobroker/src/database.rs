use sqlx::sqlite::SqlitePool;
use tracing::info;

use crate::models::Message;

/// Write-through relational store backing the broker. Built on the same
/// PRAGMA tuning and versioned-migration runner as the reference
/// `init_database`, generalized from a chat schema to messages/subscriptions/
/// topics tables.
///
/// Writes here are issued directly on the pool and awaited in place rather
/// than batched through a channel: `publish`
/// needs the inserted row id back synchronously, and a failed write must roll
/// back the just-appended in-memory entry immediately — both are awkward
/// with fire-and-forget batching.
pub struct DurableMirror {
    pool: SqlitePool,
}

impl DurableMirror {
    pub async fn connect(db_file: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_file)).await?;

        sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous = NORMAL").execute(&pool).await?;
        sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
        sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

        sqlx::raw_sql(include_str!("../migrations/001_init.sql"))
            .execute(&pool)
            .await?;

        info!("durable mirror ready at {}", db_file);
        Ok(Self { pool })
    }

    /// `INSERT messages RETURNING id`.
    pub async fn insert_message(&self, message: &Message) -> Result<i64, sqlx::Error> {
        sqlx::query("INSERT INTO topics (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
            .bind(&message.topic)
            .execute(&self.pool)
            .await?;

        let row: (i64,) = sqlx::query_as(
            "INSERT INTO messages (topic, title, payload, radius, latitude, longitude, lifetime, request_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&message.topic)
        .bind(&message.title)
        .bind(&message.body)
        .bind(message.radius)
        .bind(message.latitude)
        .bind(message.longitude)
        .bind(message.expiration_time)
        .bind(&message.request_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Deletes rows for `topic` whose `lifetime <= now`.
    pub async fn delete_expired(&self, topic: &str, now: f64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM messages WHERE topic = ? AND lifetime <= ?")
            .bind(topic)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_subscription(&self, user: &str, topic: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT OR IGNORE INTO subscriptions (subscriber, topic) VALUES (?, ?)")
            .bind(user)
            .bind(topic)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_subscription(&self, user: &str, topic: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM subscriptions WHERE subscriber = ? AND topic = ?")
            .bind(user)
            .bind(topic)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Replays persisted messages and subscriptions into the in-memory
    /// indexes at startup.
    pub async fn hydrate(&self) -> Result<(Vec<Message>, Vec<(String, String)>), sqlx::Error> {
        let messages: Vec<(i64, String, String, String, i64, f64, f64, f64, String)> =
            sqlx::query_as(
                "SELECT id, topic, title, payload, radius, latitude, longitude, lifetime, request_id FROM messages",
            )
            .fetch_all(&self.pool)
            .await?;

        let messages = messages
            .into_iter()
            .map(
                |(id, topic, title, body, radius, latitude, longitude, expiration_time, request_id)| Message {
                    id: Some(id),
                    topic,
                    title,
                    body,
                    radius,
                    latitude,
                    longitude,
                    expiration_time,
                    request_id,
                },
            )
            .collect();

        let subscriptions: Vec<(String, String)> =
            sqlx::query_as("SELECT subscriber, topic FROM subscriptions")
                .fetch_all(&self.pool)
                .await?;

        Ok((messages, subscriptions))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
