//! Account connection store: one row per Discord user, last write wins.

use async_trait::async_trait;
use serenity::model::id::UserId;
use sqlx::{PgPool, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountConnection {
    pub discord_id: u64,
    pub anilist_id: i64,
    pub token: String,
}

#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn upsert(&self, discord_id: UserId, anilist_id: i64, token: &str)
        -> anyhow::Result<()>;
    async fn get(&self, discord_id: UserId) -> anyhow::Result<Option<AccountConnection>>;
}

pub struct PgConnectionStore {
    pool: PgPool,
}

impl PgConnectionStore {
    pub fn new(pool: PgPool) -> Self {
        PgConnectionStore { pool }
    }
}

#[async_trait]
impl ConnectionStore for PgConnectionStore {
    async fn upsert(
        &self,
        discord_id: UserId,
        anilist_id: i64,
        token: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO account_connections (discord_id, anilist_id, token) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (discord_id) \
             DO UPDATE SET anilist_id = EXCLUDED.anilist_id, token = EXCLUDED.token",
        )
        .bind(discord_id.get() as i64)
        .bind(anilist_id)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, discord_id: UserId) -> anyhow::Result<Option<AccountConnection>> {
        let row = sqlx::query(
            "SELECT anilist_id, token FROM account_connections WHERE discord_id = $1",
        )
        .bind(discord_id.get() as i64)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|row| AccountConnection {
            discord_id: discord_id.get(),
            anilist_id: row.get("anilist_id"),
            token: row.get("token"),
        }))
    }
}
