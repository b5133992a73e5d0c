//! Refresh token store.
//!
//! Writes go through `INSERT .. ON CONFLICT (user_id) DO UPDATE`, so
//! concurrent logins for one user never produce two rows; the last
//! writer's token wins. Refresh goes through `rotate`, a compare-and-set
//! on the stored token, so one token can be redeemed at most once.

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use super::entities::refresh_token::{self, ActiveModel, Entity as RefreshTokenEntity};
use crate::domain::RefreshTokenRecord;
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Refresh-token store collaborator.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Insert or replace the token stored for `user_id`
    async fn upsert_by_user_id(&self, user_id: Uuid, token: &str) -> AppResult<()>;

    /// Stored record for `user_id`, only if it holds exactly `token`
    async fn find_by_user_id_and_token(
        &self,
        user_id: Uuid,
        token: &str,
    ) -> AppResult<Option<RefreshTokenRecord>>;

    /// Replace `current` with `replacement` only if `current` is still the
    /// stored token of `user_id`; returns whether the swap happened
    async fn rotate(&self, user_id: Uuid, current: &str, replacement: &str) -> AppResult<bool>;

    /// Delete whichever record holds `token`; returns rows removed
    async fn delete_by_token(&self, token: &str) -> AppResult<u64>;
}

/// SeaORM-backed refresh token store
pub struct RefreshTokenStore {
    db: DatabaseConnection,
}

impl RefreshTokenStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) async fn upsert_token<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    token: &str,
) -> AppResult<()> {
    let record = ActiveModel {
        user_id: Set(user_id),
        token: Set(token.to_owned()),
        created_at: Set(chrono::Utc::now()),
    };

    RefreshTokenEntity::insert(record)
        .on_conflict(
            OnConflict::column(refresh_token::Column::UserId)
                .update_columns([
                    refresh_token::Column::Token,
                    refresh_token::Column::CreatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(())
}

#[async_trait]
impl RefreshTokenRepository for RefreshTokenStore {
    async fn upsert_by_user_id(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        upsert_token(&self.db, user_id, token).await
    }

    async fn find_by_user_id_and_token(
        &self,
        user_id: Uuid,
        token: &str,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        let result = RefreshTokenEntity::find_by_id(user_id)
            .filter(refresh_token::Column::Token.eq(token))
            .one(&self.db)
            .await?;

        Ok(result.map(RefreshTokenRecord::from))
    }

    async fn rotate(&self, user_id: Uuid, current: &str, replacement: &str) -> AppResult<bool> {
        let result = RefreshTokenEntity::update_many()
            .col_expr(
                refresh_token::Column::Token,
                Expr::value(replacement.to_owned()),
            )
            .col_expr(
                refresh_token::Column::CreatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::Token.eq(current))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn delete_by_token(&self, token: &str) -> AppResult<u64> {
        let result = RefreshTokenEntity::delete_many()
            .filter(refresh_token::Column::Token.eq(token))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
