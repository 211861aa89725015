use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::middleware::SessionId;
use crate::models::FeedbackLabel;

/// Durable store for per-session sentiment labels
///
/// At most one row per (movie, session) pair, enforced by a unique index;
/// a new vote overwrites the label instead of creating a second row.
#[derive(Clone)]
pub struct FeedbackStore {
    pool: SqlitePool,
}

impl FeedbackStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All movie ids for which the session has recorded the given label
    pub async fn exclusions_for(
        &self,
        session: &SessionId,
        label: FeedbackLabel,
    ) -> AppResult<HashSet<i64>> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT movie_id FROM feedback WHERE session_id = ? AND label = ?")
                .bind(session.as_str())
                .bind(label.as_str())
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Upserts the (movie, session) row, overwriting any prior label
    pub async fn record(
        &self,
        movie_id: i64,
        session: &SessionId,
        label: FeedbackLabel,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO feedback (movie_id, session_id, label) VALUES (?, ?, ?)
             ON CONFLICT (movie_id, session_id) DO UPDATE SET label = excluded.label",
        )
        .bind(movie_id)
        .bind(session.as_str())
        .bind(label.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            // Voting on a movie the catalog never surfaced is caller error,
            // not a server fault.
            sqlx::Error::Database(ref db)
                if matches!(db.kind(), sqlx::error::ErrorKind::ForeignKeyViolation) =>
            {
                AppError::InvalidInput(format!("unknown movie_id {}", movie_id))
            }
            other => AppError::Database(other),
        })?;

        tracing::debug!(movie_id, session = %session, label = %label, "Feedback recorded");

        Ok(())
    }
}
