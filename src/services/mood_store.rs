use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::Mood;

/// Row shape before the genre JSON column is decoded
#[derive(sqlx::FromRow)]
struct MoodRow {
    id: i64,
    name: String,
    genre_ids: String,
    description: Option<String>,
}

impl MoodRow {
    fn into_mood(self) -> AppResult<Mood> {
        let genre_ids = serde_json::from_str(&self.genre_ids).map_err(|e| {
            AppError::Internal(format!("corrupt genre_ids for mood {}: {}", self.id, e))
        })?;

        Ok(Mood {
            id: self.id,
            name: self.name,
            genre_ids,
            description: self.description,
        })
    }
}

/// Durable store for moods
///
/// Genre-set validation is deliberately not enforced here: a zero-genre
/// mood is a configuration error that the resolver surfaces distinctly at
/// recommend time.
#[derive(Clone)]
pub struct MoodStore {
    pool: SqlitePool,
}

impl MoodStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> AppResult<Option<Mood>> {
        let row: Option<MoodRow> =
            sqlx::query_as("SELECT id, name, genre_ids, description FROM moods WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(MoodRow::into_mood).transpose()
    }

    pub async fn list(&self) -> AppResult<Vec<Mood>> {
        let rows: Vec<MoodRow> =
            sqlx::query_as("SELECT id, name, genre_ids, description FROM moods ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(MoodRow::into_mood).collect()
    }

    pub async fn create(
        &self,
        name: &str,
        genre_ids: &[i64],
        description: Option<&str>,
    ) -> AppResult<Mood> {
        let genre_json = serde_json::to_string(genre_ids)
            .map_err(|e| AppError::Internal(format!("genre_ids serialization error: {}", e)))?;

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO moods (name, genre_ids, description) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(&genre_json)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db)
                if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                AppError::InvalidInput(format!("mood '{}' already exists", name))
            }
            other => AppError::Database(other),
        })?;

        Ok(Mood {
            id,
            name: name.to_string(),
            genre_ids: genre_ids.to_vec(),
            description: description.map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_create_and_get_roundtrip() {
        let pool = test_pool().await;
        let store = MoodStore::new(pool);

        let created = store
            .create("Happy", &[35, 10751], Some("Light and warm"))
            .await
            .unwrap();

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.genre_ids, vec![35, 10751]);
    }

    #[tokio::test]
    async fn test_get_unknown_mood_is_none() {
        let pool = test_pool().await;
        let store = MoodStore::new(pool);

        assert_eq!(store.get(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_invalid_input() {
        let pool = test_pool().await;
        let store = MoodStore::new(pool);

        store.create("Happy", &[35], None).await.unwrap();
        let result = store.create("Happy", &[18], None).await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_list_returns_all_moods() {
        let pool = test_pool().await;
        let store = MoodStore::new(pool);

        store.create("Happy", &[35], None).await.unwrap();
        store.create("Tense", &[53, 9648], None).await.unwrap();

        let moods = store.list().await.unwrap();
        assert_eq!(moods.len(), 2);
        assert_eq!(moods[0].name, "Happy");
        assert_eq!(moods[1].name, "Tense");
    }
}
