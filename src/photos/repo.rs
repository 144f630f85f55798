use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;

use crate::photos::dto::PhotoSource;

/// Metadata row for one stored object.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Photo {
    pub id: i64,
    pub user_id: i64,
    pub s3_key: String,
    pub s3_url: String,
    pub source: PhotoSource,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
}

/// Insert the metadata row for an already-stored object.
pub async fn insert_photo_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    s3_key: &str,
    s3_url: &str,
    source: PhotoSource,
) -> sqlx::Result<Photo> {
    sqlx::query_as::<_, Photo>(
        r#"
        INSERT INTO photos (user_id, s3_key, s3_url, source)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, s3_key, s3_url, source, uploaded_at
        "#,
    )
    .bind(user_id)
    .bind(s3_key)
    .bind(s3_url)
    .bind(source)
    .fetch_one(&mut **tx)
    .await
}

/// The owner's photos, newest first.
pub async fn list_by_user(
    db: &PgPool,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Photo>> {
    sqlx::query_as::<_, Photo>(
        r#"
        SELECT id, user_id, s3_key, s3_url, source, uploaded_at
        FROM photos
        WHERE user_id = $1
        ORDER BY uploaded_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

/// Joint filter on photo id and owner: a photo someone else owns looks the
/// same as one that does not exist.
pub async fn find_owned(db: &PgPool, photo_id: i64, user_id: i64) -> sqlx::Result<Option<Photo>> {
    sqlx::query_as::<_, Photo>(
        r#"
        SELECT id, user_id, s3_key, s3_url, source, uploaded_at
        FROM photos
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(photo_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn delete_owned(db: &PgPool, photo_id: i64, user_id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM photos WHERE id = $1 AND user_id = $2")
        .bind(photo_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
