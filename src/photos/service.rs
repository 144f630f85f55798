use anyhow::Context;
use base64ct::{Base64, Encoding};
use bytes::Bytes;
use time::{macros::format_description, OffsetDateTime};
use tracing::{info, warn};

use crate::{
    error::{ApiError, Result},
    photos::{dto::PhotoSource, repo, repo::Photo},
    state::AppState,
};

const CONTENT_TYPE_JPEG: &str = "image/jpeg";

/// Decode the inbound base64 payload, stripping a `data:*;base64,` header
/// when one is present.
pub(crate) fn decode_image_payload(payload: &str) -> Result<Vec<u8>> {
    if payload.trim().is_empty() {
        return Err(ApiError::Validation("Image payload is empty".into()));
    }
    let b64 = match payload.split_once(',') {
        Some((_, rest)) => rest,
        None => payload,
    };
    Base64::decode_vec(b64).map_err(|_| ApiError::Validation("Invalid base64 image".into()))
}

/// Bucket key for a new upload. Microsecond precision keeps concurrent
/// uploads from one user from colliding.
pub(crate) fn storage_key(
    user_id: i64,
    source: PhotoSource,
    now: OffsetDateTime,
) -> anyhow::Result<String> {
    let ts = now
        .format(format_description!(
            "[year][month][day]_[hour][minute][second][subsecond digits:6]"
        ))
        .context("format storage key timestamp")?;
    Ok(format!("photos/{}/{}_{}.jpg", user_id, source, ts))
}

/// Store the decoded image in the bucket, then persist the metadata row.
///
/// The object is written first. If the metadata insert then fails, the
/// transaction rolls back and the stored object stays behind as an orphan;
/// there is no compensating delete on this path, only the log line below.
pub async fn upload_photo(
    st: &AppState,
    user_id: i64,
    source: PhotoSource,
    image_b64: &str,
) -> Result<Photo> {
    let bytes = decode_image_payload(image_b64)?;
    let key = storage_key(user_id, source, OffsetDateTime::now_utc())?;
    let url = st.config.s3.object_url(&key);

    st.storage
        .put_object(&key, Bytes::from(bytes), CONTENT_TYPE_JPEG)
        .await
        .context("store photo object")?;

    let mut tx = st.db.begin().await?;
    let photo = match repo::insert_photo_tx(&mut tx, user_id, &key, &url, source).await {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, %key, "metadata insert failed after object store write; object orphaned");
            return Err(e.into());
        }
    };
    tx.commit().await?;

    info!(user_id, photo_id = photo.id, %key, "photo uploaded");
    Ok(photo)
}

/// Delete an owned photo. The object delete is best-effort: a bucket
/// failure is logged and swallowed so the metadata row never outlives the
/// user's view of the deletion.
pub async fn delete_photo(st: &AppState, user_id: i64, photo_id: i64) -> Result<()> {
    let photo = repo::find_owned(&st.db, photo_id, user_id)
        .await?
        .ok_or(ApiError::NotFound("Photo"))?;

    if let Err(e) = st.storage.delete_object(&photo.s3_key).await {
        warn!(error = %e, key = %photo.s3_key, "object delete failed; removing metadata anyway");
    }

    if repo::delete_owned(&st.db, photo_id, user_id).await? == 0 {
        return Err(ApiError::NotFound("Photo"));
    }

    info!(user_id, photo_id, "photo deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn decode_accepts_plain_base64() {
        let encoded = Base64::encode_string(b"jpeg bytes");
        assert_eq!(decode_image_payload(&encoded).expect("decode"), b"jpeg bytes");
    }

    #[test]
    fn decode_strips_data_uri_prefix() {
        let encoded = format!("data:image/jpeg;base64,{}", Base64::encode_string(b"raw"));
        assert_eq!(decode_image_payload(&encoded).expect("decode"), b"raw");
    }

    #[test]
    fn decode_rejects_empty_payload() {
        assert!(matches!(
            decode_image_payload(""),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            decode_image_payload("   "),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        assert!(matches!(
            decode_image_payload("!!not base64!!"),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn storage_key_embeds_owner_source_and_timestamp() {
        let now = datetime!(2026-03-01 12:34:56.789012 UTC);
        let key = storage_key(42, PhotoSource::Capture, now).expect("key");
        assert_eq!(key, "photos/42/capture_20260301_123456789012.jpg");
    }

    #[test]
    fn storage_keys_differ_at_microsecond_granularity() {
        let a = storage_key(
            1,
            PhotoSource::Import,
            datetime!(2026-03-01 12:00:00.000001 UTC),
        )
        .expect("key a");
        let b = storage_key(
            1,
            PhotoSource::Import,
            datetime!(2026-03-01 12:00:00.000002 UTC),
        )
        .expect("key b");
        assert_ne!(a, b);
    }
}
