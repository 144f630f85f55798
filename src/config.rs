use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO); path-style addressing.
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl S3Config {
    /// Public URL of the object stored under `key`.
    pub fn object_url(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub s3: S3Config,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".into()),
            ttl_minutes: parse_ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok())?,
        };
        let s3 = S3Config {
            bucket: std::env::var("AWS_S3_BUCKET")?,
            region: std::env::var("AWS_S3_REGION")?,
            endpoint: std::env::var("AWS_S3_ENDPOINT").ok(),
            access_key: std::env::var("AWS_S3_ACCESS_KEY").ok(),
            secret_key: std::env::var("AWS_S3_SECRET_KEY").ok(),
        };
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(Self {
            database_url,
            jwt,
            s3,
            allowed_origins,
        })
    }
}

/// Token lifetime in minutes. A malformed or non-positive value aborts
/// startup rather than silently falling back; only an absent variable takes
/// the default.
fn parse_ttl_minutes(raw: Option<String>) -> anyhow::Result<i64> {
    let ttl = match raw {
        Some(v) => v
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("invalid JWT_TTL_MINUTES '{}': {}", v, e))?,
        None => 30,
    };
    anyhow::ensure!(ttl > 0, "JWT_TTL_MINUTES must be positive, got {}", ttl);
    Ok(ttl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_defaults_when_unset() {
        assert_eq!(parse_ttl_minutes(None).expect("default"), 30);
    }

    #[test]
    fn ttl_accepts_a_positive_value() {
        assert_eq!(parse_ttl_minutes(Some("45".into())).expect("parse"), 45);
    }

    #[test]
    fn ttl_rejects_zero_negative_and_garbage() {
        assert!(parse_ttl_minutes(Some("0".into())).is_err());
        assert!(parse_ttl_minutes(Some("-5".into())).is_err());
        assert!(parse_ttl_minutes(Some("soon".into())).is_err());
    }

    #[test]
    fn object_url_uses_virtual_hosted_style_by_default() {
        let s3 = S3Config {
            bucket: "photos-bucket".into(),
            region: "eu-west-3".into(),
            endpoint: None,
            access_key: None,
            secret_key: None,
        };
        assert_eq!(
            s3.object_url("photos/1/capture_x.jpg"),
            "https://photos-bucket.s3.eu-west-3.amazonaws.com/photos/1/capture_x.jpg"
        );
    }

    #[test]
    fn object_url_uses_path_style_with_custom_endpoint() {
        let s3 = S3Config {
            bucket: "media".into(),
            region: "us-east-1".into(),
            endpoint: Some("http://localhost:9000/".into()),
            access_key: None,
            secret_key: None,
        };
        assert_eq!(
            s3.object_url("photos/1/import_x.jpg"),
            "http://localhost:9000/media/photos/1/import_x.jpg"
        );
    }
}
