use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Upload provenance. A closed enum: anything but these two tags is
/// rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PhotoSource {
    Capture,
    Import,
}

impl PhotoSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoSource::Capture => "capture",
            PhotoSource::Import => "import",
        }
    }
}

impl fmt::Display for PhotoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhotoSource {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "capture" => Ok(PhotoSource::Capture),
            "import" => Ok(PhotoSource::Import),
            _ => Err(()),
        }
    }
}

/// Request body for `POST /photos/upload`. `image` is base64, with or
/// without a `data:*;base64,` prefix.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub image: String,
    pub source: String,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

impl Pagination {
    pub fn clamped(&self, max: i64) -> (i64, i64) {
        (self.skip.max(0), self.limit.clamp(1, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_parses_only_the_two_known_tags() {
        assert_eq!("capture".parse::<PhotoSource>(), Ok(PhotoSource::Capture));
        assert_eq!("import".parse::<PhotoSource>(), Ok(PhotoSource::Import));
        assert!("video".parse::<PhotoSource>().is_err());
        assert!("Capture".parse::<PhotoSource>().is_err());
        assert!("".parse::<PhotoSource>().is_err());
    }

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PhotoSource::Capture).expect("serialize"),
            "\"capture\""
        );
        assert_eq!(PhotoSource::Import.to_string(), "import");
    }
}
