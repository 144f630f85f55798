use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::users::repo::User;

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub username: Option<String>,
    pub language: Option<String>,
}

/// Request body for a partial update; omitted fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub username: Option<String>,
    pub language: Option<String>,
    pub password: Option<String>,
}

/// Outward view of a user; never carries the password hash.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    pub language: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            language: u.language,
            created_at: u.created_at,
        }
    }
}

/// Current identity as reported by `GET /users/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
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
    fn pagination_clamps_out_of_range_values() {
        let p = Pagination {
            skip: -5,
            limit: 100_000,
        };
        assert_eq!(p.clamped(100), (0, 100));

        let p = Pagination { skip: 10, limit: 0 };
        assert_eq!(p.clamped(100), (10, 1));
    }

    #[test]
    fn pagination_defaults_from_empty_query() {
        let p: Pagination = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(p.skip, 0);
        assert_eq!(p.limit, 100);
    }
}
