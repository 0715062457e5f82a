// src/models/user.rs

use serde::{Deserialize, Serialize};

/// Dashboard designation attached to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Mentor,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Mentor => "mentor",
            Role::Superadmin => "superadmin",
        }
    }

    /// Parses a persisted designation string. Unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "mentor" => Some(Role::Mentor),
            "superadmin" => Some(Role::Superadmin),
            _ => None,
        }
    }
}

/// Remote user record as returned by `GET user/{id}`.
/// Only the fields this layer reads are modeled; extra fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub id: Option<String>,

    /// Stored point balance. Deserialized leniently: a missing or
    /// non-numeric value reads as absent rather than failing the fetch.
    #[serde(default, deserialize_with = "lenient_points")]
    pub xps: Option<i64>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub designation: Option<String>,
}

impl UserRecord {
    /// The point balance, 0 when the remote field is absent or malformed.
    pub fn points(&self) -> i64 {
        self.xps.unwrap_or(0)
    }
}

fn lenient_points<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64)))
}
