//! Token payload and the request-scoped claim bag built from it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Claims as they appear in the access token payload.
///
/// Every field is optional on the wire; the gate tolerates partial claim sets.
/// A named claim of an unexpected JSON type is read leniently or dropped, it
/// never makes the whole token unreadable.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TokenClaims {
    #[serde(
        rename = "Id",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        rename = "UserName",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_name: Option<String>,
    #[serde(
        rename = "Email",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(
        rename = "AvatarUrl",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar_url: Option<String>,
    #[serde(
        rename = "Role",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
    /// Expiry (seconds since epoch)
    #[serde(
        default,
        deserialize_with = "lenient_numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub exp: Option<i64>,
    /// Issued-at (seconds since epoch)
    #[serde(
        default,
        deserialize_with = "lenient_numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub iat: Option<i64>,
}

impl TokenClaims {
    /// A token without an expiry never counts as valid.
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        match self.exp {
            Some(exp) => exp < now_secs,
            None => true,
        }
    }
}

/// Identity claims attached to a request by the authentication gate.
///
/// Stored in request extensions for every forwarded request. An empty bag
/// means the caller is anonymous.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestClaims {
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
}

impl RequestClaims {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// A caller counts as authenticated once a subject id is known.
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Exact, case-sensitive role comparison.
    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }

    /// Rebuild the wire form for re-minting. Expiry fields are left unset.
    pub fn to_token_claims(&self) -> TokenClaims {
        TokenClaims {
            id: self.user_id.map(|id| id.to_string()),
            user_name: self.user_name.clone(),
            email: self.email.clone(),
            avatar_url: self.avatar_url.clone(),
            role: self.role.clone(),
            exp: None,
            iat: None,
        }
    }
}

impl From<TokenClaims> for RequestClaims {
    fn from(claims: TokenClaims) -> Self {
        // A subject id that is not a UUID is dropped, not rejected.
        let user_id = non_empty(claims.id).and_then(|id| Uuid::parse_str(&id).ok());

        Self {
            user_id,
            user_name: non_empty(claims.user_name),
            email: non_empty(claims.email),
            avatar_url: non_empty(claims.avatar_url),
            role: non_empty(claims.role),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Strings pass through, scalars are stringified, and arrays yield their first
/// string element (multi-valued `Role`). Objects and `null` are dropped.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(Value::Array(items)) => items.into_iter().find_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        }),
        Some(Value::Object(_)) | Some(Value::Null) | None => None,
    })
}

/// RFC 7519 NumericDate: any JSON number, fractions truncated toward zero.
/// Anything else reads as absent.
fn lenient_numeric_date<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        _ => None,
    })
}
