//! Session models.
//!
//! A session is an opaque, client-held marker of who is signed in. It is
//! never verified cryptographically and does not expire; it lives until
//! logout or until it is found unreadable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Which kind of user a page is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Agent,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Agent => "agent",
            Role::Customer => "customer",
        }
    }
}

/// A signed-in user.
///
/// # JSON Example
///
/// ```json
/// { "role": "agent", "userId": "u-17", "agentId": "AGT001" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Session {
    #[serde(rename_all = "camelCase")]
    Admin { user_id: String },

    #[serde(rename_all = "camelCase")]
    Agent {
        user_id: String,
        #[serde(default)]
        agent_id: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    Customer {
        customer_id: Option<String>,
        email: String,
        login_time: DateTime<Utc>,
    },
}

impl Session {
    pub fn role(&self) -> Role {
        match self {
            Session::Admin { .. } => Role::Admin,
            Session::Agent { .. } => Role::Agent,
            Session::Customer { .. } => Role::Customer,
        }
    }

    /// Agent id, when this is an agent session that has one.
    pub fn agent_id(&self) -> Option<&str> {
        match self {
            Session::Agent { agent_id, .. } => agent_id.as_deref(),
            _ => None,
        }
    }

    /// Customer email, when this is a customer session.
    pub fn customer_email(&self) -> Option<&str> {
        match self {
            Session::Customer { email, .. } => Some(email),
            _ => None,
        }
    }
}

/// Request body for `POST /Agentlogin`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentLoginRequest {
    pub email: String,
    pub password: String,
    pub user_type: Role,
}

/// Identifiers returned by a successful agent login.
///
/// Ids may arrive as strings or as numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentLoginResponse {
    #[serde(default, deserialize_with = "id_text")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "id_text")]
    pub agent_id: Option<String>,
}

fn id_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Id>::deserialize(deserializer)? {
        Some(Id::Text(id)) if !id.is_empty() => Some(id),
        Some(Id::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}

/// Stored credentials for a customer, as `GET /customer/credentials` returns them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCredentials {
    #[serde(default)]
    pub customer_id: Option<String>,
    pub password: String,
}
