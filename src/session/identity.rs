use serde::{Deserialize, Serialize};

/// Closed role set. Routing guards match on this exhaustively, so adding a
/// role is a compile-checked change everywhere it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Professional,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Professional => "professional",
            Role::Client => "client",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles creatable through self-registration. Professionals are provisioned
/// by workspace owners, never self-registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterRole {
    Owner,
    Client,
}

impl From<RegisterRole> for Role {
    fn from(r: RegisterRole) -> Self {
        match r {
            RegisterRole::Owner => Role::Owner,
            RegisterRole::Client => Role::Client,
        }
    }
}

/// The authenticated user record. Created on successful authentication and
/// held by the session store until logout or credential-resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}
