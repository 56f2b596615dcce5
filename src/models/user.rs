use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Roles accepted by the company-scoped creation routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
            Role::Staff => "staff",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    /// Exact, case-sensitive match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "client" => Ok(Role::Client),
            "staff" => Ok(Role::Staff),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when a stored role names the admin role, ignoring case
pub fn is_admin_role(role: &Value) -> bool {
    role.as_str().map_or(false, |r| r.eq_ignore_ascii_case(Role::Admin.as_str()))
}

/// Row inserted into `users`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub role: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

/// Full overwrite of the editable profile columns; absent fields become null
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
}
