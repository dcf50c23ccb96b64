use serde::{Deserialize, Serialize};

/// Body for `POST Auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    pub address: String,
}

impl RegisterRequest {
    /// Username, password and email must be filled in; phone and address may be blank.
    pub fn has_required_fields(&self) -> bool {
        !self.username.trim().is_empty()
            && !self.password.trim().is_empty()
            && !self.email.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RegisterResponse {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    #[serde(rename = "phoneNumber")]
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
}

/// Body for `POST Auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    pub fn has_required_fields(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LoginResponse {
    #[serde(default)]
    pub token: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Response from `GET User/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserResponse {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    #[serde(rename = "phoneNumber")]
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
}

impl UserResponse {
    pub fn display_role(&self) -> &str {
        match self.role.as_deref() {
            Some(role) if !role.is_empty() => role,
            _ => "Customer",
        }
    }
}
