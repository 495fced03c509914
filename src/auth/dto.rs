use serde::{Deserialize, Serialize};

/// Request body for login. Fields are optional so a missing field is a 400,
/// not a body rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Both credentials, or `None` if either is missing or empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|s| !s.is_empty())?;
        let password = self.password.as_deref().filter(|s| !s.is_empty())?;
        Some((username, password))
    }
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_fields_non_empty() {
        let full: LoginRequest =
            serde_json::from_str(r#"{"username":"data","password":"data"}"#).unwrap();
        assert_eq!(full.credentials(), Some(("data", "data")));

        let missing: LoginRequest = serde_json::from_str(r#"{"username":"data"}"#).unwrap();
        assert_eq!(missing.credentials(), None);

        let empty: LoginRequest =
            serde_json::from_str(r#"{"username":"","password":"data"}"#).unwrap();
        assert_eq!(empty.credentials(), None);
    }
}
