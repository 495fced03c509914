use serde::{Deserialize, Serialize};

use super::repo_types::User;

/// Public profile returned by `/api/profile/:username`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub display_name: String,
    pub bio: Option<String>,
    pub pfp_link: Option<String>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            display_name: user.display_name,
            bio: user.bio,
            pfp_link: user.pfp_link,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModifyProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

impl ModifyProfileRequest {
    /// Trimmed display name, or `None` if missing or blank.
    pub fn display_name(&self) -> Option<&str> {
        present(&self.display_name)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub password: Option<String>,
}

impl RegisterRequest {
    /// `(username, display_name, password)` when all three are present.
    pub fn fields(&self) -> Option<(&str, &str, &str)> {
        Some((
            present(&self.username)?,
            present(&self.display_name)?,
            self.password.as_deref().filter(|s| !s.is_empty())?,
        ))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub username: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_uses_camel_case_keys() {
        let response = ProfileResponse {
            display_name: "Data".into(),
            bio: None,
            pfp_link: Some("https://img.local/p.png".into()),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["displayName"], "Data");
        assert!(json["bio"].is_null());
        assert_eq!(json["pfpLink"], "https://img.local/p.png");
    }

    #[test]
    fn modify_request_treats_empty_display_name_as_missing() {
        let req: ModifyProfileRequest =
            serde_json::from_str(r#"{"displayName":"","bio":"hi"}"#).unwrap();
        assert_eq!(req.display_name(), None);
        assert_eq!(req.bio.as_deref(), Some("hi"));

        let blank: ModifyProfileRequest = serde_json::from_str(r#"{"displayName":"   "}"#).unwrap();
        assert_eq!(blank.display_name(), None);

        let padded: ModifyProfileRequest =
            serde_json::from_str(r#"{"displayName":"  Chef  "}"#).unwrap();
        assert_eq!(padded.display_name(), Some("Chef"));
    }
}
