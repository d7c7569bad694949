use serde::{Deserialize, Serialize};

use super::repo_types::User;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub handle: String,
    pub description: Option<String>,
    /// Either an already-serialized list or a JSON array.
    pub links: Option<serde_json::Value>,
}

impl UpdateProfileRequest {
    pub fn links_text(&self) -> Option<String> {
        self.links.as_ref().map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchHandleRequest {
    #[serde(default)]
    pub handle: String,
}

/// What anyone may see of a user. Fields are listed explicitly so that new
/// columns stay private until added here.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub links: String,
    pub qr_code: String,
    pub visits: i64,
}

impl From<User> for PublicProfile {
    fn from(u: User) -> Self {
        Self {
            handle: u.handle,
            name: u.name,
            description: u.description,
            image: u.image,
            links: u.links,
            qr_code: u.qr_code,
            visits: u.visits,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub image: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrResponse {
    pub qr_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn links_accepts_string_or_array() {
        let req: UpdateProfileRequest =
            serde_json::from_value(json!({ "handle": "a", "links": "[{\"url\":\"x\"}]" })).unwrap();
        assert_eq!(req.links_text().as_deref(), Some("[{\"url\":\"x\"}]"));

        let req: UpdateProfileRequest =
            serde_json::from_value(json!({ "handle": "a", "links": [{ "url": "x" }] })).unwrap();
        assert_eq!(req.links_text().as_deref(), Some("[{\"url\":\"x\"}]"));

        let req: UpdateProfileRequest = serde_json::from_value(json!({ "handle": "a" })).unwrap();
        assert!(req.links_text().is_none());
    }
}
