use serde::Deserialize;

use super::validation::{is_valid_email, Validator};
use crate::error::AppError;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub description: String,
}

impl RegisterRequest {
    /// Trims and lowercases in place, then checks field presence and format.
    pub fn normalize_and_validate(&mut self) -> Result<(), AppError> {
        self.handle = self.handle.trim().to_string();
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();

        let mut v = Validator::default();
        v.require("handle", &self.handle);
        v.require("name", &self.name);
        v.check("email", is_valid_email(&self.email), "must be a valid email");
        v.require("password", &self.password);
        v.finish()
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn normalize_and_validate(&mut self) -> Result<(), AppError> {
        self.email = self.email.trim().to_lowercase();

        let mut v = Validator::default();
        v.check("email", is_valid_email(&self.email), "must be a valid email");
        v.require("password", &self.password);
        v.finish()
    }
}
