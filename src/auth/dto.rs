use serde::{Deserialize, Serialize};

use crate::auth::{password::MAX_PASSWORD_BYTES, repo_types::User, services::is_valid_email};
use crate::error::ValidationError;

const MAX_USERNAME_LEN: usize = 50;
const MAX_EMAIL_LEN: usize = 255;
const MIN_PASSWORD_LEN: usize = 8;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: String,
}

/// Request body for a profile change; absent fields stay as they are.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct CreateTokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: User,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::new("username is required"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ValidationError::new("username must not exceed 50 characters"));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(ValidationError::new("email must not exceed 255 characters"));
    }
    if !is_valid_email(email) {
        return Err(ValidationError::new("invalid email"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new("password too short"));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("password must not exceed 72 bytes"));
    }
    Ok(())
}

impl RegisterRequest {
    /// Trims and lowercases the email, then validates every field.
    pub fn normalize(&mut self) -> Result<(), ValidationError> {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_lowercase();

        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

impl UpdateUserRequest {
    pub fn normalize(&mut self) -> Result<(), ValidationError> {
        if let Some(username) = self.username.as_mut() {
            *username = username.trim().to_string();
            validate_username(username)?;
        }
        if let Some(email) = self.email.as_mut() {
            *email = email.trim().to_lowercase();
            validate_email(email)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        Ok(())
    }
}
