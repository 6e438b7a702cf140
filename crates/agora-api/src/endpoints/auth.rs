//! Authentication and user profile endpoints.

use agora_types::{
    AuthToken, Credentials, DataResult, SignupRequest, User, VerificationRequest,
};
use reqwest::Method;
use tracing::{debug, info, warn};

use crate::error_mapper::map_signup_error;
use crate::AgoraClient;

impl AgoraClient {
    /// `POST /v1/auth/login`. Does not install the returned token.
    pub async fn login(&self, credentials: &Credentials) -> DataResult<AuthToken> {
        debug!(username = %credentials.username, "Logging in");
        let token = self
            .send_json(Method::POST, &["auth", "login"], credentials)
            .await?;
        info!("Login accepted");
        Ok(token)
    }

    /// `POST /v1/auth/signup`. A 409 is refined into `UsernameTaken` or
    /// `EmailTaken`.
    pub async fn signup(&self, request: &SignupRequest) -> DataResult<()> {
        self.send_json_unit(Method::POST, &["auth", "signup"], request)
            .await
            .map_err(|e| {
                let mapped = map_signup_error(&e);
                warn!(error = %e, mapped = ?mapped, "Signup failed");
                mapped
            })
    }

    /// `POST /v1/auth/verification`.
    pub async fn verify(&self, request: &VerificationRequest) -> DataResult<()> {
        Ok(self
            .send_json_unit(Method::POST, &["auth", "verification"], request)
            .await?)
    }

    /// `GET /v1/users/me`.
    pub async fn current_user(&self) -> DataResult<User> {
        Ok(self.get_json(&["users", "me"], &[]).await?)
    }

    /// `GET /v1/users/{username}`.
    pub async fn user_profile(&self, username: &str) -> DataResult<User> {
        Ok(self.get_json(&["users", username], &[]).await?)
    }
}
