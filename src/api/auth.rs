//! Authentication endpoints: register, login, logout, token refresh.

use serde_json::json;

use crate::error::ApiError;
use crate::models::{AuthResponse, LoginRequest, RefreshResponse, RegisterRequest};

use super::ApiClient;

impl ApiClient {
    /// `POST /auth/register/`. Success returns a full session triple, so a
    /// new account is signed in immediately.
    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.send(self.http.post(self.url("/auth/register/")).json(req))
            .await
    }

    /// `POST /auth/login/` with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(self.http.post(self.url("/auth/login/")).json(&body))
            .await
    }

    /// `POST /auth/logout/`. Invalidates `refresh` server-side. Callers
    /// treat failure as non-fatal; see [`crate::session::sign_out`].
    pub async fn logout(&self, token: &str, refresh: &str) -> Result<(), ApiError> {
        self.send_no_body(self.post(token, "/auth/logout/").json(&json!({ "refresh": refresh })))
            .await
    }

    /// `POST /auth/token/refresh/`. Exchanges the refresh token for a new
    /// access token. Needs no Authorization header of its own.
    pub async fn refresh(&self, refresh: &str) -> Result<RefreshResponse, ApiError> {
        self.send(
            self.http
                .post(self.url("/auth/token/refresh/"))
                .json(&json!({ "refresh": refresh })),
        )
        .await
    }
}
