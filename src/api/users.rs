//! User endpoints. Listing is available to every authenticated account
//! (the task form needs assignee names); create/update/delete are
//! admin-only and the server enforces that with 403s.

use crate::error::ApiError;
use crate::models::{NewUser, PasswordChange, User, UserUpdate};

use super::ApiClient;

impl ApiClient {
    /// `GET /users/`.
    pub async fn list_users(&self, token: &str) -> Result<Vec<User>, ApiError> {
        self.send(self.get(token, "/users/")).await
    }

    /// `GET /users/{id}/`.
    pub async fn get_user(&self, token: &str, id: i64) -> Result<User, ApiError> {
        self.send(self.get(token, &format!("/users/{id}/"))).await
    }

    /// `GET /users/me/`: the identity behind `token`.
    pub async fn me(&self, token: &str) -> Result<User, ApiError> {
        self.send(self.get(token, "/users/me/")).await
    }

    /// `POST /users/` (admin only).
    pub async fn create_user(&self, token: &str, user: &NewUser) -> Result<User, ApiError> {
        self.send(self.post(token, "/users/").json(user)).await
    }

    /// `PUT /users/{id}/` (admin only). Identity fields only; passwords
    /// change through [`ApiClient::change_password`].
    pub async fn update_user(
        &self,
        token: &str,
        id: i64,
        update: &UserUpdate,
    ) -> Result<User, ApiError> {
        self.send(self.put(token, &format!("/users/{id}/")).json(update))
            .await
    }

    /// `DELETE /users/{id}/` (admin only).
    pub async fn delete_user(&self, token: &str, id: i64) -> Result<(), ApiError> {
        self.send_no_body(self.delete(token, &format!("/users/{id}/")))
            .await
    }

    /// `PUT /users/change_password/` for the calling account.
    pub async fn change_password(
        &self,
        token: &str,
        change: &PasswordChange,
    ) -> Result<(), ApiError> {
        self.send_no_body(self.put(token, "/users/change_password/").json(change))
            .await
    }
}
