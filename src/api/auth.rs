use super::{ApiClient, GENERIC};
use crate::error::ApiError;
use crate::models::{Credentials, LoginResponse, Registration, User};
use tracing::info;

/// Logs in and persists the token and user on success.
pub async fn login(client: &ApiClient, credentials: &Credentials) -> Result<User, ApiError> {
    let res: LoginResponse = client
        .post_public("/auth/login", credentials, "Login failed")
        .await?;
    let user = res.user();
    client.session().save(&res.access_token, user.clone())?;
    info!("signed in as {}", user.email);
    Ok(user)
}

/// Creates the account. The caller logs in afterwards.
pub async fn register(client: &ApiClient, registration: &Registration) -> Result<User, ApiError> {
    client
        .post_public("/auth/register", registration, "Registration failed")
        .await
}

pub async fn current_user(client: &ApiClient) -> Result<User, ApiError> {
    client.get_json("/auth/me", GENERIC).await
}

pub fn logout(client: &ApiClient) -> Result<(), ApiError> {
    client.session().clear()?;
    info!("signed out");
    Ok(())
}
