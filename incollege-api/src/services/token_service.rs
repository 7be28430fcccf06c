use incollege_shared::errors::AppError;
use incollege_shared::middleware::issue_jwt;
use incollege_shared::types::auth::{Claims, TokenResponse};

use crate::models::User;

pub fn create_access_token(user: &User, secret: &str, ttl_secs: i64) -> Result<TokenResponse, AppError> {
    let claims = Claims::new(user.id, user.username.as_str(), ttl_secs);
    let token = issue_jwt(&claims, secret)?;
    Ok(TokenResponse::new(token, ttl_secs))
}
