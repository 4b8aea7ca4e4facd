use crate::utils::auth::validate_jwt;
use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use std::env;

/// Guards the admin surface. Tokens are minted by the external auth service;
/// we verify them against its signing secret.
pub async fn auth_middleware(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    if let Some(token) = token {
        let secret = env::var("SUPABASE_JWT_SECRET").unwrap_or_else(|_| "secret".to_string());

        if let Ok(claims) = validate_jwt(&token, &secret) {
            req.extensions_mut().insert(claims);
            return Ok(next.run(req).await);
        }
    }

    Err(StatusCode::UNAUTHORIZED)
}
