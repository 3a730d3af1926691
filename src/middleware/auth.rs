use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::AppError;
use crate::state::AppState;

/// The caller, as established by a verified bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Checks HS256 access tokens issued with the shared `JWT_SECRET`.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, AppError> {
        let token_data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "JWT rejected");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;

        let user_id = Uuid::parse_str(&token_data.claims.sub)
            .map_err(|_| AppError::Unauthorized("Token subject is not a user id".to_string()))?;

        Ok(AuthUser { user_id })
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Authorization header must use the Bearer scheme".to_string()))?;

    let auth_user = state.verifier.verify(token.trim())?;
    req.extensions_mut().insert(auth_user);

    Ok(next.run(req).await)
}

/// Signs a token for `user_id` that expires an hour from now.
#[cfg(test)]
pub(crate) fn test_token(secret: &str, user_id: Uuid) -> String {
    let exp = chrono::Utc::now().timestamp() as usize + 3600;
    sign(secret, &user_id.to_string(), exp)
}

#[cfg(test)]
fn sign(secret: &str, sub: &str, exp: usize) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = Claims {
        sub: sub.to_string(),
        exp,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}
