//! Authentication middleware
//!
//! Tokens are issued by the external identity provider; this server only
//! verifies them (HS256 signature, expiry, audience) and reads the user id.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, ErrorDetail, ErrorResponse};
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub aud: String,
    pub exp: i64,
}

/// Decode and validate a bearer token
pub fn decode_jwt(token: &str, secret: &str, audience: &str) -> Result<AuthUser, AppError> {
    use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);

    let claims = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => {
                tracing::debug!("Rejected token: {}", e);
                AppError::InvalidToken
            }
        })?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user ID in token".to_string()))?;

    Ok(AuthUser {
        user_id,
        email: claims.email,
    })
}

/// Authentication middleware
///
/// Validates the JWT token from the Authorization header and stores the
/// resulting [`AuthUser`] in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => {
            return AppError::Unauthorized("Missing or invalid Authorization header".to_string())
                .into_response();
        }
    };

    let auth = &state.config.auth;
    let user = match decode_jwt(token, &auth.jwt_secret, &auth.audience) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    tracing::debug!(user_id = %user.user_id, email = ?user.email, "Authenticated request");
    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                let error = ErrorResponse {
                    error: ErrorDetail {
                        code: "UNAUTHORIZED".to_string(),
                        message_en: "Authentication required".to_string(),
                        message_hi: "कृपया पहले लॉग इन करें".to_string(),
                        field: None,
                    },
                };
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn token(sub: &str, aud: &str, exp_offset: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            email: Some("trader@example.com".to_string()),
            aud: aud.to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    #[test]
    fn test_valid_token() {
        let user_id = Uuid::new_v4();
        let user = decode_jwt(&token(&user_id.to_string(), "authenticated", 3600), SECRET, "authenticated").unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.email.as_deref(), Some("trader@example.com"));
    }

    #[test]
    fn test_wrong_audience_and_secret() {
        let sub = Uuid::new_v4().to_string();
        assert!(matches!(
            decode_jwt(&token(&sub, "other", 3600), SECRET, "authenticated"),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            decode_jwt(&token(&sub, "authenticated", 3600), "wrong", "authenticated"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token() {
        let sub = Uuid::new_v4().to_string();
        assert!(matches!(
            decode_jwt(&token(&sub, "authenticated", -3600), SECRET, "authenticated"),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_non_uuid_subject() {
        assert!(matches!(
            decode_jwt(&token("not-a-uuid", "authenticated", 3600), SECRET, "authenticated"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
