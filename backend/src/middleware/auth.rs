//! Authentication middleware
//!
//! Validates bearer access tokens and exposes the signed-in user to handlers

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{ErrorDetail, ErrorResponse};
use crate::services::auth::decode_access_token;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: uuid::Uuid,
    /// Recorded as the seller on sales
    pub email: String,
}

impl AuthUser {
    /// Resolve a raw access token into the user it was issued to
    pub fn from_token(token: &str, secret: &str) -> Result<Self, String> {
        let claims = decode_access_token(token, secret).map_err(|e| e.to_string())?;
        let user_id = uuid::Uuid::parse_str(&claims.sub)
            .map_err(|_| "Invalid user ID in token".to_string())?;
        Ok(AuthUser {
            user_id,
            email: claims.email,
        })
    }
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        Some(token) => token.to_string(),
        None => return unauthorized_response("Missing or invalid Authorization header"),
    };

    match AuthUser::from_token(&token, &state.config.jwt.secret) {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(msg) => unauthorized_response(&msg),
    }
}

/// Create unauthorized response
pub fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message_en: message.to_string(),
            message_ro: "Neautorizat".to_string(),
            field: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
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
                        message_ro: "Trebuie să fiți autentificat".to_string(),
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
    use crate::services::auth::Claims;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(sub: &str, secret: &str, exp_offset: Duration) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            email: "ana@example.com".to_string(),
            exp: (Utc::now() + exp_offset).timestamp(),
            iat: Utc::now().timestamp(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_from_token_valid() {
        let id = uuid::Uuid::new_v4();
        let user = AuthUser::from_token(&token(&id.to_string(), "s3cret", Duration::hours(1)), "s3cret").unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.email, "ana@example.com");
    }

    #[test]
    fn test_from_token_expired() {
        let id = uuid::Uuid::new_v4().to_string();
        assert!(AuthUser::from_token(&token(&id, "s3cret", Duration::hours(-2)), "s3cret").is_err());
    }

    #[test]
    fn test_from_token_bad_subject() {
        assert!(AuthUser::from_token(&token("nope", "s3cret", Duration::hours(1)), "s3cret").is_err());
    }
}
