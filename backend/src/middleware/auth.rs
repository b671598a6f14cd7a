//! Authentication middleware
//!
//! Verifies bearer tokens issued by the external identity provider. The
//! token subject is the only identity the API needs: it tags persisted
//! predictions with their owner.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AppError;
use crate::AppState;

/// Authenticated user information extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Option<String>,
}

/// JWT claims structure
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
    #[serde(default)]
    role: Option<String>,
}

/// Authentication middleware that validates bearer tokens
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
        Some(token) if !token.trim().is_empty() => token.trim(),
        _ => {
            return AppError::Unauthorized("Missing or invalid Authorization header".to_string())
                .into_response();
        }
    };

    let auth_user = match verify_token(token, &state.config.auth) {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    tracing::debug!(
        user_id = %auth_user.user_id,
        role = auth_user.role.as_deref().unwrap_or("-"),
        "Authenticated request"
    );
    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// Decode and validate a bearer token
fn verify_token(token: &str, config: &AuthConfig) -> Result<AuthUser, AppError> {
    let mut validation = Validation::default();
    match &config.audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Token rejected: {}", e);
        AppError::InvalidToken
    })?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user ID in token".to_string()))?;

    Ok(AuthUser {
        user_id,
        role: claims.role,
    })
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
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn config(audience: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: SECRET.to_string(),
            audience: audience.map(str::to_string),
        }
    }

    fn token(sub: &str, exp_offset: i64, secret: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset,
            role: Some("authenticated".to_string()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token() {
        let user_id = Uuid::new_v4();
        let user = verify_token(&token(&user_id.to_string(), 3600, SECRET), &config(None)).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.role.as_deref(), Some("authenticated"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let user_id = Uuid::new_v4().to_string();
        let result = verify_token(&token(&user_id, 3600, "other-secret"), &config(None));
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let user_id = Uuid::new_v4().to_string();
        let result = verify_token(&token(&user_id, -3600, SECRET), &config(None));
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let result = verify_token(&token("not-a-uuid", 3600, SECRET), &config(None));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_required_audience_missing_from_token() {
        let user_id = Uuid::new_v4().to_string();
        let result = verify_token(&token(&user_id, 3600, SECRET), &config(Some("authenticated")));
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
