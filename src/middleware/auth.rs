use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use serde_json::{Map, Value};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "token";

/// Authenticated caller context extracted from the session token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub identity: Map<String, Value>,
}

impl AuthUser {
    /// The `email` field of the signed identity, if the caller supplied one
    pub fn email(&self) -> Option<&str> {
        self.identity.get("email").and_then(Value::as_str)
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            identity: claims.identity,
        }
    }
}

/// Session gate: rejects requests without a valid `token` cookie before the
/// routed handler runs, otherwise attaches the decoded [`AuthUser`].
///
/// Missing, malformed, tampered and expired tokens all yield the same 401.
pub async fn cookie_auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
    else {
        tracing::warn!("{} {}: session cookie missing", request.method(), request.uri().path());
        return Err(ApiError::Unauthorized);
    };

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::warn!("{} {}: {}", request.method(), request.uri().path(), e);
        ApiError::Unauthorized
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}
