// handlers/public/session.rs - POST /jwt and POST /logout
//
// Login signs whatever identity object the caller posts; verifying who the
// caller is happens upstream of this API. Logout only clears the cookie:
// tokens stay cryptographically valid until they expire.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{JsonBody, SESSION_COOKIE};
use crate::state::AppState;

fn session_cookie(value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(false)
        .same_site(SameSite::None)
        .build()
}

/// POST /jwt - issue a session token and set it as an HTTP-only cookie
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<Value>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let email = payload.get("email").and_then(Value::as_str).map(str::to_string);
    let token = state.tokens.issue(payload)?;

    tracing::info!(email = ?email, "Issued session token");
    Ok((jar.add(session_cookie(token)), Json(json!({ "success": true }))))
}

/// POST /logout - expire the session cookie
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let mut cookie = session_cookie(String::new());
    cookie.make_removal();

    tracing::info!("Logout");
    (jar.add(cookie), Json(json!({ "success": true })))
}
