// handlers/protected/mod.rs - Protected handlers (session cookie required)
//
// Every route here sits behind `cookie_auth_middleware`, which rejects the
// request with 401 before the handler runs unless the `token` cookie holds
// a valid session. Handlers receive the caller as `Extension<AuthUser>`.
//
// Note: the caller's identity is not compared with the `email` of the
// records it reads or writes; any session may act on any job.

pub mod applied_jobs;
pub mod jobs;

#[derive(Debug, serde::Deserialize)]
pub struct ListQuery {
    pub email: Option<String>,
    pub id: Option<String>,
}
