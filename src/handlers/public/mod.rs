// handlers/public/mod.rs - Public handlers (no session required)
//
// Liveness, health, and the session bootstrap endpoints that mint and
// clear the `token` cookie. Nothing here passes through the session gate.

pub mod root;
pub mod session;

pub use root::{health, root};
pub use session::{login, logout};
