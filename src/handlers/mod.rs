// handlers/mod.rs - Two-tier handler layout
//
// Public (no session) → Protected (session cookie verified by the gate)

pub mod protected;
pub mod public;
