//! Session layer - identity provider contract, the bundled database provider, and the
//! session gate that every protected view reads its current user from.

/// Database-backed identity provider
pub mod database_provider;
/// Session gate and the read-only handle given to views
pub mod gate;
/// Identity provider contract and session types
pub mod provider;

pub use database_provider::DatabaseIdentityProvider;
pub use gate::{SessionGate, SessionHandle, SessionState};
pub use provider::{AuthEvent, IdentityProvider, Session, UserIdentity};
